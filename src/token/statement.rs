// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64::Bytes;
use super::errors::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A statement returned by the attestation service.
///
/// Every claim is optional: the service omits what it could not determine,
/// and an absent claim must never be read as `false` or empty.  In
/// particular, the `apk*` claims are only meaningful when `ctsProfileMatch`
/// is present and true.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationStatement {
    /// Nonce sent as part of the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Bytes>,

    /// Time the service produced the statement, in ms since the UNIX epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,

    /// Package name of the application that submitted the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apk_package_name: Option<String>,

    /// Base64 SHA-256 digests of the application's signing certificates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apk_certificate_digest_sha256: Option<Vec<String>>,

    /// Base64 SHA-256 digest of the application binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apk_digest_sha256: Option<String>,

    /// The device passed CTS and matches a known profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cts_profile_match: Option<bool>,

    /// The device passed a basic integrity test, CTS profile unverified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_integrity: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,

    // JWT registered claims
    #[serde(rename = "iss", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "sub", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "aud", skip_serializing_if = "Option::is_none")]
    pub audience: Option<Value>,
    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expiration_time_seconds: Option<i64>,
    #[serde(rename = "nbf", skip_serializing_if = "Option::is_none")]
    pub not_before_time_seconds: Option<i64>,
    #[serde(rename = "iat", skip_serializing_if = "Option::is_none")]
    pub issued_at_time_seconds: Option<i64>,
    #[serde(rename = "jti", skip_serializing_if = "Option::is_none")]
    pub jwt_id: Option<String>,

    /// Claims not listed above, e.g. `evaluationType`
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl AttestationStatement {
    /// Decode a JSON encoded attestation statement
    pub fn decode(buf: &[u8]) -> Result<AttestationStatement, Error> {
        serde_json::from_slice(buf).map_err(|e| Error::MalformedToken(format!("payload: {e}")))
    }

    pub fn nonce(&self) -> Option<&[u8]> {
        self.nonce.as_ref().map(Bytes::as_slice)
    }

    /// `aud` as a list, whether the service sent a single string or an array
    pub fn audience_as_list(&self) -> Vec<String> {
        match &self.audience {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(a)) => a
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => vec![],
        }
    }

    /// Both integrity verdicts are present and true
    pub fn is_fully_trusted_device(&self) -> bool {
        self.cts_profile_match == Some(true) && self.basic_integrity == Some(true)
    }
}
