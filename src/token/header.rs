// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JOSE header of a signed attestation statement.  Only `alg` and `x5c` take
/// part in verification; the remaining registered parameters are kept as
/// found so that nothing the service sends is lost.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signature algorithm, e.g. "RS256"
    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Certificate chain, base64 (not base64url) DER, leaf first
    #[serde(rename = "x5c", skip_serializing_if = "Option::is_none")]
    pub x509_certificates: Option<Vec<String>>,

    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "jku", skip_serializing_if = "Option::is_none")]
    pub jwk_url: Option<String>,

    #[serde(rename = "jwk", skip_serializing_if = "Option::is_none")]
    pub jwk: Option<Value>,

    #[serde(rename = "x5u", skip_serializing_if = "Option::is_none")]
    pub x509_url: Option<String>,

    /// SHA-1 thumbprint of the leaf certificate, base64url
    #[serde(rename = "x5t", skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<String>,

    #[serde(rename = "crit", skip_serializing_if = "Option::is_none")]
    pub critical: Option<Vec<String>>,

    #[serde(rename = "typ", skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    #[serde(rename = "cty", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Header parameters not listed above
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Header {
    /// Decode a JSON encoded JOSE header
    pub fn decode(buf: &[u8]) -> Result<Header, Error> {
        let h: Header = serde_json::from_slice(buf)
            .map_err(|e| Error::MalformedToken(format!("header: {e}")))?;

        if h.algorithm.is_none() {
            return Err(Error::MalformedToken(
                "header: missing alg parameter".to_string(),
            ));
        }

        Ok(h)
    }

    /// The declared signature algorithm.  Always present on a decoded header.
    pub fn alg(&self) -> &str {
        self.algorithm.as_deref().unwrap_or_default()
    }

    /// The embedded certificate chain, or an empty slice if there is none
    pub fn chain(&self) -> &[String] {
        self.x509_certificates.as_deref().unwrap_or_default()
    }
}
