// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::token::base64;
use openssl::sha::sha256;
use serde::{Deserialize, Serialize};

/// The identity of an application as computed by the party verifying it:
/// what the attestation service is expected to report about the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Package name of the application
    #[serde(rename = "package-name")]
    pub package_name: String,

    /// Base64 SHA-256 digests of the DER signing certificates, in the order
    /// the platform reports them
    #[serde(rename = "certificate-digests")]
    pub certificate_digests: Vec<String>,

    /// Base64 SHA-256 digest of the application binary
    #[serde(
        rename = "apk-digest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub apk_digest: Option<String>,
}

impl AppIdentity {
    /// Compute the identity digests from the application's DER signing
    /// certificates and, optionally, its binary image
    pub fn from_artifacts(package_name: &str, signing_certs: &[Vec<u8>], apk: Option<&[u8]>) -> Self {
        Self {
            package_name: package_name.to_string(),
            certificate_digests: signing_certs.iter().map(|c| digest(c)).collect(),
            apk_digest: apk.map(digest),
        }
    }
}

/// Base64 SHA-256 of `data`, the form the attestation service reports
pub fn digest(data: &[u8]) -> String {
    base64::encode_str(&sha256(data))
}
