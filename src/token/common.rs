// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use jsonwebtoken::Algorithm;
use std::str::FromStr;

/// The only host the attestation service signs statements from.  Not
/// configurable: changing issuer trust requires a new build.
pub const ATTESTATION_HOSTNAME: &str = "attest.android.com";

/// JOSE identifier of RSASSA-PKCS1-v1_5 using SHA-256
pub const RS256: &str = "RS256";

/// Upper bound, in milliseconds, between the request being issued and the
/// service timestamping its response
pub const MAX_TIMESTAMP_DURATION_MS: i64 = 2 * 60 * 1000;

/// Size of the nonces generated for each attestation request
pub const NONCE_LEN: usize = 32;

/// Whether `alg` names the one signature scheme the verifier implements.
/// Unknown and unregistered names (including `none`) are never supported.
pub fn is_supported_alg(alg: &str) -> bool {
    matches!(Algorithm::from_str(alg), Ok(Algorithm::RS256))
}
