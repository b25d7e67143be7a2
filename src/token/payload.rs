// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::common::{MAX_TIMESTAMP_DURATION_MS, NONCE_LEN};
use super::errors::{Error, PayloadFailure};
use super::statement::AttestationStatement;
use crate::store::IIdentityStore;
use log::{debug, warn};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// What the verifier sent along with an attestation request.  It is consumed
/// by [`validate_payload`] so a context cannot vouch for two responses.
#[derive(Debug, PartialEq, Eq)]
pub struct VerificationContext {
    nonce: Vec<u8>,
    request_timestamp_ms: i64,
}

impl VerificationContext {
    pub fn new(nonce: Vec<u8>, request_timestamp_ms: i64) -> Self {
        Self {
            nonce,
            request_timestamp_ms,
        }
    }

    /// A fresh context: a random nonce from the OpenSSL CSPRNG, stamped with
    /// the current wall clock time
    pub fn generate() -> Result<Self, Error> {
        let mut nonce = vec![0u8; NONCE_LEN];

        openssl::rand::rand_bytes(&mut nonce)
            .map_err(|e| Error::BadInternalState(format!("nonce generation: {e}")))?;

        Ok(Self::new(nonce, now_ms()?))
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn request_timestamp_ms(&self) -> i64 {
        self.request_timestamp_ms
    }
}

fn now_ms() -> Result<i64, Error> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::BadInternalState(format!("system clock: {e}")))?;

    i64::try_from(d.as_millis())
        .map_err(|e| Error::BadInternalState(format!("system clock: {e}")))
}

/// Optional checks layered on top of the mandatory ones
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ValidationPolicy {
    /// Also require `apkDigestSha256` to match the binary digest known for
    /// the application
    #[serde(default)]
    pub check_apk_digest: bool,
}

/// Check the claims of an authenticated statement against what the verifier
/// expects, stopping at the first discrepancy.
///
/// Application identity is only compared when the service asserts a CTS
/// profile match; otherwise the `apk*` claims carry no meaning.
pub fn validate_payload(
    statement: AttestationStatement,
    ctx: VerificationContext,
    package_name: &str,
    ids: &impl IIdentityStore,
    policy: &ValidationPolicy,
) -> Result<AttestationStatement, Error> {
    check_nonce(&statement, &ctx)?;
    check_freshness(&statement, &ctx)?;

    if statement.cts_profile_match == Some(true) {
        check_identity(&statement, package_name, ids, policy)?;
    } else {
        debug!("no CTS profile match, application identity not checked");
    }

    Ok(statement)
}

fn check_nonce(s: &AttestationStatement, ctx: &VerificationContext) -> Result<(), Error> {
    if s.nonce() == Some(ctx.nonce()) {
        return Ok(());
    }

    let received = s
        .nonce()
        .map(base64::encode_str)
        .unwrap_or_else(|| "<absent>".to_string());

    warn!("nonce mismatch");

    Err(Error::payload(
        PayloadFailure::NonceMismatch,
        format!(
            "expected: {}, received: {received}",
            base64::encode_str(ctx.nonce())
        ),
        s,
    ))
}

fn check_freshness(s: &AttestationStatement, ctx: &VerificationContext) -> Result<(), Error> {
    let elapsed = s
        .timestamp_ms
        .and_then(|t| t.checked_sub(ctx.request_timestamp_ms()));

    match elapsed {
        Some(d) if d <= MAX_TIMESTAMP_DURATION_MS => Ok(()),
        _ => {
            warn!("stale response");

            Err(Error::payload(
                PayloadFailure::StaleResponse,
                format!(
                    "request sent at {} ms, response timestamped {:?} ms, allowed {} ms",
                    ctx.request_timestamp_ms(),
                    s.timestamp_ms,
                    MAX_TIMESTAMP_DURATION_MS
                ),
                s,
            ))
        }
    }
}

fn check_identity(
    s: &AttestationStatement,
    package_name: &str,
    ids: &impl IIdentityStore,
    policy: &ValidationPolicy,
) -> Result<(), Error> {
    let received = s.apk_package_name.as_deref();

    if !received.is_some_and(|p| p.eq_ignore_ascii_case(package_name)) {
        return Err(Error::payload(
            PayloadFailure::PackageMismatch,
            format!("expected: {package_name}, received: {received:?}"),
            s,
        ));
    }

    let id = ids.lookup(package_name);

    let expected = id.as_ref().map(|i| i.certificate_digests.as_slice());
    let received = s.apk_certificate_digest_sha256.as_deref();

    if expected.is_none() || expected != received {
        return Err(Error::payload(
            PayloadFailure::CertDigestMismatch,
            format!("expected: {expected:?}, received: {received:?}"),
            s,
        ));
    }

    if policy.check_apk_digest {
        let expected = id.as_ref().and_then(|i| i.apk_digest.as_deref());
        let received = s.apk_digest_sha256.as_deref();

        if expected.is_none() || expected != received {
            return Err(Error::payload(
                PayloadFailure::ApkDigestMismatch,
                format!("expected: {expected:?}, received: {received:?}"),
                s,
            ));
        }
    }

    debug!("application identity of {package_name} matches");

    Ok(())
}
