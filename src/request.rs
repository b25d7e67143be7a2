// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! A complete attestation round trip: mint a fresh [`VerificationContext`],
//! obtain a token bound to its nonce, and verify it.
//!
//! How a token is obtained (on-device API, relay service, recorded
//! fixtures) is left to an [`ITokenSource`] implementation.

use crate::store::{IIdentityStore, ITrustAnchorStore};
use crate::token::{self, AttestationStatement, VerificationContext, Verifier};
use log::{debug, warn};
use std::future::Future;

/// Anything able to return an attestation token for a given nonce
pub trait ITokenSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn attest(&self, nonce: &[u8]) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Failures of [`Attestor::request`].  Transport failures say nothing about
/// the device and are kept apart from verification failures.
#[derive(thiserror::Error, Debug)]
pub enum AttestError {
    #[error("token source: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("verification: {0}")]
    Verification(#[from] token::Error),
}

pub struct Attestor<'a, S, T, I> {
    source: S,
    verifier: Verifier<'a, T, I>,
}

impl<'a, S, T, I> Attestor<'a, S, T, I>
where
    S: ITokenSource,
    T: ITrustAnchorStore,
    I: IIdentityStore,
{
    pub fn new(source: S, verifier: Verifier<'a, T, I>) -> Self {
        Self { source, verifier }
    }

    /// Request and verify one attestation, each with its own nonce
    pub async fn request(&self) -> Result<AttestationStatement, AttestError> {
        let ctx = VerificationContext::generate()?;

        debug!(
            "requesting attestation for {} at {} ms",
            self.verifier.package_name(),
            ctx.request_timestamp_ms()
        );

        let token = self.source.attest(ctx.nonce()).await.map_err(|e| {
            warn!("token source failed: {e}");
            AttestError::Transport(Box::new(e))
        })?;

        Ok(self.verifier.verify(&token, ctx)?)
    }
}
