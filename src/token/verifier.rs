// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::jws::Jws;
use super::payload::{validate_payload, ValidationPolicy, VerificationContext};
use super::statement::AttestationStatement;
use crate::store::{IIdentityStore, ITrustAnchorStore};
use log::debug;

/// End-to-end verification of attestation responses received by one
/// application
pub struct Verifier<'a, T, I> {
    tas: &'a T,
    ids: &'a I,
    package_name: String,
    policy: ValidationPolicy,
}

impl<'a, T: ITrustAnchorStore, I: IIdentityStore> Verifier<'a, T, I> {
    pub fn new(tas: &'a T, ids: &'a I, package_name: &str) -> Self {
        Self {
            tas,
            ids,
            package_name: package_name.to_string(),
            policy: Default::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Decode `token`, authenticate it and validate its claims against
    /// `ctx`.  The statement is only returned once every check passed.
    pub fn verify(
        &self,
        token: &str,
        ctx: VerificationContext,
    ) -> Result<AttestationStatement, Error> {
        let jws = Jws::<AttestationStatement>::decode(token)?;

        jws.verify(self.tas)?;

        debug!("token authenticated, validating claims for {}", self.package_name);

        validate_payload(jws.payload, ctx, &self.package_name, self.ids, &self.policy)
    }
}
