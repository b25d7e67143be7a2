// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use openssl::x509::X509;

/// Interface to the trust anchors the verifier accepts certificate chains
/// against.
pub trait ITrustAnchorStore {
    /// Validate `chain` (leaf first) up to one of the stashed roots, and bind
    /// the leaf to `hostname` in the same evaluation.
    ///
    /// A chain which does not lead to a trusted root is reported as
    /// [`Error::Untrusted`]; a trusted chain whose leaf is not issued for
    /// `hostname` as [`Error::HostnameMismatch`].
    fn validate_chain(&self, chain: &[X509], hostname: &str) -> Result<(), Error>;
}
