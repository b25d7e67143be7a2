// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::chain;
use super::errors::Error;
use super::ITrustAnchorStore;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;

/// Trust anchors from the platform's default certificate locations (as
/// configured in OpenSSL, or overridden through `SSL_CERT_FILE` and
/// `SSL_CERT_DIR`).  Certificates are looked up lazily during each
/// validation.
#[derive(Debug, Default)]
pub struct SystemTrustAnchorStore {
    at_time: Option<i64>,
}

impl SystemTrustAnchorStore {
    pub fn new() -> Self {
        Self { at_time: None }
    }

    /// Evaluate chains as if the current time was `t` (seconds since the
    /// UNIX epoch)
    pub fn at_time(mut self, t: i64) -> Self {
        self.at_time = Some(t);
        self
    }
}

impl ITrustAnchorStore for SystemTrustAnchorStore {
    fn validate_chain(&self, chain: &[X509], hostname: &str) -> Result<(), Error> {
        chain::evaluate(
            || {
                let mut b = X509StoreBuilder::new()?;
                b.set_default_paths()?;
                Ok(b)
            },
            chain,
            hostname,
            self.at_time,
        )
    }
}
