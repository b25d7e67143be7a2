// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::chain;
use super::errors::Error;
use super::ITrustAnchorStore;
use crate::token::base64;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use serde::Deserialize;
use std::sync::RwLock;

/// A trust anchor as found in a JSON trust anchor file
#[derive(Clone, Deserialize, Debug)]
struct TrustAnchor {
    /// Free-form label, only used in diagnostics
    #[serde(default)]
    name: Option<String>,

    /// The root certificate, base64 DER
    #[serde(rename(deserialize = "certificate"))]
    certificate: String,
}

/// The store where explicitly provisioned root certificates are stashed.
#[derive(Debug)]
pub struct MemoTrustAnchorStore {
    p: RwLock<Vec<X509>>,

    /// Fixed validation time (seconds since the UNIX epoch); the current
    /// time is used when unset
    at_time: Option<i64>,
}

impl Default for MemoTrustAnchorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoTrustAnchorStore {
    /// Returns a new empty TrustAnchorStore
    pub fn new() -> Self {
        Self {
            p: Default::default(),
            at_time: None,
        }
    }

    /// Evaluate chains as if the current time was `t` (seconds since the
    /// UNIX epoch).  Useful to re-verify recorded tokens whose chain has
    /// since expired.
    pub fn at_time(mut self, t: i64) -> Self {
        self.at_time = Some(t);
        self
    }

    /// Add a single root certificate
    pub fn add(&self, root: X509) -> Result<(), Error> {
        self.p
            .write()
            .map_err(|e| Error::Sema(e.to_string()))?
            .push(root);

        Ok(())
    }

    /// Add to an existing (and possibly empty) TrustAnchorStore the root
    /// certificates found in the given PEM bundle
    pub fn load_pem(&mut self, pem: &[u8]) -> Result<(), Error> {
        let roots = X509::stack_from_pem(pem).map_err(|e| Error::Syntax(e.to_string()))?;

        if roots.is_empty() {
            return Err(Error::Sema("no certificate found in PEM bundle".to_string()));
        }

        for r in roots {
            self.add(r)?;
        }

        Ok(())
    }

    /// Add to an existing (and possibly empty) TrustAnchorStore the trust
    /// anchors loaded from the given JSON file
    pub fn load_json(&mut self, j: &str) -> Result<(), Error> {
        let tas: Vec<TrustAnchor> =
            serde_json::from_str(j).map_err(|e| Error::Syntax(e.to_string()))?;

        for (i, ta) in tas.iter().enumerate() {
            let label = ta.name.clone().unwrap_or_else(|| format!("#{i}"));

            let der = base64::decode_str(&ta.certificate)
                .map_err(|e| Error::Syntax(format!("trust anchor {label}: {e}")))?;

            let root =
                X509::from_der(&der).map_err(|e| Error::Sema(format!("trust anchor {label}: {e}")))?;

            self.add(root)?;
        }

        Ok(())
    }

    /// Number of stashed roots
    pub fn len(&self) -> usize {
        self.p.read().map(|p| p.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ITrustAnchorStore for MemoTrustAnchorStore {
    fn validate_chain(&self, chain: &[X509], hostname: &str) -> Result<(), Error> {
        let roots = self
            .p
            .read()
            .map_err(|e| Error::Untrusted(e.to_string()))?
            .clone();

        if roots.is_empty() {
            return Err(Error::Untrusted("trust anchor store is empty".to_string()));
        }

        chain::evaluate(
            || {
                let mut b = X509StoreBuilder::new()?;
                for r in roots.iter() {
                    b.add_cert(r.clone())?;
                }
                Ok(b)
            },
            chain,
            hostname,
            self.at_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::testutil::{fixture, ROGUE_HOSTNAME};
    use crate::token::ATTESTATION_HOSTNAME;

    #[test]
    fn load_pem_and_validate_ok() {
        let f = fixture();

        let mut s = MemoTrustAnchorStore::new();
        s.load_pem(&f.root.to_pem().unwrap()).unwrap();
        assert_eq!(s.len(), 1);

        let chain = [f.leaf.clone(), f.intermediate.clone()];

        assert_eq!(s.validate_chain(&chain, ATTESTATION_HOSTNAME), Ok(()));
    }

    #[test]
    fn load_json_and_validate_ok() {
        let f = fixture();

        let j = format!(
            r#"[{{"name":"test root","certificate":"{}"}}]"#,
            base64::encode_str(&f.root.to_der().unwrap())
        );

        let mut s = MemoTrustAnchorStore::new();
        s.load_json(&j).unwrap();

        let chain = [f.leaf.clone(), f.intermediate.clone()];

        assert_eq!(s.validate_chain(&chain, ATTESTATION_HOSTNAME), Ok(()));
    }

    #[test]
    fn load_bad_input() {
        let mut s = MemoTrustAnchorStore::new();

        assert!(s.load_pem(b"nothing here").is_err());
        assert!(matches!(s.load_json("{}"), Err(Error::Syntax(_))));
        assert!(matches!(
            s.load_json(r#"[{"certificate":"AAAA"}]"#),
            Err(Error::Sema(_))
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn empty_store_trusts_nothing() {
        let f = fixture();
        let s = MemoTrustAnchorStore::new();

        let r = s.validate_chain(&[f.leaf.clone(), f.intermediate.clone()], ATTESTATION_HOSTNAME);

        assert!(matches!(r, Err(Error::Untrusted(_))));
    }

    #[test]
    fn missing_intermediate() {
        let f = fixture();
        let s = MemoTrustAnchorStore::new();
        s.add(f.root.clone()).unwrap();

        let r = s.validate_chain(&[f.leaf.clone()], ATTESTATION_HOSTNAME);

        assert!(matches!(r, Err(Error::Untrusted(_))));
    }

    #[test]
    fn other_root() {
        let f = fixture();
        let s = MemoTrustAnchorStore::new();
        s.add(f.rogue_root.clone()).unwrap();

        let r = s.validate_chain(&[f.leaf.clone(), f.intermediate.clone()], ATTESTATION_HOSTNAME);

        assert!(matches!(r, Err(Error::Untrusted(_))));
    }

    #[test]
    fn trusted_but_other_hostname() {
        let f = fixture();
        let s = MemoTrustAnchorStore::new();
        s.add(f.root.clone()).unwrap();

        let chain = [f.rogue_leaf.clone(), f.intermediate.clone()];

        assert_eq!(s.validate_chain(&chain, ROGUE_HOSTNAME), Ok(()));
        assert!(matches!(
            s.validate_chain(&chain, ATTESTATION_HOSTNAME),
            Err(Error::HostnameMismatch(_))
        ));
    }

    #[test]
    fn expired_at_fixed_time() {
        let f = fixture();
        let s = MemoTrustAnchorStore::new().at_time(f.not_after + 1);
        s.add(f.root.clone()).unwrap();

        let r = s.validate_chain(&[f.leaf.clone(), f.intermediate.clone()], ATTESTATION_HOSTNAME);

        assert!(matches!(r, Err(Error::Untrusted(_))));
    }
}
