// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::appidentity::AppIdentity;
use super::IIdentityStore;
use serde_json::Error;
use std::collections::HashMap;
use std::sync::RwLock;

/// The store where application identities are stashed, indexed by package
/// name (case-insensitively)
#[derive(Debug, Default)]
pub struct MemoIdentityStore {
    p: RwLock<HashMap<String, AppIdentity>>,
}

impl MemoIdentityStore {
    pub fn new() -> Self {
        Self {
            p: Default::default(),
        }
    }

    /// Add (or replace) one identity
    pub fn add(&self, id: AppIdentity) {
        if let Ok(mut p) = self.p.write() {
            p.insert(id.package_name.to_ascii_lowercase(), id);
        }
    }

    /// Add to an existing (and possibly empty) IdentityStore the identities
    /// loaded from the given JSON file
    pub fn load_json(&mut self, j: &str) -> Result<(), Error> {
        let ids: Vec<AppIdentity> = serde_json::from_str(j)?;

        for id in ids {
            self.add(id);
        }

        Ok(())
    }
}

impl IIdentityStore for MemoIdentityStore {
    fn lookup(&self, package_name: &str) -> Option<AppIdentity> {
        self.p
            .read()
            .ok()?
            .get(&package_name.to_ascii_lowercase())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JSON_IDS_OK: &str = r#"[
        {
            "package-name": "com.scottyab.safetynet.sample",
            "certificate-digests": [
                "tgIz1S6aGbPqOWPizO4kOtx9NE1Bx6Us4iSU+jMR7ts="
            ],
            "apk-digest": "g8VAPTRbkIxGzqjmeJ3y1eopi0SMvzDVPSpSUQKpjEk="
        },
        {
            "package-name": "com.example.other",
            "certificate-digests": []
        }
    ]"#;

    #[test]
    fn load_json_and_lookup_ok() {
        let mut s = MemoIdentityStore::new();

        // load store from JSON
        s.load_json(TEST_JSON_IDS_OK).unwrap();

        // lookup is not case sensitive
        let id = s.lookup("com.ScottyAB.safetynet.sample");
        assert!(id.is_some());

        let res = id.unwrap();
        assert_eq!(res.package_name, "com.scottyab.safetynet.sample");
        assert_eq!(res.certificate_digests.len(), 1);
        assert_eq!(
            res.apk_digest.as_deref(),
            Some("g8VAPTRbkIxGzqjmeJ3y1eopi0SMvzDVPSpSUQKpjEk=")
        );

        let other = s.lookup("com.example.other").unwrap();
        assert!(other.certificate_digests.is_empty());
        assert!(other.apk_digest.is_none());

        assert!(s.lookup("com.example.unknown").is_none());
    }

    #[test]
    fn load_json_bad() {
        let mut s = MemoIdentityStore::new();

        assert!(s.load_json(r#"[{"package-name":"x"}]"#).is_err());
        assert!(s.lookup("x").is_none());
    }
}
