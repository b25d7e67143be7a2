// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::appidentity::AppIdentity;

/// Interface to the locally computed application identities, consulted when
/// the attestation service vouches for the calling application
pub trait IIdentityStore {
    /// Lookup the identity computed for the given package
    fn lookup(&self, package_name: &str) -> Option<AppIdentity>;
}
