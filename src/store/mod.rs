// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Stores consulted by the verifier: trust anchors for the certificate chain
//! embedded in a token, and locally computed application identities.

pub use self::appidentity::{digest, AppIdentity};
pub use self::errors::Error;
pub use self::iidentitystore::IIdentityStore;
pub use self::itrustanchorstore::ITrustAnchorStore;
pub use self::memo_identitystore::MemoIdentityStore;
pub use self::memo_trustanchorstore::MemoTrustAnchorStore;
pub use self::system_trustanchorstore::SystemTrustAnchorStore;

mod appidentity;
mod chain;
mod errors;
mod iidentitystore;
mod itrustanchorstore;
mod memo_identitystore;
mod memo_trustanchorstore;
mod system_trustanchorstore;
