// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The token module decodes and verifies attestation statements delivered as
//! a JSON Web Signature (JWS) in compact serialization.
//!
//! Verification happens in two stages.  [`Jws::verify`] authenticates the
//! token: the `alg` must be RS256, the `x5c` chain must lead to a trusted
//! root, the leaf must be issued for [`ATTESTATION_HOSTNAME`] and its key must
//! have produced the signature.  [`validate_payload`] then compares the
//! authenticated claims with what the verifier expects.  [`Verifier`] chains
//! the two.
//!
//! # Example
//!
//! The following example assumes that `token` contains the compact JWS
//! returned by the attestation service for a request carrying `ctx`'s nonce.
//!
//! ```no_run
//! use safetynet_token::store::{MemoIdentityStore, MemoTrustAnchorStore};
//! use safetynet_token::token::{VerificationContext, Verifier};
//!
//! # let token = String::new();
//! # let ctx = VerificationContext::new(vec![], 0);
//! let mut tas = MemoTrustAnchorStore::new();
//! tas.load_pem(&std::fs::read("roots.pem").unwrap())
//!     .expect("loading trust anchors");
//!
//! let mut ids = MemoIdentityStore::new();
//! ids.load_json(&std::fs::read_to_string("identities.json").unwrap())
//!     .expect("loading application identities");
//!
//! let v = Verifier::new(&tas, &ids, "com.example.app");
//!
//! match v.verify(&token, ctx) {
//!     Ok(s) => println!("device integrity: {}", s.is_fully_trusted_device()),
//!     Err(e) => eprintln!("attestation rejected: {e}"),
//! }
//! ```

pub use self::common::*;
pub use self::compact::CompactToken;
pub use self::errors::{Error, PayloadFailure};
pub use self::header::Header;
pub use self::hostname::verify_hostname;
pub use self::jws::{verify_signature, Jws};
pub use self::payload::{validate_payload, ValidationPolicy, VerificationContext};
pub use self::statement::AttestationStatement;
pub use self::verifier::Verifier;

pub mod base64;
mod common;
mod compact;
mod errors;
mod header;
mod hostname;
mod jws;
mod payload;
mod statement;
#[cfg(test)]
pub(crate) mod testutil;
mod verifier;
