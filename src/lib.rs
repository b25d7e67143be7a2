// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Offline verification of SafetyNet attestation statements.
//!
//! The attestation service returns its verdict about a device and the calling
//! application as a JWS signed with a key certified for `attest.android.com`.
//! This crate provides an API to:
//! * Decode the compact JWS and its JSON header and payload
//! * Cryptographically verify the signature and the embedded certificate
//!   chain against locally held trust anchors
//! * Validate the claims (nonce, freshness, application identity) against
//!   what the verifier sent and knows about the application
//! * Drive a complete request with a fresh nonce through a pluggable token
//!   source

pub mod request;
pub mod store;
pub mod token;
