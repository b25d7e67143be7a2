// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::statement::AttestationStatement;

/// Which of the locally-checked payload expectations did not hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadFailure {
    NonceMismatch,
    StaleResponse,
    PackageMismatch,
    CertDigestMismatch,
    ApkDigestMismatch,
}

impl std::fmt::Display for PayloadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayloadFailure::NonceMismatch => "nonce mismatch",
            PayloadFailure::StaleResponse => "stale response",
            PayloadFailure::PackageMismatch => "package mismatch",
            PayloadFailure::CertDigestMismatch => "cert digest mismatch",
            PayloadFailure::ApkDigestMismatch => "apk digest mismatch",
        };

        f.write_str(s)
    }
}

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Missing certificate chain: {0}")]
    MissingCertificateChain(String),
    #[error("Invalid certificate encoding: {0}")]
    InvalidCertificateEncoding(String),
    #[error("Certificate chain not trusted: {0}")]
    ChainNotTrusted(String),
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),
    #[error("Issuer hostname mismatch: {0}")]
    IssuerHostnameMismatch(String),
    /// The token is authentic but its claims disagree with what the verifier
    /// expects.  The statement is attached for inspection only: it MUST NOT be
    /// trusted.
    #[error("Payload validation failed: {failure}: {detail}")]
    PayloadValidationFailed {
        failure: PayloadFailure,
        detail: String,
        statement: Box<AttestationStatement>,
    },
    #[error("Internal error: {0}")]
    BadInternalState(String),
}

impl Error {
    /// The attestation statement attached to a payload validation failure
    pub fn statement(&self) -> Option<&AttestationStatement> {
        match self {
            Error::PayloadValidationFailed { statement, .. } => Some(statement),
            _ => None,
        }
    }

    pub(crate) fn payload(
        failure: PayloadFailure,
        detail: String,
        statement: &AttestationStatement,
    ) -> Self {
        Error::PayloadValidationFailed {
            failure,
            detail,
            statement: Box::new(statement.clone()),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedToken(e)
            | Error::UnsupportedAlgorithm(e)
            | Error::MissingCertificateChain(e)
            | Error::InvalidCertificateEncoding(e)
            | Error::ChainNotTrusted(e)
            | Error::SignatureInvalid(e)
            | Error::IssuerHostnameMismatch(e)
            | Error::BadInternalState(e) => {
                write!(f, "{}", e)
            }
            Error::PayloadValidationFailed {
                failure, detail, ..
            } => {
                write!(f, "{}: {}", failure, detail)
            }
        }
    }
}
