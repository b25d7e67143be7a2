// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::common::{is_supported_alg, ATTESTATION_HOSTNAME};
use super::compact::CompactToken;
use super::errors::Error;
use super::header::Header;
use super::hostname::verify_hostname;
use super::statement::AttestationStatement;
use crate::store::{self, ITrustAnchorStore};
use log::{debug, warn};
use openssl::hash::MessageDigest;
use openssl::pkey::Id;
use openssl::x509::X509;
use serde::de::DeserializeOwned;

/// A decoded, not yet verified, JSON Web Signature
#[derive(Debug)]
pub struct Jws<P = AttestationStatement> {
    pub header: Header,
    pub payload: P,
    raw: CompactToken,
}

impl<P: DeserializeOwned> Jws<P> {
    /// Parse a compact-serialized JWS and decode its header and payload.
    /// Nothing is verified at this stage.
    pub fn decode(token: &str) -> Result<Self, Error> {
        let raw = CompactToken::parse(token)?;

        let header = Header::decode(&raw.header_bytes)?;

        let payload = serde_json::from_slice(&raw.payload_bytes)
            .map_err(|e| Error::MalformedToken(format!("payload: {e}")))?;

        Ok(Jws {
            header,
            payload,
            raw,
        })
    }
}

impl<P> Jws<P> {
    /// The wire-level segments this JWS was decoded from
    pub fn raw(&self) -> &CompactToken {
        &self.raw
    }

    /// Establish that the token was signed by a key certified for the
    /// attestation service.  On success the leaf certificate is returned.
    pub fn verify(&self, tas: &impl ITrustAnchorStore) -> Result<X509, Error> {
        let leaf = verify_signature(
            &self.header,
            &self.raw.signed_content,
            &self.raw.signature_bytes,
            tas,
        )?;

        verify_hostname(ATTESTATION_HOSTNAME, &leaf)?;

        Ok(leaf)
    }
}

/// Check the algorithm, the `x5c` chain and the RS256 signature over
/// `signed_content`, in this order.  On success the leaf certificate is
/// returned.
pub fn verify_signature(
    header: &Header,
    signed_content: &[u8],
    signature: &[u8],
    tas: &impl ITrustAnchorStore,
) -> Result<X509, Error> {
    let alg = header.alg();
    if !is_supported_alg(alg) {
        warn!("rejecting token signed with {alg:?}");
        return Err(Error::UnsupportedAlgorithm(format!(
            "{alg:?} is not accepted, only RS256 is"
        )));
    }

    let chain = decode_chain(header.chain())?;

    tas.validate_chain(&chain, ATTESTATION_HOSTNAME)
        .map_err(|e| match e {
            store::Error::HostnameMismatch(s) => Error::IssuerHostnameMismatch(s),
            store::Error::Syntax(s) | store::Error::Sema(s) | store::Error::Untrusted(s) => {
                Error::ChainNotTrusted(s)
            }
        })?;

    let leaf = chain
        .into_iter()
        .next()
        .ok_or_else(|| Error::BadInternalState("empty chain after validation".to_string()))?;

    let pkey = leaf
        .public_key()
        .map_err(|e| Error::SignatureInvalid(format!("leaf public key: {e}")))?;

    if pkey.id() != Id::RSA {
        return Err(Error::SignatureInvalid(format!(
            "leaf key is not RSA: {:?}",
            pkey.id()
        )));
    }

    let mut verifier = openssl::sign::Verifier::new(MessageDigest::sha256(), &pkey)
        .map_err(|e| Error::BadInternalState(format!("verifier setup: {e}")))?;

    match verifier.verify_oneshot(signature, signed_content) {
        Ok(true) => {
            debug!("RS256 signature verified");
            Ok(leaf)
        }
        Ok(false) => Err(Error::SignatureInvalid(
            "signature does not match the signed content".to_string(),
        )),
        Err(e) => Err(Error::SignatureInvalid(e.to_string())),
    }
}

/// Decode the `x5c` entries (base64 DER, leaf first)
fn decode_chain(x5c: &[String]) -> Result<Vec<X509>, Error> {
    if x5c.is_empty() {
        return Err(Error::MissingCertificateChain(
            "no x5c header parameter".to_string(),
        ));
    }

    x5c.iter()
        .enumerate()
        .map(|(i, c)| {
            let der = base64::decode_str(c)
                .map_err(|e| Error::InvalidCertificateEncoding(format!("x5c[{i}]: {e}")))?;

            X509::from_der(&der)
                .map_err(|e| Error::InvalidCertificateEncoding(format!("x5c[{i}]: {e}")))
        })
        .collect()
}
