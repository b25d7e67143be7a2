// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Synthetic PKI and token factory shared by the unit tests.

use super::base64;
use super::common::{ATTESTATION_HOSTNAME, RS256};
use super::compact::CompactToken;
use crate::store::{AppIdentity, MemoIdentityStore, MemoTrustAnchorStore};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::sign::Signer;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

pub const ROGUE_HOSTNAME: &str = "attest.example.com";
pub const TEST_PACKAGE: &str = "com.example.app";
pub const TEST_CERT_DIGEST: &str = "tgIz1S6aGbPqOWPizO4kOtx9NE1Bx6Us4iSU+jMR7ts=";
pub const TEST_APK_DIGEST: &str = "g8VAPTRbkIxGzqjmeJ3y1eopi0SMvzDVPSpSUQKpjEk=";
pub const TEST_NONCE: &[u8] = b"0123456789abcdef0123456789abcdef";
pub const TEST_REQUEST_TS: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub root: X509,
    pub intermediate: X509,
    pub intermediate_key: PKey<Private>,
    /// issued by `intermediate` for the attestation hostname
    pub leaf: X509,
    pub leaf_key: PKey<Private>,
    /// issued by `intermediate` for [`ROGUE_HOSTNAME`]
    pub rogue_leaf: X509,
    pub rogue_leaf_key: PKey<Private>,
    /// self-signed, for the attestation hostname
    pub self_signed: X509,
    pub self_signed_key: PKey<Private>,
    /// unrelated CA
    pub rogue_root: X509,
    /// notAfter of every certificate above, seconds since the UNIX epoch
    pub not_after: i64,
}

pub fn fixture() -> &'static Fixture {
    static F: OnceLock<Fixture> = OnceLock::new();

    F.get_or_init(|| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let validity = (now - 86_400, now + 365 * 86_400);

        let root_key = rsa_key();
        let root = make_cert("Test Root CA", &[], &root_key, None, true, validity);

        let intermediate_key = rsa_key();
        let intermediate = make_cert(
            "Test Intermediate CA",
            &[],
            &intermediate_key,
            Some((&root, &root_key)),
            true,
            validity,
        );

        let leaf_key = rsa_key();
        let leaf = make_cert(
            ATTESTATION_HOSTNAME,
            &[ATTESTATION_HOSTNAME],
            &leaf_key,
            Some((&intermediate, &intermediate_key)),
            false,
            validity,
        );

        let rogue_leaf_key = rsa_key();
        let rogue_leaf = make_cert(
            ROGUE_HOSTNAME,
            &[ROGUE_HOSTNAME],
            &rogue_leaf_key,
            Some((&intermediate, &intermediate_key)),
            false,
            validity,
        );

        let self_signed_key = rsa_key();
        let self_signed = make_cert(
            ATTESTATION_HOSTNAME,
            &[ATTESTATION_HOSTNAME],
            &self_signed_key,
            None,
            false,
            validity,
        );

        let rogue_root_key = rsa_key();
        let rogue_root = make_cert("Rogue Root CA", &[], &rogue_root_key, None, true, validity);

        Fixture {
            root,
            intermediate,
            intermediate_key,
            leaf,
            leaf_key,
            rogue_leaf,
            rogue_leaf_key,
            self_signed,
            self_signed_key,
            rogue_root,
            not_after: validity.1,
        }
    })
}

fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

fn make_cert(
    cn: &str,
    sans: &[&str],
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
    ca: bool,
    validity: (i64, i64),
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("O", "Test").unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

    let mut b = X509Builder::new().unwrap();
    b.set_version(2).unwrap();
    b.set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();
    b.set_subject_name(&name).unwrap();
    match issuer {
        Some((c, _)) => b.set_issuer_name(c.subject_name()).unwrap(),
        None => b.set_issuer_name(&name).unwrap(),
    }
    b.set_pubkey(key).unwrap();
    b.set_not_before(&Asn1Time::from_unix(validity.0 as _).unwrap())
        .unwrap();
    b.set_not_after(&Asn1Time::from_unix(validity.1 as _).unwrap())
        .unwrap();

    if ca {
        b.append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        b.append_extension(
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .unwrap(),
        )
        .unwrap();
    } else {
        b.append_extension(BasicConstraints::new().build().unwrap())
            .unwrap();
        b.append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .key_encipherment()
                .build()
                .unwrap(),
        )
        .unwrap();
        b.append_extension(ExtendedKeyUsage::new().server_auth().build().unwrap())
            .unwrap();

        if !sans.is_empty() {
            let mut san = SubjectAlternativeName::new();
            for s in sans {
                san.dns(s);
            }
            let ext = san
                .build(&b.x509v3_context(issuer.map(|(c, _)| &**c), None))
                .unwrap();
            b.append_extension(ext).unwrap();
        }
    }

    let signing_key = issuer.map(|(_, k)| k).unwrap_or(key);
    b.sign(signing_key, MessageDigest::sha256()).unwrap();

    b.build()
}

/// A leaf for the given CN and DNS names, issued by the fixture intermediate
pub fn leaf_with_names(cn: &str, sans: &[&str]) -> X509 {
    let f = fixture();

    make_cert(
        cn,
        sans,
        &f.leaf_key,
        Some((&f.intermediate, &f.intermediate_key)),
        false,
        (0, f.not_after),
    )
}

/// RS256 signature over `data`
pub fn sign(data: &[u8], key: &PKey<Private>) -> Vec<u8> {
    let mut s = Signer::new(MessageDigest::sha256(), key).unwrap();
    s.sign_oneshot_to_vec(data).unwrap()
}

/// JOSE header JSON with the given algorithm and `x5c` chain
pub fn header_json(alg: &str, chain: &[&X509]) -> Vec<u8> {
    let x5c: Vec<String> = chain
        .iter()
        .map(|c| base64::encode_str(&c.to_der().unwrap()))
        .collect();

    serde_json::json!({ "alg": alg, "x5c": x5c })
        .to_string()
        .into_bytes()
}

/// A fully consistent statement for [`TEST_PACKAGE`]
pub fn statement_json(nonce: &[u8], timestamp_ms: i64) -> Vec<u8> {
    serde_json::json!({
        "nonce": base64::encode_str(nonce),
        "timestampMs": timestamp_ms,
        "apkPackageName": TEST_PACKAGE,
        "apkDigestSha256": TEST_APK_DIGEST,
        "ctsProfileMatch": true,
        "apkCertificateDigestSha256": [TEST_CERT_DIGEST],
        "basicIntegrity": true,
        "evaluationType": "BASIC"
    })
    .to_string()
    .into_bytes()
}

/// Sign `header` and `payload` with `key` and serialize in compact form
pub fn make_token(header: &[u8], payload: &[u8], key: &PKey<Private>) -> String {
    let input = CompactToken::signing_input(header, payload);
    let sig = sign(input.as_bytes(), key);

    CompactToken::encode(header, payload, &sig)
}

/// A token for `payload`, signed by the fixture leaf with its full chain
pub fn good_token(payload: &[u8]) -> String {
    let f = fixture();
    let header = header_json(RS256, &[&f.leaf, &f.intermediate]);

    make_token(&header, payload, &f.leaf_key)
}

/// A trust anchor store holding the fixture root
pub fn trust_anchors() -> MemoTrustAnchorStore {
    let s = MemoTrustAnchorStore::new();
    s.add(fixture().root.clone()).unwrap();
    s
}

/// An identity store matching [`statement_json`]
pub fn identities() -> MemoIdentityStore {
    let s = MemoIdentityStore::new();
    s.add(AppIdentity {
        package_name: TEST_PACKAGE.to_string(),
        certificate_digests: vec![TEST_CERT_DIGEST.to_string()],
        apk_digest: Some(TEST_APK_DIGEST.to_string()),
    });
    s
}
