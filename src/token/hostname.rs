// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use log::warn;
use openssl::nid::Nid;
use openssl::x509::X509Ref;

/// Check that `leaf` identifies `hostname`.
///
/// DNS subjectAltName entries are authoritative; the subject CN is only
/// consulted when the certificate carries none.
pub fn verify_hostname(hostname: &str, leaf: &X509Ref) -> Result<(), Error> {
    let names = identities(leaf);

    if names.iter().any(|n| matches_identity(hostname, n)) {
        return Ok(());
    }

    warn!("leaf certificate {names:?} not issued for {hostname}");

    Err(Error::IssuerHostnameMismatch(format!(
        "certificate isn't issued for the hostname {hostname}, subject names: {names:?}"
    )))
}

fn identities(leaf: &X509Ref) -> Vec<String> {
    let sans: Vec<String> = leaf
        .subject_alt_names()
        .map(|s| {
            s.iter()
                .filter_map(|n| n.dnsname().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    if !sans.is_empty() {
        return sans;
    }

    leaf.subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .filter_map(|e| e.data().as_utf8().ok().map(|s| s.to_string()))
        .collect()
}

/// Match a host against a certificate identity, which may carry a `*` as its
/// whole left-most label
fn matches_identity(host: &str, identity: &str) -> bool {
    let host = host.trim_end_matches('.');
    let identity = identity.trim_end_matches('.');

    if host.is_empty() || identity.is_empty() {
        return false;
    }

    match identity.strip_prefix("*.") {
        Some(parent) => {
            // a wildcard never stands for a bare registrable domain
            if !parent.contains('.') || parent.contains('*') {
                return false;
            }

            match host.split_once('.') {
                Some((label, rest)) => !label.is_empty() && rest.eq_ignore_ascii_case(parent),
                None => false,
            }
        }
        None => !identity.contains('*') && host.eq_ignore_ascii_case(identity),
    }
}
