// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use log::debug;
use openssl::error::ErrorStack;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::verify::{X509CheckFlags, X509VerifyParam};
use openssl::x509::{X509PurposeId, X509StoreContext, X509};

/// Evaluate `chain` (leaf first) against the roots put in place by
/// `make_store`.  Trust is established first without any name constraint, so
/// that a hostname failure is only ever reported for an otherwise trusted
/// chain.
pub(crate) fn evaluate<F>(
    make_store: F,
    chain: &[X509],
    hostname: &str,
    at_time: Option<i64>,
) -> Result<(), Error>
where
    F: Fn() -> Result<X509StoreBuilder, ErrorStack>,
{
    let (leaf, rest) = chain
        .split_first()
        .ok_or_else(|| Error::Untrusted("empty certificate chain".to_string()))?;

    let mut intermediates = Stack::new().map_err(|e| Error::Untrusted(e.to_string()))?;
    for c in rest {
        intermediates
            .push(c.clone())
            .map_err(|e| Error::Untrusted(e.to_string()))?;
    }

    run(&make_store, leaf, &intermediates, None, at_time).map_err(Error::Untrusted)?;

    debug!(
        "chain of {} certificate(s) is trusted, binding to {hostname}",
        chain.len()
    );

    run(&make_store, leaf, &intermediates, Some(hostname), at_time)
        .map_err(Error::HostnameMismatch)?;

    Ok(())
}

fn run<F>(
    make_store: &F,
    leaf: &X509,
    intermediates: &Stack<X509>,
    hostname: Option<&str>,
    at_time: Option<i64>,
) -> Result<(), String>
where
    F: Fn() -> Result<X509StoreBuilder, ErrorStack>,
{
    let mut param = X509VerifyParam::new().map_err(|e| e.to_string())?;

    param
        .set_purpose(X509PurposeId::SSL_SERVER)
        .map_err(|e| e.to_string())?;

    if let Some(h) = hostname {
        param.set_hostflags(X509CheckFlags::NO_PARTIAL_WILDCARDS);
        param.set_host(h).map_err(|e| e.to_string())?;
    }

    if let Some(t) = at_time {
        param.set_time(t as _);
    }

    let mut builder = make_store().map_err(|e| e.to_string())?;
    builder.set_param(&param).map_err(|e| e.to_string())?;
    let store = builder.build();

    let mut ctx = X509StoreContext::new().map_err(|e| e.to_string())?;

    ctx.init(&store, leaf, intermediates, |c| {
        if c.verify_cert()? {
            Ok(Ok(()))
        } else {
            Ok(Err(format!(
                "{} (depth {})",
                c.error().error_string(),
                c.error_depth()
            )))
        }
    })
    .map_err(|e| e.to_string())?
}
