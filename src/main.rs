// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use log::{debug, info, warn};
use openssl::hash::MessageDigest;
use openssl::x509::X509;
use safetynet_token::store::{
    AppIdentity, ITrustAnchorStore, MemoIdentityStore, MemoTrustAnchorStore,
    SystemTrustAnchorStore,
};
use safetynet_token::token::{
    self, AttestationStatement, Jws, ValidationPolicy, VerificationContext, Verifier,
};
use serde::Deserialize;
use serde_with::base64::Base64;
use serde_with::serde_as;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

#[derive(Parser)]
enum SafetyNetCli {
    Decode(DecodeArgs),
    Verify(VerifyArgs),
    Identity(IdentityArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Decode the supplied attestation token without verifying it")]
struct DecodeArgs {
    #[arg(short, long, default_value = "token.jws")]
    token: String,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Verify the signature and certificate chain of the supplied \
    attestation token and, if a request context is given, validate its claims")]
struct VerifyArgs {
    #[arg(short, long, default_value = "token.jws")]
    token: String,

    /// Trust anchors, as a PEM bundle or a JSON (.json) file
    #[arg(long, default_value = "tastore.pem", conflicts_with = "system_roots")]
    tastore: String,

    /// Use the platform's default trust anchors instead of --tastore
    #[arg(long)]
    system_roots: bool,

    /// JSON file with the base64 nonce and the timestamp (ms) of the request
    #[arg(short, long)]
    context: Option<String>,

    #[arg(short, long, default_value = "identities.json")]
    identities: String,

    /// Package name of the application that requested the attestation
    #[arg(short, long)]
    package: Option<String>,

    #[arg(long)]
    check_apk_digest: bool,

    /// Evaluate the certificate chain at this time (seconds since the UNIX
    /// epoch) rather than now
    #[arg(long)]
    at_time: Option<i64>,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Compute the identity of an application from its signing \
    certificates and binary, for use with verify --identities")]
struct IdentityArgs {
    #[arg(short, long)]
    package: String,

    /// Signing certificate (PEM or DER), in the order the platform reports them
    #[arg(short, long, required = true)]
    cert: Vec<String>,

    #[arg(short, long)]
    apk: Option<String>,

    #[arg(short, long, default_value = "identities.json")]
    output: String,
}

/// The verifier-side record of an attestation request
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RequestContext {
    #[serde_as(as = "Base64")]
    nonce: Vec<u8>,
    timestamp_ms: i64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init()
        .ok();

    match SafetyNetCli::parse() {
        SafetyNetCli::Decode(args) => match decode(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("decoding failed: {e}");
                ExitCode::FAILURE
            }
        },

        SafetyNetCli::Verify(args) => match verify(&args) {
            Ok(s) => {
                println!("verification successful");
                println!("{}", serde_json::to_string_pretty(&s).unwrap_or_default());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("verification failed: {e}");
                if let Some(s) = e.downcast_ref::<token::Error>().and_then(|e| e.statement()) {
                    eprintln!(
                        "untrusted statement:\n{}",
                        serde_json::to_string_pretty(s).unwrap_or_default()
                    );
                }
                ExitCode::FAILURE
            }
        },

        SafetyNetCli::Identity(args) => match identity(&args) {
            Ok(()) => {
                println!("identity written to {}", args.output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("identity computation failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn read_token(path: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

fn decode(args: &DecodeArgs) -> Result<(), Box<dyn Error>> {
    let jws: Jws = Jws::decode(&read_token(&args.token)?)?;

    println!("header:\n{}", serde_json::to_string_pretty(&jws.header)?);
    println!("payload:\n{}", serde_json::to_string_pretty(&jws.payload)?);

    Ok(())
}

fn verify(args: &VerifyArgs) -> Result<AttestationStatement, Box<dyn Error>> {
    let token = read_token(&args.token)?;

    if args.system_roots {
        let mut tas = SystemTrustAnchorStore::new();
        if let Some(t) = args.at_time {
            tas = tas.at_time(t);
        }

        return verify_with(args, &token, &tas);
    }

    let mut tas = MemoTrustAnchorStore::new();
    if let Some(t) = args.at_time {
        tas = tas.at_time(t);
    }

    if args.tastore.ends_with(".json") {
        tas.load_json(&fs::read_to_string(&args.tastore)?)?;
    } else {
        tas.load_pem(&fs::read(&args.tastore)?)?;
    }

    debug!("loaded {} trust anchor(s) from {}", tas.len(), args.tastore);

    verify_with(args, &token, &tas)
}

fn verify_with<T: ITrustAnchorStore>(
    args: &VerifyArgs,
    token: &str,
    tas: &T,
) -> Result<AttestationStatement, Box<dyn Error>> {
    let Some(context) = &args.context else {
        let jws: Jws = Jws::decode(token)?;
        let leaf = jws.verify(tas)?;

        info!(
            "signed by leaf certificate with SHA-256 fingerprint {}",
            hex::encode(&*leaf.digest(MessageDigest::sha256())?)
        );
        warn!("no request context supplied, claims were not validated");

        return Ok(jws.payload);
    };

    let package = args
        .package
        .as_deref()
        .ok_or("--package is required to validate claims")?;

    let rc: RequestContext = serde_json::from_str(&fs::read_to_string(context)?)?;

    let mut ids = MemoIdentityStore::new();
    ids.load_json(&fs::read_to_string(&args.identities)?)?;

    let v = Verifier::new(tas, &ids, package).with_policy(ValidationPolicy {
        check_apk_digest: args.check_apk_digest,
    });

    Ok(v.verify(token, VerificationContext::new(rc.nonce, rc.timestamp_ms))?)
}

fn identity(args: &IdentityArgs) -> Result<(), Box<dyn Error>> {
    let mut certs = vec![];

    for path in &args.cert {
        let buf = fs::read(path)?;

        let cert = if buf.starts_with(b"-----BEGIN") {
            X509::from_pem(&buf)?
        } else {
            X509::from_der(&buf)?
        };

        certs.push(cert.to_der()?);
    }

    let apk = args.apk.as_ref().map(fs::read).transpose()?;

    let id = AppIdentity::from_artifacts(&args.package, &certs, apk.as_deref());

    fs::write(&args.output, serde_json::to_string_pretty(&vec![id])?)?;

    Ok(())
}
