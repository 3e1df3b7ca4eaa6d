// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use attestation_token::store::{ISignerStore, MemoSignerStore};
use attestation_token::token::{
    validate, AttestationSigner, AttestationSigningKey, AttestationToken, AttestationTokenBuilder,
    AttestationTokenValidationOptions,
};
use clap::Parser;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::time::Duration;

#[derive(Parser)]
enum AttestationTokenCli {
    Decode(DecodeArgs),
    Verify(VerifyArgs),
    Create(CreateArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Decode the supplied attestation token and print its header and \
    body")]
struct DecodeArgs {
    #[arg(short, long, default_value = "token.jwt")]
    token: String,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Validate the supplied attestation token, using the signers in \
    the JWKS document and certificates if any are given, or those embedded \
    in the token otherwise")]
struct VerifyArgs {
    #[arg(short, long, default_value = "token.jwt")]
    token: String,

    #[arg(short, long)]
    jwks: Option<String>,

    /// PEM certificate of a trusted signer, may be repeated
    #[arg(short, long)]
    cert: Vec<String>,

    /// Expected value of the iss claim
    #[arg(short, long)]
    issuer: Option<String>,

    /// Clock skew tolerated on exp and nbf, in seconds
    #[arg(short, long, default_value_t = 0)]
    slack: u64,

    #[arg(long)]
    no_time_checks: bool,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Create an attestation token from the supplied JSON body, signed \
    if a key and certificate are given and unsecured otherwise")]
struct CreateArgs {
    #[arg(short, long, default_value = "body.json")]
    body: String,

    #[arg(short, long, requires = "cert")]
    key: Option<String>,

    #[arg(short, long, requires = "key")]
    cert: Option<String>,

    #[arg(long)]
    kid: Option<String>,

    #[arg(short, long, default_value = "token.jwt")]
    out: String,
}

fn main() {
    env_logger::init();

    match AttestationTokenCli::parse() {
        AttestationTokenCli::Decode(args) => match decode(&args) {
            Ok(()) => println!("decoding successful"),
            Err(e) => eprintln!("decoding failed: {e}"),
        },

        AttestationTokenCli::Verify(args) => match verify(&args) {
            Ok(hash) => println!("verification successful, token hash {hash}"),
            Err(e) => eprintln!("verification failed: {e}"),
        },

        AttestationTokenCli::Create(args) => match create(&args) {
            Ok(()) => println!("token written to {}", args.out),
            Err(e) => eprintln!("token creation failed: {e}"),
        },
    }
}

fn read_token(path: &str) -> Result<AttestationToken<Value>, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;

    Ok(AttestationToken::parse(raw.trim())?)
}

fn decode(args: &DecodeArgs) -> Result<(), Box<dyn Error>> {
    let t = read_token(&args.token)?;

    println!("{}", serde_json::to_string_pretty(t.header())?);
    println!("{}", serde_json::to_string_pretty(t.body())?);

    Ok(())
}

fn verify(args: &VerifyArgs) -> Result<String, Box<dyn Error>> {
    let t = read_token(&args.token)?;

    let mut signers: MemoSignerStore = Default::default();
    if let Some(path) = &args.jwks {
        let j = fs::read_to_string(path)?;
        signers.load_json(&j)?;
    }

    for path in &args.cert {
        let pem = fs::read_to_string(path)?;
        signers.add(AttestationSigner::new(None, vec![pem]));
    }

    let mut options = AttestationTokenValidationOptions::default()
        .with_validation_time_slack(Duration::from_secs(args.slack))
        .with_validate_expiration_time(!args.no_time_checks)
        .with_validate_not_before_time(!args.no_time_checks);

    if let Some(issuer) = &args.issuer {
        options = options.with_expected_issuer(issuer);
    }

    validate(&t, &options, &signers.signers())?;

    Ok(hex::encode(t.token_hash()?))
}

fn create(args: &CreateArgs) -> Result<(), Box<dyn Error>> {
    let body: Value = serde_json::from_str(&fs::read_to_string(&args.body)?)?;

    let signing_key = match (&args.key, &args.cert) {
        (Some(key), Some(cert)) => Some(AttestationSigningKey::new(
            fs::read_to_string(key)?,
            fs::read_to_string(cert)?,
        )),
        _ => None,
    };

    let mut builder = AttestationTokenBuilder::new(body);

    if let Some(key) = &signing_key {
        builder = builder.signing_key(key);
    }

    if let Some(kid) = &args.kid {
        builder = builder.key_id(kid);
    }

    let t = builder.build()?;

    fs::write(&args.out, t.raw())?;

    Ok(())
}
