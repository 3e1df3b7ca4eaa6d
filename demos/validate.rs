// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

extern crate attestation_token;

use attestation_token::token::{
    validate, AttestationResult, AttestationToken, AttestationTokenValidationOptions,
};
use std::fs;

fn main() {
    signed_tokens_validate();
}

fn signed_tokens_validate() {
    let files = vec!["testdata/es256-x5c.jwt", "testdata/ps256-x5c.jwt"];

    let options = AttestationTokenValidationOptions::default()
        .with_expected_issuer("https://attest.example");

    for f in files {
        let raw = fs::read_to_string(f).unwrap_or_else(|_| panic!("loading file {}", f));

        let t: AttestationToken<AttestationResult> = AttestationToken::parse(&raw).unwrap();

        validate(&t, &options, &[]).unwrap();

        println!("{} ({}): {:#?}", f, t.header().algorithm, t.body());
    }
}
