// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

extern crate attestation_token;

use attestation_token::store::{ISignerStore, MemoSignerStore};
use attestation_token::token::{validate, AttestationToken, AttestationTokenValidationOptions};
use serde_json::Value;
use std::fs;

fn main() {
    let j = fs::read_to_string("testdata/jwks.json").unwrap();

    let mut s: MemoSignerStore = Default::default();

    s.load_json(&j).unwrap();

    println!("{:#?}", s.lookup("rsa-signer"));

    let raw = fs::read_to_string("testdata/rs256-kid.jwt").unwrap();
    let t: AttestationToken<Value> = AttestationToken::parse(&raw).unwrap();

    validate(&t, &AttestationTokenValidationOptions::default(), &s.signers()).unwrap();

    println!("{:#?}", t.body());
}
