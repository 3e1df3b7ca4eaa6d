// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::attestation_token::AttestationToken;
use super::crypto::{Certificate, SigningAlgorithm};
use super::errors::Error;
use super::signer::AttestationSigner;
use log::debug;

/// Try each candidate in turn and return the first one whose leaf
/// certificate verifies the token signature.  `None` means no candidate
/// matched (including when there are no candidates at all).
pub fn verify_signature<T>(
    token: &AttestationToken<T>,
    candidates: &[AttestationSigner],
) -> Option<AttestationSigner> {
    let alg = match token.header().algorithm.parse::<SigningAlgorithm>() {
        Ok(alg) => alg,
        Err(e) => {
            debug!("cannot verify token signature: {e}");
            return None;
        }
    };

    candidates
        .iter()
        .find(|candidate| match verify_with(token, alg, candidate) {
            Ok(verified) => {
                debug!(
                    "signer {:?}: signature {}",
                    candidate.key_id,
                    if verified { "verified" } else { "rejected" }
                );
                verified
            }
            Err(e) => {
                debug!("signer {:?} skipped: {e}", candidate.key_id);
                false
            }
        })
        .cloned()
}

fn verify_with<T>(
    token: &AttestationToken<T>,
    alg: SigningAlgorithm,
    signer: &AttestationSigner,
) -> Result<bool, Error> {
    let leaf = signer
        .leaf()
        .ok_or_else(|| Error::KeyImport("empty certificate chain".to_string()))?;

    let public_key = Certificate::from_pem(leaf)?.public_key()?;

    public_key.verify(
        alg,
        token.signed_elements().as_bytes(),
        token.signature(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::base64;
    use serde_json::Value;

    const TEST_ES256_X5C: &str = include_str!("../../testdata/es256-x5c.jwt");
    const TEST_RS256_KID: &str = include_str!("../../testdata/rs256-kid.jwt");
    const RSA_CERT: &str = include_str!("../../testdata/rsa-cert.pem");
    const ES256_CERT: &str = include_str!("../../testdata/es256-cert.pem");
    const ES384_CERT: &str = include_str!("../../testdata/es384-cert.pem");

    fn signer(kid: &str, cert: &str) -> AttestationSigner {
        AttestationSigner::new(Some(kid.to_string()), vec![cert.to_string()])
    }

    #[test]
    fn first_matching_signer_wins() {
        let t: AttestationToken<Value> = AttestationToken::parse(TEST_ES256_X5C).unwrap();

        let candidates = vec![
            signer("rsa", RSA_CERT),
            signer("es384", ES384_CERT),
            signer("es256", ES256_CERT),
            signer("es256-again", ES256_CERT),
        ];

        let found = verify_signature(&t, &candidates).unwrap();
        assert_eq!(found.key_id.as_deref(), Some("es256"));
    }

    #[test]
    fn rsa_signature_from_external_signer() {
        let t: AttestationToken<Value> = AttestationToken::parse(TEST_RS256_KID).unwrap();

        let found = verify_signature(&t, &[signer("rsa-signer", RSA_CERT)]);
        assert!(found.is_some());
    }

    #[test]
    fn exhausted_or_empty_candidates() {
        let t: AttestationToken<Value> = AttestationToken::parse(TEST_ES256_X5C).unwrap();

        assert!(verify_signature(&t, &[]).is_none());
        assert!(verify_signature(&t, &[signer("rsa", RSA_CERT)]).is_none());
    }

    #[test]
    fn unusable_candidates_are_skipped() {
        let t: AttestationToken<Value> = AttestationToken::parse(TEST_ES256_X5C).unwrap();

        let candidates = vec![
            AttestationSigner::new(Some("empty".to_string()), vec![]),
            signer("garbage", "not a certificate"),
            signer("good", ES256_CERT),
        ];

        let found = verify_signature(&t, &candidates).unwrap();
        assert_eq!(found.key_id.as_deref(), Some("good"));
    }

    #[test]
    fn tampered_body_fails() {
        let mut parts: Vec<&str> = TEST_ES256_X5C.split('.').collect();
        let body = base64::encode(br#"{"iss":"https://evil.example"}"#);
        parts[1] = &body;
        let tampered = parts.join(".");

        let t: AttestationToken<Value> = AttestationToken::parse(&tampered).unwrap();

        assert!(verify_signature(&t, &[signer("es256", ES256_CERT)]).is_none());
    }

    #[test]
    fn unsupported_algorithm() {
        // {"alg":"HS256"}.{}.AAAA
        let t: AttestationToken<Value> =
            AttestationToken::parse("eyJhbGciOiJIUzI1NiJ9.e30.AAAA").unwrap();

        assert!(verify_signature(&t, &[signer("rsa", RSA_CERT)]).is_none());
    }
}
