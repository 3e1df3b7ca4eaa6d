// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::attestation_token::AttestationToken;
use super::base64;
use super::claims::StandardClaims;
use super::codec::{BodyCodec, JsonCodec};
use super::crypto::{Certificate, PrivateKey};
use super::errors::Error;
use super::header::AttestationTokenHeader;
use serde::Serialize;
use serde_json::Value;

/// A private key and the certificate for its public half, both PEM encoded
#[derive(Clone, Debug)]
pub struct AttestationSigningKey {
    pub private_key_pem: String,
    pub certificate_pem: String,
}

impl AttestationSigningKey {
    pub fn new(private_key_pem: impl Into<String>, certificate_pem: impl Into<String>) -> Self {
        Self {
            private_key_pem: private_key_pem.into(),
            certificate_pem: certificate_pem.into(),
        }
    }
}

/// Assembles an [`AttestationToken`] from a body and optional signing
/// material.  Without a signing key the token is unsecured (`alg` is
/// `none` and the signature is empty).
pub struct AttestationTokenBuilder<'a, T, C = JsonCodec> {
    body: T,
    codec: C,
    signing_key: Option<&'a AttestationSigningKey>,
    key_id: Option<String>,
    claims: StandardClaims,
}

impl<'a, T> AttestationTokenBuilder<'a, T, JsonCodec> {
    pub fn new(body: T) -> Self {
        Self::with_codec(body, JsonCodec)
    }
}

impl<'a, T, C> AttestationTokenBuilder<'a, T, C> {
    pub fn with_codec(body: T, codec: C) -> Self {
        Self {
            body,
            codec,
            signing_key: None,
            key_id: None,
            claims: StandardClaims::default(),
        }
    }

    /// Sign the token with `key`
    pub fn signing_key(mut self, key: &'a AttestationSigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Set the `kid` header parameter
    pub fn key_id(mut self, kid: impl Into<String>) -> Self {
        self.key_id = Some(kid.into());
        self
    }

    /// Registered claims added to the serialized body, overriding any the
    /// body already carries.  Only applies to bodies that serialize to a
    /// JSON object.
    pub fn claims(mut self, claims: StandardClaims) -> Self {
        self.claims = claims;
        self
    }
}

impl<'a, T, C> AttestationTokenBuilder<'a, T, C>
where
    C: BodyCodec<T>,
{
    /// Encode, sign, and re-parse the token, so that the result is
    /// byte-for-byte what a receiver would decode
    pub fn build(self) -> Result<AttestationToken<T>, Error> {
        let (mut header, signer) = match self.signing_key {
            None => (AttestationTokenHeader::unsecured(), None),
            Some(key) => {
                let cert = Certificate::from_pem(&key.certificate_pem)?;
                let private_key = PrivateKey::from_pem(&key.private_key_pem)?;

                let alg = cert.algorithm()?;

                if private_key.algorithm()? != alg {
                    return Err(Error::KeyImport(format!(
                        "private key is not a {alg} key"
                    )));
                }

                if !private_key.matches(&cert)? {
                    return Err(Error::KeyImport(
                        "private key does not match the certificate".to_string(),
                    ));
                }

                let header = AttestationTokenHeader {
                    algorithm: alg.as_str().to_string(),
                    r#type: Some(cert.key_type()?.to_string()),
                    x509_certificate_chain: Some(vec![cert.export_base64()?]),
                    ..Default::default()
                };

                (header, Some((private_key, alg)))
            }
        };

        header.key_id = self.key_id;

        let mut json_body = self.codec.serialize(&self.body)?;
        if let Value::Object(obj) = &mut json_body {
            self.claims.apply_to(obj);
        }

        let encoded_header = encode_json("header", &header)?;
        let encoded_body = encode_json("body", &json_body)?;
        let signed_elements = format!("{encoded_header}.{encoded_body}");

        let raw = match signer {
            Some((private_key, alg)) => {
                let signature = private_key.sign(alg, signed_elements.as_bytes())?;
                format!("{signed_elements}.{}", base64::encode(&signature))
            }
            None => format!("{signed_elements}."),
        };

        AttestationToken::parse_with(&raw, &self.codec)
    }
}

fn encode_json<S: Serialize>(what: &str, v: &S) -> Result<String, Error> {
    let bytes = serde_json::to_vec(v).map_err(|e| Error::from_json(what, e))?;

    Ok(base64::encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::options::AttestationTokenValidationOptions;
    use crate::token::results::{AttestationResult, StoredAttestationPolicy};
    use crate::token::signer::AttestationSigner;
    use crate::token::validator::validate;
    use crate::token::verifier::verify_signature;
    use chrono::DateTime;
    use serde_json::json;

    const RSA_KEY: &str = include_str!("../../testdata/rsa-key.pem");
    const RSA_CERT: &str = include_str!("../../testdata/rsa-cert.pem");
    const ES256_KEY: &str = include_str!("../../testdata/es256-key.pem");
    const ES256_CERT: &str = include_str!("../../testdata/es256-cert.pem");
    const ES384_KEY: &str = include_str!("../../testdata/es384-key.pem");
    const ES384_CERT: &str = include_str!("../../testdata/es384-cert.pem");
    const ES512_KEY: &str = include_str!("../../testdata/es512-key.pem");
    const ES512_CERT: &str = include_str!("../../testdata/es512-cert.pem");

    fn sample_result() -> AttestationResult {
        AttestationResult {
            nonce: Some("bm9uY2U".to_string()),
            verifier_type: Some("sgx".to_string()),
            sgx_mrenclave: Some(vec![0x5a; 32]),
            sgx_svn: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn unsecured_round_trip() {
        let t = AttestationTokenBuilder::new(sample_result()).build().unwrap();

        assert_eq!(t.header().algorithm, "none");
        assert!(t.is_unsecured());
        assert!(t.signature().is_empty());
        assert!(t.raw().ends_with('.'));
        assert!(t.raw().starts_with("eyJhbGciOiJub25lIn0."));
        assert_eq!(t.body(), &sample_result());

        let opts = AttestationTokenValidationOptions::default();
        assert_eq!(validate(&t, &opts, &[]), Ok(()));
    }

    #[test]
    fn signed_round_trip() {
        for (key, cert, alg, kty) in [
            (ES256_KEY, ES256_CERT, "ES256", "EC"),
            (ES384_KEY, ES384_CERT, "ES384", "EC"),
            (ES512_KEY, ES512_CERT, "ES512", "EC"),
            (RSA_KEY, RSA_CERT, "RS256", "RSA"),
        ] {
            let signing_key = AttestationSigningKey::new(key, cert);

            let t = AttestationTokenBuilder::new(sample_result())
                .signing_key(&signing_key)
                .build()
                .unwrap();

            assert_eq!(t.header().algorithm, alg);
            assert_eq!(t.header().r#type.as_deref(), Some(kty));
            assert_eq!(t.header().x509_certificate_chain.as_ref().unwrap().len(), 1);
            assert!(!t.signature().is_empty());
            assert_eq!(t.body(), &sample_result());

            let parsed: AttestationToken<AttestationResult> =
                AttestationToken::parse(t.raw()).unwrap();
            assert_eq!(parsed.body(), &sample_result());
            assert_eq!(parsed.signed_elements(), t.signed_elements());

            // verifies against the embedded certificate and the caller's
            assert!(validate(&parsed, &AttestationTokenValidationOptions::default(), &[]).is_ok());
            let signer = AttestationSigner::new(None, vec![cert.to_string()]);
            assert!(verify_signature(&parsed, &[signer]).is_some());
        }
    }

    #[test]
    fn key_id_and_claims() {
        let signing_key = AttestationSigningKey::new(ES256_KEY, ES256_CERT);
        let claims = StandardClaims {
            issuer: Some("https://attest.example".to_string()),
            expires_on: DateTime::from_timestamp(4102444800, 0),
            ..Default::default()
        };

        let t = AttestationTokenBuilder::new(json!({"nonce": "abc"}))
            .signing_key(&signing_key)
            .key_id("es256-signer")
            .claims(claims)
            .build()
            .unwrap();

        assert_eq!(t.header().key_id.as_deref(), Some("es256-signer"));
        assert_eq!(t.issuer(), Some("https://attest.example"));
        assert_eq!(t.expires_on().unwrap().timestamp(), 4102444800);
        assert_eq!(
            t.body(),
            &json!({"nonce": "abc", "iss": "https://attest.example", "exp": 4102444800i64})
        );

        // the kid now selects among supplied signers
        let signers = vec![
            AttestationSigner::new(Some("other".to_string()), vec![RSA_CERT.to_string()]),
            AttestationSigner::new(Some("es256-signer".to_string()), vec![ES256_CERT.to_string()]),
        ];
        let opts = AttestationTokenValidationOptions::default()
            .with_expected_issuer("https://attest.example");
        assert_eq!(validate(&t, &opts, &signers), Ok(()));
    }

    #[test]
    fn policy_token() {
        let signing_key = AttestationSigningKey::new(RSA_KEY, RSA_CERT);

        let t = AttestationTokenBuilder::new(StoredAttestationPolicy::new("version=1.0;"))
            .signing_key(&signing_key)
            .build()
            .unwrap();

        assert_eq!(
            t.body().policy().unwrap().as_deref(),
            Some("version=1.0;")
        );
        assert_eq!(t.token_hash().unwrap().len(), 32);
    }

    #[test]
    fn bad_signing_material() {
        let bad_key = AttestationSigningKey::new("garbage", ES256_CERT);
        let r = AttestationTokenBuilder::new(json!({})).signing_key(&bad_key).build();
        assert!(matches!(r, Err(Error::KeyImport(_))));

        let bad_cert = AttestationSigningKey::new(ES256_KEY, "garbage");
        let r = AttestationTokenBuilder::new(json!({})).signing_key(&bad_cert).build();
        assert!(matches!(r, Err(Error::KeyImport(_))));

        let other_curve = AttestationSigningKey::new(ES256_KEY, ES384_CERT);
        let r = AttestationTokenBuilder::new(json!({}))
            .signing_key(&other_curve)
            .build();
        assert!(matches!(r, Err(Error::KeyImport(_))));

        let mismatched = AttestationSigningKey::new(ES256_KEY, RSA_CERT);
        let r = AttestationTokenBuilder::new(json!({}))
            .signing_key(&mismatched)
            .build();
        assert!(matches!(r, Err(Error::KeyImport(_))));
    }
}
