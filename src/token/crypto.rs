// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! openssl-backed certificate and key handling for JWS signing and
//! verification.

use super::base64;
use super::errors::Error;
use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig;
use openssl::hash::{hash, MessageDigest};
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Private, Public};
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Signer, Verifier};
use openssl::x509::X509;
use std::fmt;
use std::str::FromStr;

/// JWS signature algorithms supported by the engine (RFC 7518 §3.1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningAlgorithm {
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
}

impl SigningAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::RS256 => "RS256",
            SigningAlgorithm::RS384 => "RS384",
            SigningAlgorithm::RS512 => "RS512",
            SigningAlgorithm::PS256 => "PS256",
            SigningAlgorithm::PS384 => "PS384",
            SigningAlgorithm::PS512 => "PS512",
            SigningAlgorithm::ES256 => "ES256",
            SigningAlgorithm::ES384 => "ES384",
            SigningAlgorithm::ES512 => "ES512",
        }
    }

    fn digest(&self) -> MessageDigest {
        match self {
            SigningAlgorithm::RS256 | SigningAlgorithm::PS256 | SigningAlgorithm::ES256 => {
                MessageDigest::sha256()
            }
            SigningAlgorithm::RS384 | SigningAlgorithm::PS384 | SigningAlgorithm::ES384 => {
                MessageDigest::sha384()
            }
            SigningAlgorithm::RS512 | SigningAlgorithm::PS512 | SigningAlgorithm::ES512 => {
                MessageDigest::sha512()
            }
        }
    }

    fn key_id(&self) -> Id {
        match self {
            SigningAlgorithm::ES256 | SigningAlgorithm::ES384 | SigningAlgorithm::ES512 => Id::EC,
            _ => Id::RSA,
        }
    }

    fn is_pss(&self) -> bool {
        matches!(
            self,
            SigningAlgorithm::PS256 | SigningAlgorithm::PS384 | SigningAlgorithm::PS512
        )
    }

    /// Size in bytes of each of the r and s halves of a JWS ECDSA signature
    fn ec_coordinate_size(&self) -> Option<usize> {
        match self {
            SigningAlgorithm::ES256 => Some(32),
            SigningAlgorithm::ES384 => Some(48),
            SigningAlgorithm::ES512 => Some(66),
            _ => None,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "RS256" => Ok(SigningAlgorithm::RS256),
            "RS384" => Ok(SigningAlgorithm::RS384),
            "RS512" => Ok(SigningAlgorithm::RS512),
            "PS256" => Ok(SigningAlgorithm::PS256),
            "PS384" => Ok(SigningAlgorithm::PS384),
            "PS512" => Ok(SigningAlgorithm::PS512),
            "ES256" => Ok(SigningAlgorithm::ES256),
            "ES384" => Ok(SigningAlgorithm::ES384),
            "ES512" => Ok(SigningAlgorithm::ES512),
            x => Err(Error::KeyImport(format!("unsupported algorithm {x}"))),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn algorithm_for_key<T: openssl::pkey::HasPublic>(
    pkey: &PKey<T>,
) -> Result<SigningAlgorithm, Error> {
    match pkey.id() {
        Id::RSA => Ok(SigningAlgorithm::RS256),
        Id::EC => {
            let ec = pkey.ec_key().map_err(|e| Error::KeyImport(e.to_string()))?;

            match ec.group().curve_name() {
                Some(Nid::X9_62_PRIME256V1) => Ok(SigningAlgorithm::ES256),
                Some(Nid::SECP384R1) => Ok(SigningAlgorithm::ES384),
                Some(Nid::SECP521R1) => Ok(SigningAlgorithm::ES512),
                c => Err(Error::KeyImport(format!(
                    "unsupported EC curve {:?}",
                    c.map(|n| n.as_raw())
                ))),
            }
        }
        id => Err(Error::KeyImport(format!(
            "unsupported key type {}",
            id.as_raw()
        ))),
    }
}

/// An X.509 certificate
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
}

impl Certificate {
    /// Import a PEM encoded certificate
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let x509 = X509::from_pem(pem.as_bytes())
            .map_err(|e| Error::KeyImport(format!("certificate: {e}")))?;

        Ok(Self { x509 })
    }

    /// Import a DER encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let x509 =
            X509::from_der(der).map_err(|e| Error::KeyImport(format!("certificate: {e}")))?;

        Ok(Self { x509 })
    }

    /// Import a certificate from a standard base64 DER string (an `x5c` entry)
    pub fn from_base64(b64: &str) -> Result<Self, Error> {
        Self::from_der(&base64::decode_std(b64)?)
    }

    pub fn public_key(&self) -> Result<PublicKey, Error> {
        let pkey = self
            .x509
            .public_key()
            .map_err(|e| Error::KeyImport(format!("certificate public key: {e}")))?;

        Ok(PublicKey { pkey })
    }

    /// The JWS algorithm implied by the certificate's key
    pub fn algorithm(&self) -> Result<SigningAlgorithm, Error> {
        let pkey = self
            .x509
            .public_key()
            .map_err(|e| Error::KeyImport(format!("certificate public key: {e}")))?;

        algorithm_for_key(&pkey)
    }

    /// The JWK key type ("RSA" or "EC") of the certificate's key
    pub fn key_type(&self) -> Result<&'static str, Error> {
        match self.algorithm()?.key_id() {
            Id::EC => Ok("EC"),
            _ => Ok("RSA"),
        }
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.x509
            .to_der()
            .map_err(|e| Error::KeyImport(format!("certificate export: {e}")))
    }

    /// Export as standard base64 DER, suitable for an `x5c` entry
    pub fn export_base64(&self) -> Result<String, Error> {
        Ok(base64::encode_std(&self.to_der()?))
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = self
            .x509
            .to_pem()
            .map_err(|e| Error::KeyImport(format!("certificate export: {e}")))?;

        String::from_utf8(pem).map_err(|e| Error::KeyImport(e.to_string()))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate").finish_non_exhaustive()
    }
}

/// Convert a standard base64 DER certificate (an `x5c` entry) to PEM
pub fn x5c_to_pem(b64: &str) -> Result<String, Error> {
    Certificate::from_base64(b64)?.to_pem()
}

/// A public key extracted from a certificate
pub struct PublicKey {
    pkey: PKey<Public>,
}

impl PublicKey {
    /// Check `signature` over `data` using `alg`.  A signature that does not
    /// verify, including one produced for a different key type, yields
    /// `Ok(false)`; errors are reserved for the crypto library failing.
    pub fn verify(
        &self,
        alg: SigningAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        if self.pkey.id() != alg.key_id() {
            return Ok(false);
        }

        let der_sig;
        let signature = match alg.ec_coordinate_size() {
            Some(size) => {
                if signature.len() != 2 * size {
                    return Ok(false);
                }
                der_sig = raw_to_der_signature(signature, size)?;
                der_sig.as_slice()
            }
            None => signature,
        };

        let mut verifier = Verifier::new(alg.digest(), &self.pkey)
            .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;

        if alg.is_pss() {
            verifier
                .set_rsa_padding(Padding::PKCS1_PSS)
                .and_then(|_| verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH))
                .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;
        } else if alg.key_id() == Id::RSA {
            verifier
                .set_rsa_padding(Padding::PKCS1)
                .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;
        }

        verifier
            .update(data)
            .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;

        // openssl reports a bad signature either as `false` or as an error
        // stack depending on the key type
        Ok(verifier.verify(signature).unwrap_or(false))
    }
}

/// A private signing key
pub struct PrivateKey {
    pkey: PKey<Private>,
}

impl PrivateKey {
    /// Import a PEM encoded private key (PKCS#8, or traditional RSA/EC)
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pkey = PKey::private_key_from_pem(pem.as_bytes())
            .map_err(|e| Error::KeyImport(format!("private key: {e}")))?;

        Ok(Self { pkey })
    }

    /// True if this key is the private half of the certificate's public key
    pub fn matches(&self, cert: &Certificate) -> Result<bool, Error> {
        let public = cert.public_key()?;

        Ok(self.pkey.public_eq(&public.pkey))
    }

    pub fn algorithm(&self) -> Result<SigningAlgorithm, Error> {
        algorithm_for_key(&self.pkey)
    }

    /// Sign `data` using `alg`, returning the JWS encoding of the signature
    pub fn sign(&self, alg: SigningAlgorithm, data: &[u8]) -> Result<Vec<u8>, Error> {
        if self.pkey.id() != alg.key_id() {
            return Err(Error::Signing(format!(
                "{alg} cannot be used with this key type"
            )));
        }

        let mut signer =
            Signer::new(alg.digest(), &self.pkey).map_err(|e| Error::Signing(e.to_string()))?;

        if alg.is_pss() {
            signer
                .set_rsa_padding(Padding::PKCS1_PSS)
                .and_then(|_| signer.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH))
                .map_err(|e| Error::Signing(e.to_string()))?;
        } else if alg.key_id() == Id::RSA {
            signer
                .set_rsa_padding(Padding::PKCS1)
                .map_err(|e| Error::Signing(e.to_string()))?;
        }

        signer
            .update(data)
            .map_err(|e| Error::Signing(e.to_string()))?;

        let sig = signer
            .sign_to_vec()
            .map_err(|e| Error::Signing(e.to_string()))?;

        match alg.ec_coordinate_size() {
            Some(size) => der_to_raw_signature(&sig, size),
            None => Ok(sig),
        }
    }
}

/// SHA-256 digest of `data`
pub fn sha256(data: &[u8]) -> Result<Vec<u8>, Error> {
    hash(MessageDigest::sha256(), data)
        .map(|d| d.to_vec())
        .map_err(|e| Error::Signing(e.to_string()))
}

// ECDSA signatures are DER in openssl and fixed-width r||s in JWS (RFC 7518 §3.4)
fn der_to_raw_signature(der: &[u8], size: usize) -> Result<Vec<u8>, Error> {
    let sig = EcdsaSig::from_der(der).map_err(|e| Error::Signing(e.to_string()))?;

    let mut raw = vec![0u8; 2 * size];
    let r = sig.r().to_vec();
    let s = sig.s().to_vec();

    if r.len() > size || s.len() > size {
        return Err(Error::Signing("ECDSA signature too large".to_string()));
    }

    raw[size - r.len()..size].copy_from_slice(&r);
    raw[2 * size - s.len()..].copy_from_slice(&s);

    Ok(raw)
}

fn raw_to_der_signature(raw: &[u8], size: usize) -> Result<Vec<u8>, Error> {
    let r = BigNum::from_slice(&raw[..size])
        .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;
    let s = BigNum::from_slice(&raw[size..])
        .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))?;

    EcdsaSig::from_private_components(r, s)
        .and_then(|sig| sig.to_der())
        .map_err(|e| Error::SignatureVerificationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_KEY: &str = include_str!("../../testdata/rsa-key.pem");
    const RSA_CERT: &str = include_str!("../../testdata/rsa-cert.pem");
    const ES256_KEY: &str = include_str!("../../testdata/es256-key.pem");
    const ES256_CERT: &str = include_str!("../../testdata/es256-cert.pem");
    const ES384_CERT: &str = include_str!("../../testdata/es384-cert.pem");
    const ES512_KEY: &str = include_str!("../../testdata/es512-key.pem");
    const ES512_CERT: &str = include_str!("../../testdata/es512-cert.pem");

    #[test]
    fn certificate_algorithm_and_key_type() {
        let rsa = Certificate::from_pem(RSA_CERT).unwrap();
        assert_eq!(rsa.algorithm().unwrap(), SigningAlgorithm::RS256);
        assert_eq!(rsa.key_type().unwrap(), "RSA");

        let es256 = Certificate::from_pem(ES256_CERT).unwrap();
        assert_eq!(es256.algorithm().unwrap(), SigningAlgorithm::ES256);
        assert_eq!(es256.key_type().unwrap(), "EC");

        let es384 = Certificate::from_pem(ES384_CERT).unwrap();
        assert_eq!(es384.algorithm().unwrap(), SigningAlgorithm::ES384);
    }

    #[test]
    fn certificate_base64_pem_conversion() {
        let cert = Certificate::from_pem(ES256_CERT).unwrap();
        let b64 = cert.export_base64().unwrap();

        let pem = x5c_to_pem(&b64).unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));

        let again = Certificate::from_pem(&pem).unwrap();
        assert_eq!(again.to_der().unwrap(), cert.to_der().unwrap());
    }

    #[test]
    fn bad_pem_is_key_import_error() {
        assert!(matches!(
            Certificate::from_pem("not a certificate"),
            Err(Error::KeyImport(_))
        ));
        assert!(matches!(
            PrivateKey::from_pem("not a key"),
            Err(Error::KeyImport(_))
        ));
    }

    #[test]
    fn sign_and_verify() {
        let data = b"header.body";

        for (key, cert, alg) in [
            (ES256_KEY, ES256_CERT, SigningAlgorithm::ES256),
            (ES512_KEY, ES512_CERT, SigningAlgorithm::ES512),
            (RSA_KEY, RSA_CERT, SigningAlgorithm::RS256),
            (RSA_KEY, RSA_CERT, SigningAlgorithm::PS256),
            (RSA_KEY, RSA_CERT, SigningAlgorithm::PS384),
        ] {
            let key = PrivateKey::from_pem(key).unwrap();
            let cert = Certificate::from_pem(cert).unwrap();
            assert!(key.matches(&cert).unwrap());

            let sig = key.sign(alg, data).unwrap();
            let public = cert.public_key().unwrap();

            assert!(public.verify(alg, data, &sig).unwrap(), "{alg}");
            assert!(!public.verify(alg, b"header.tampered", &sig).unwrap());
        }
    }

    #[test]
    fn es256_signature_is_raw_r_s() {
        let key = PrivateKey::from_pem(ES256_KEY).unwrap();
        let sig = key.sign(SigningAlgorithm::ES256, b"data").unwrap();

        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn es512_signature_uses_66_byte_halves() {
        let key = PrivateKey::from_pem(ES512_KEY).unwrap();
        let cert = Certificate::from_pem(ES512_CERT).unwrap();

        assert_eq!(key.algorithm().unwrap(), SigningAlgorithm::ES512);
        assert_eq!(cert.algorithm().unwrap(), SigningAlgorithm::ES512);

        let sig = key.sign(SigningAlgorithm::ES512, b"data").unwrap();
        assert_eq!(sig.len(), 132);

        let public = cert.public_key().unwrap();
        assert!(public.verify(SigningAlgorithm::ES512, b"data", &sig).unwrap());

        // a P-256 sized signature is rejected without an error
        assert!(!public
            .verify(SigningAlgorithm::ES512, b"data", &sig[..64])
            .unwrap());
    }

    #[test]
    fn private_key_algorithm() {
        let rsa = PrivateKey::from_pem(RSA_KEY).unwrap();
        assert_eq!(rsa.algorithm().unwrap(), SigningAlgorithm::RS256);

        let es256 = PrivateKey::from_pem(ES256_KEY).unwrap();
        assert_eq!(es256.algorithm().unwrap(), SigningAlgorithm::ES256);
    }

    #[test]
    fn mismatched_algorithm_does_not_verify() {
        let key = PrivateKey::from_pem(ES256_KEY).unwrap();
        let sig = key.sign(SigningAlgorithm::ES256, b"data").unwrap();

        let rsa = Certificate::from_pem(RSA_CERT).unwrap().public_key().unwrap();
        assert!(!rsa.verify(SigningAlgorithm::ES256, b"data", &sig).unwrap());
        assert!(!rsa.verify(SigningAlgorithm::RS256, b"data", &sig).unwrap());

        let es384 = Certificate::from_pem(ES384_CERT).unwrap().public_key().unwrap();
        assert!(!es384.verify(SigningAlgorithm::ES256, b"data", &sig).unwrap());

        assert!(matches!(
            key.sign(SigningAlgorithm::RS256, b"data"),
            Err(Error::Signing(_))
        ));
    }

    #[test]
    fn algorithm_names() {
        assert_eq!(
            "PS512".parse::<SigningAlgorithm>().unwrap(),
            SigningAlgorithm::PS512
        );
        assert_eq!(SigningAlgorithm::ES384.to_string(), "ES384");
        assert!("none".parse::<SigningAlgorithm>().is_err());
        assert!("HS256".parse::<SigningAlgorithm>().is_err());
    }
}
