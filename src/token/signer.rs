// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::attestation_token::AttestationToken;
use super::crypto::x5c_to_pem;
use super::errors::Error;
use super::jwk::JsonWebKey;
use log::debug;
use serde::{Deserialize, Serialize};

/// A candidate signer of attestation tokens
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationSigner {
    /// Matched against the `kid` header parameter
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// PEM encoded certificates, leaf first.  The leaf's public key is the
    /// one checked against a token signature.
    #[serde(rename = "certificates")]
    pub certificate_chain: Vec<String>,
}

impl AttestationSigner {
    pub fn new(key_id: Option<String>, certificate_chain: Vec<String>) -> Self {
        Self {
            key_id,
            certificate_chain,
        }
    }

    /// Build a signer from an `x5c` chain (standard base64 DER, leaf first)
    pub fn from_x5c(key_id: Option<String>, x5c: &[String]) -> Result<Self, Error> {
        let certificate_chain = x5c
            .iter()
            .map(|c| x5c_to_pem(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(key_id, certificate_chain))
    }

    /// Build a signer from a JWK's certificate chain.  A JWK that carries no
    /// `x5c` yields `None`.
    pub fn from_jwk(jwk: &JsonWebKey) -> Result<Option<Self>, Error> {
        match &jwk.x509_chain {
            Some(x5c) if !x5c.is_empty() => Self::from_x5c(jwk.key_id.clone(), x5c).map(Some),
            _ => Ok(None),
        }
    }

    /// The certificate whose public key verifies signatures
    pub fn leaf(&self) -> Option<&str> {
        self.certificate_chain.first().map(|c| c.as_str())
    }
}

/// Work out which signers may have produced `token`.
///
/// A non-empty `candidates` list is authoritative: when the token names a
/// `kid` only candidates with that exact key ID are returned (possibly none),
/// otherwise all of them are.  With no candidates, the signers are taken
/// from the token itself: the embedded `jwk` chain (if any) and each `x5c`
/// certificate as a single-certificate signer.
pub fn resolve_signers<T>(
    token: &AttestationToken<T>,
    candidates: &[AttestationSigner],
) -> Result<Vec<AttestationSigner>, Error> {
    let header = token.header();

    if !candidates.is_empty() {
        let signers: Vec<AttestationSigner> = match &header.key_id {
            Some(kid) => candidates
                .iter()
                .filter(|c| c.key_id.as_deref() == Some(kid.as_str()))
                .cloned()
                .collect(),
            None => candidates.to_vec(),
        };

        debug!(
            "{} of {} supplied signers match kid {:?}",
            signers.len(),
            candidates.len(),
            header.key_id
        );

        return Ok(signers);
    }

    let mut signers = Vec::new();

    if let Some(jwk) = &header.key {
        match AttestationSigner::from_jwk(jwk)? {
            Some(s) => signers.push(s),
            None => debug!(
                "embedded {} jwk has no certificate chain, ignoring it",
                jwk.key_type().unwrap_or("untyped")
            ),
        }
    }

    if let Some(x5c) = &header.x509_certificate_chain {
        for cert in x5c.iter() {
            signers.push(AttestationSigner::new(
                header.key_id.clone(),
                vec![x5c_to_pem(cert)?],
            ));
        }
    }

    debug!("{} signers found in token header", signers.len());

    Ok(signers)
}
