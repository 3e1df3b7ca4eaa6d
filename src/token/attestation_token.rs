// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::claims::StandardClaims;
use super::codec::{BodyCodec, JsonCodec};
use super::crypto;
use super::errors::Error;
use super::header::AttestationTokenHeader;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A JWS compact-serialized attestation token with a body of type `T`.
///
/// The signed bytes are always the first two segments of the raw token as
/// received: they are never rebuilt from the decoded header and body, since
/// re-encoding JSON is not guaranteed to reproduce the same bytes.
#[derive(Clone, Debug)]
pub struct AttestationToken<T> {
    raw: String,
    /// length of `base64url(header) "." base64url(body)` within `raw`
    signed_len: usize,
    header: AttestationTokenHeader,
    signature: Vec<u8>,
    body: T,
    claims: StandardClaims,
}

impl<T> AttestationToken<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Decode a compact-serialized token whose body is a serde type
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Self::parse_with(raw, &JsonCodec)
    }
}

impl<T> AttestationToken<T> {
    /// Decode a compact-serialized token, using `codec` to produce the body
    pub fn parse_with<C>(raw: &str, codec: &C) -> Result<Self, Error>
    where
        C: BodyCodec<T> + ?Sized,
    {
        let (encoded_header, rest) = raw
            .split_once('.')
            .ok_or_else(|| Error::MalformedToken("missing header separator".to_string()))?;

        let header = AttestationTokenHeader::from_json(decode_json("header", encoded_header)?)?;

        let (encoded_body, encoded_signature) = rest
            .split_once('.')
            .ok_or_else(|| Error::MalformedToken("missing body separator".to_string()))?;

        if encoded_signature.contains('.') {
            return Err(Error::MalformedToken(
                "unexpected separator after signature".to_string(),
            ));
        }

        let json_body = decode_json("body", encoded_body)?;
        let claims = StandardClaims::from_json(&json_body)?;
        let body = codec.deserialize(json_body)?;

        let signature = base64::decode(encoded_signature)?;

        if header.is_unsecured() && !signature.is_empty() {
            return Err(Error::MalformedToken(
                "unsecured token carries a signature".to_string(),
            ));
        }

        Ok(Self {
            raw: raw.to_string(),
            signed_len: encoded_header.len() + 1 + encoded_body.len(),
            header,
            signature,
            body,
            claims,
        })
    }

    /// The token exactly as it was received or produced
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &AttestationTokenHeader {
        &self.header
    }

    /// The bytes covered by the signature
    pub fn signed_elements(&self) -> &str {
        &self.raw[..self.signed_len]
    }

    /// Raw signature bytes; empty for an unsecured token
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn claims(&self) -> &StandardClaims {
        &self.claims
    }

    pub fn is_unsecured(&self) -> bool {
        self.header.is_unsecured()
    }

    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_on
    }

    pub fn issued_on(&self) -> Option<DateTime<Utc>> {
        self.claims.issued_on
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.claims.not_before
    }

    pub fn issuer(&self) -> Option<&str> {
        self.claims.issuer.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject.as_deref()
    }

    pub fn audience(&self) -> Option<&str> {
        self.claims.audience.as_deref()
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.claims.unique_id.as_deref()
    }

    /// SHA-256 over the raw token, as reported back by attestation services
    /// acknowledging a policy token
    pub fn token_hash(&self) -> Result<Vec<u8>, Error> {
        crypto::sha256(self.raw.as_bytes())
    }
}

impl<T> FromStr for AttestationToken<T>
where
    T: Serialize + DeserializeOwned,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse(s)
    }
}

impl<T> fmt::Display for AttestationToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode_json(what: &str, segment: &str) -> Result<Value, Error> {
    let bytes = base64::decode(segment)
        .map_err(|e| Error::InvalidEncoding(format!("{what}: {e:?}")))?;

    serde_json::from_slice(&bytes).map_err(|e| Error::from_json(what, e))
}
