// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::jwk::JsonWebKey;
use serde::{Deserialize, Serialize};

/// `alg` value of an unsecured token (RFC 7515 §A.5)
pub const ALG_NONE: &str = "none";

/// JOSE header of an attestation token.  For the semantics of each
/// parameter see §4.1 of RFC 7515.  Unknown parameters are ignored when
/// decoding and absent ones are omitted when encoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttestationTokenHeader {
    #[serde(rename = "alg")]
    pub algorithm: String,

    #[serde(rename = "typ", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(rename = "cty", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "jku", skip_serializing_if = "Option::is_none")]
    pub key_url: Option<String>,

    /// Public key the token was signed with, carried inline
    #[serde(rename = "jwk", skip_serializing_if = "Option::is_none")]
    pub key: Option<JsonWebKey>,

    #[serde(rename = "x5u", skip_serializing_if = "Option::is_none")]
    pub x509_url: Option<String>,

    /// Standard base64 DER certificates, leaf first
    #[serde(rename = "x5c", skip_serializing_if = "Option::is_none")]
    pub x509_certificate_chain: Option<Vec<String>>,

    #[serde(rename = "x5t", skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint: Option<String>,

    #[serde(rename = "x5t#S256", skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint_s256: Option<String>,

    #[serde(rename = "crit", skip_serializing_if = "Option::is_none")]
    pub critical: Option<Vec<String>>,
}

impl AttestationTokenHeader {
    /// Header of an unsecured token
    pub fn unsecured() -> Self {
        Self {
            algorithm: ALG_NONE.to_string(),
            ..Default::default()
        }
    }

    pub fn is_unsecured(&self) -> bool {
        self.algorithm == ALG_NONE
    }

    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        serde_json::to_value(self).map_err(|e| Error::from_json("header", e))
    }

    pub fn from_json(v: serde_json::Value) -> Result<Self, Error> {
        if !v.is_object() {
            return Err(Error::SchemaMismatch(
                "header: expecting a JSON object".to_string(),
            ));
        }

        serde_json::from_value(v).map_err(|e| Error::from_json("header", e))
    }
}
