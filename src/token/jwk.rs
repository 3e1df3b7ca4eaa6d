// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use jsonwebtoken::jwk::Jwk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON Web Key (RFC 7517) as carried in a token header or claim.
///
/// Only the members used to find a signer are typed.  Everything else is
/// kept as-is, so keys of any type (or with no `kty` at all) decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Standard base64 DER certificates, leaf first
    #[serde(rename = "x5c", default, skip_serializing_if = "Option::is_none")]
    pub x509_chain: Option<Vec<String>>,

    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl JsonWebKey {
    /// The `kty` member, if present and a string
    pub fn key_type(&self) -> Option<&str> {
        self.parameters.get("kty").and_then(Value::as_str)
    }

    /// The key with its algorithm parameters typed.  Fails with
    /// `SchemaMismatch` for key types and curves that have no typed form.
    pub fn to_typed(&self) -> Result<Jwk, Error> {
        let v = serde_json::to_value(self).map_err(|e| Error::from_json("jwk", e))?;

        serde_json::from_value(v).map_err(|e| Error::from_json("jwk", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve};
    use serde_json::json;

    #[test]
    fn decode_without_key_type() {
        let k: JsonWebKey = serde_json::from_value(json!({
            "kid": "k",
            "x5c": ["MIIB"]
        }))
        .unwrap();

        assert_eq!(k.key_id.as_deref(), Some("k"));
        assert_eq!(k.x509_chain, Some(vec!["MIIB".to_string()]));
        assert!(k.key_type().is_none());
        assert!(k.parameters.is_empty());
        assert!(matches!(k.to_typed(), Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn unsupported_curve_is_kept() {
        let j = json!({"kty": "OKP", "crv": "X448", "x": "AAAA"});
        let k: JsonWebKey = serde_json::from_value(j.clone()).unwrap();

        assert_eq!(k.key_type(), Some("OKP"));
        assert!(k.key_id.is_none());
        assert_eq!(serde_json::to_value(&k).unwrap(), j);
    }

    #[test]
    fn typed_ec_key() {
        let k: JsonWebKey = serde_json::from_value(json!({
            "kid": "ec-1",
            "kty": "EC",
            "crv": "P-256",
            "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
            "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"
        }))
        .unwrap();

        let typed = k.to_typed().unwrap();
        assert_eq!(typed.common.key_id.as_deref(), Some("ec-1"));
        assert!(matches!(
            typed.algorithm,
            AlgorithmParameters::EllipticCurve(ref p) if p.curve == EllipticCurve::P256
        ));
    }
}
