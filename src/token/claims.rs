// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub const CLAIM_EXPIRES_ON: &str = "exp";
pub const CLAIM_ISSUED_ON: &str = "iat";
pub const CLAIM_NOT_BEFORE: &str = "nbf";
pub const CLAIM_ISSUER: &str = "iss";
pub const CLAIM_SUBJECT: &str = "sub";
pub const CLAIM_AUDIENCE: &str = "aud";
pub const CLAIM_UNIQUE_ID: &str = "jti";

/// The registered JWT claims (RFC 7519 §4.1) carried by a token body.
/// Every claim is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardClaims {
    pub expires_on: Option<DateTime<Utc>>,
    pub issued_on: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub audience: Option<String>,
    pub unique_id: Option<String>,
}

impl StandardClaims {
    /// Extract the registered claims from a decoded token body.  A body that
    /// is not a JSON object carries no claims.
    pub fn from_json(body: &Value) -> Result<Self, Error> {
        let obj = match body.as_object() {
            Some(o) => o,
            None => return Ok(Default::default()),
        };

        Ok(Self {
            expires_on: get_time(obj, CLAIM_EXPIRES_ON)?,
            issued_on: get_time(obj, CLAIM_ISSUED_ON)?,
            not_before: get_time(obj, CLAIM_NOT_BEFORE)?,
            issuer: get_string(obj, CLAIM_ISSUER)?,
            subject: get_string(obj, CLAIM_SUBJECT)?,
            audience: get_string(obj, CLAIM_AUDIENCE)?,
            unique_id: get_string(obj, CLAIM_UNIQUE_ID)?,
        })
    }

    /// Write the claims that are set into `body`, replacing existing values
    pub fn apply_to(&self, body: &mut Map<String, Value>) {
        let times = [
            (CLAIM_EXPIRES_ON, self.expires_on),
            (CLAIM_ISSUED_ON, self.issued_on),
            (CLAIM_NOT_BEFORE, self.not_before),
        ];

        for (name, t) in times {
            if let Some(t) = t {
                body.insert(name.to_string(), Value::from(t.timestamp()));
            }
        }

        let strings = [
            (CLAIM_ISSUER, &self.issuer),
            (CLAIM_SUBJECT, &self.subject),
            (CLAIM_AUDIENCE, &self.audience),
            (CLAIM_UNIQUE_ID, &self.unique_id),
        ];

        for (name, s) in strings {
            if let Some(s) = s {
                body.insert(name.to_string(), Value::from(s.as_str()));
            }
        }
    }
}

// NumericDate is seconds since the epoch; fractional values are truncated
fn get_time(obj: &Map<String, Value>, name: &str) -> Result<Option<DateTime<Utc>>, Error> {
    let v = match obj.get(name) {
        None => return Ok(None),
        Some(v) => v,
    };

    let secs = match (v.as_i64(), v.as_f64()) {
        (Some(i), _) => i,
        (None, Some(f)) if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            f.trunc() as i64
        }
        _ => {
            return Err(Error::SchemaMismatch(format!(
                "claim {name}: expecting a numeric date, got {v}"
            )))
        }
    };

    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| Error::SchemaMismatch(format!("claim {name}: {secs} is out of range")))
}

fn get_string(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, Error> {
    match obj.get(name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v) => Err(Error::SchemaMismatch(format!(
            "claim {name}: expecting a string, got {v}"
        ))),
    }
}
