// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Converts a token body of type `T` to and from its JSON form.  One
/// implementation exists per body schema the caller wants to handle.
pub trait BodyCodec<T> {
    fn serialize(&self, body: &T) -> Result<Value, Error>;

    fn deserialize(&self, json: Value) -> Result<T, Error>;
}

/// Codec for any serde-enabled body, including `serde_json::Value`
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl<T> BodyCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, body: &T) -> Result<Value, Error> {
        serde_json::to_value(body).map_err(|e| Error::from_json("body", e))
    }

    fn deserialize(&self, json: Value) -> Result<T, Error> {
        serde_json::from_value(json).map_err(|e| Error::from_json("body", e))
    }
}

/// Codec built from a pair of functions, for bodies that are not serde types
pub struct FnCodec<S, D> {
    ser: S,
    de: D,
}

impl<S, D> FnCodec<S, D> {
    pub fn new(ser: S, de: D) -> Self {
        Self { ser, de }
    }
}

impl<T, S, D> BodyCodec<T> for FnCodec<S, D>
where
    S: Fn(&T) -> Result<Value, Error>,
    D: Fn(Value) -> Result<T, Error>,
{
    fn serialize(&self, body: &T) -> Result<Value, Error> {
        (self.ser)(body)
    }

    fn deserialize(&self, json: Value) -> Result<T, Error> {
        (self.de)(json)
    }
}
