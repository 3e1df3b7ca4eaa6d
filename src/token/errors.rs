// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Key import failed: {0}")]
    KeyImport(String),
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),
    #[error("Token expired: {0}")]
    TokenExpired(String),
    #[error("Token not yet valid: {0}")]
    TokenNotYetValid(String),
    #[error("Missing issuer: {0}")]
    MissingIssuer(String),
    #[error("Issuer mismatch: {0}")]
    IssuerMismatch(String),
}

impl Error {
    /// Classify a serde_json failure: malformed text is `InvalidJson`, well
    /// formed JSON of the wrong shape is `SchemaMismatch`.
    pub(crate) fn from_json(what: &str, e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Data => Error::SchemaMismatch(format!("{what}: {e}")),
            _ => Error::InvalidJson(format!("{what}: {e}")),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedToken(e)
            | Error::InvalidEncoding(e)
            | Error::InvalidJson(e)
            | Error::SchemaMismatch(e)
            | Error::KeyImport(e)
            | Error::Signing(e)
            | Error::SignatureVerificationFailed(e)
            | Error::TokenExpired(e)
            | Error::TokenNotYetValid(e)
            | Error::MissingIssuer(e)
            | Error::IssuerMismatch(e) => {
                write!(f, "{}", e)
            }
        }
    }
}
