// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while loading a signer store
#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The key set is not valid JSON, or not shaped like a JWKS
    #[error("malformed key set: {0}")]
    Syntax(String),
    /// A key in the set carries a certificate that cannot be used
    #[error("unusable key: {0}")]
    Sema(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Syntax(e) | Error::Sema(e) => write!(f, "{e}"),
        }
    }
}
