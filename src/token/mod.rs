// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The token module provides an [`AttestationToken`] object encapsulating a
//! JWS compact-serialized attestation token, together with the logic to
//! build, sign, verify and validate it.
//!
//! # Example
//!
//! The following example decodes an unsecured token and checks its issuer.
//! Signed tokens are checked against the signers embedded in their header
//! (`x5c`, `jwk`) unless the caller supplies its own, e.g. from a
//! [`MemoSignerStore`](crate::store::MemoSignerStore).
//!
//! ```
//! use attestation_token::token::{validate, AttestationToken, AttestationTokenValidationOptions};
//! use serde_json::Value;
//!
//! let token: AttestationToken<Value> =
//!     AttestationToken::parse("eyJhbGciOiJub25lIn0.eyJpc3MiOiJ0ZXN0In0.")
//!         .expect("decoding token");
//!
//! let options = AttestationTokenValidationOptions::default().with_expected_issuer("test");
//!
//! validate(&token, &options, &[]).expect("validating token");
//!
//! assert_eq!(token.issuer(), Some("test"));
//! ```

pub use self::attestation_token::AttestationToken;
pub use self::builder::{AttestationSigningKey, AttestationTokenBuilder};
pub use self::claims::StandardClaims;
pub use self::codec::{BodyCodec, FnCodec, JsonCodec};
pub use self::crypto::{Certificate, PrivateKey, PublicKey, SigningAlgorithm};
pub use self::errors::Error;
pub use self::header::{AttestationTokenHeader, ALG_NONE};
pub use self::jwk::JsonWebKey;
pub use self::options::AttestationTokenValidationOptions;
pub use self::results::{AttestationResult, PolicyResult, StoredAttestationPolicy};
pub use self::signer::{resolve_signers, AttestationSigner};
pub use self::validator::{validate, validate_at};
pub use self::verifier::verify_signature;

pub mod base64;
pub mod crypto;

mod attestation_token;
mod builder;
mod claims;
mod codec;
mod errors;
mod header;
mod jwk;
mod options;
mod results;
mod signer;
mod validator;
mod verifier;
