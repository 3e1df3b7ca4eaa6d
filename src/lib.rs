// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Attestation token parsing, construction and validation.
//!
//! This crate provides an API to handle the JSON Web Signature / JSON Web
//! Token objects ([RFC7515], [RFC7519]) in which attestation services carry
//! hardware attestation results.
//!
//! The API allows:
//! * Decoding a compact-serialized token into a typed body and its header
//! * Building unsecured or signed tokens from a typed body
//! * Cryptographically verifying a token against candidate signers, either
//!   supplied by the caller or embedded in the token
//! * Validating the token's time window and issuer against a policy
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7519]: https://www.rfc-editor.org/rfc/rfc7519

pub mod store;
pub mod token;
