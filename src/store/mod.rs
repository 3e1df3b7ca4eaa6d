// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Stores for the signers a relying party trusts, typically loaded from the
//! JSON Web Key Set published by an attestation service.

pub use self::errors::Error;
pub use self::isignerstore::ISignerStore;
pub use self::memo_signerstore::MemoSignerStore;

mod errors;
mod isignerstore;
mod memo_signerstore;
