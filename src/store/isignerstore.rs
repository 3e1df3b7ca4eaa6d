// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::token::AttestationSigner;

/// Interface to the store where trusted token signers are stashed.
pub trait ISignerStore {
    /// Lookup the signers registered under the given key ID
    fn lookup(&self, key_id: &str) -> Vec<AttestationSigner>;

    /// All the signers in the store, in the order they were loaded
    fn signers(&self) -> Vec<AttestationSigner>;
}
