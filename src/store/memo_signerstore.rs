// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::ISignerStore;
use crate::token::AttestationSigner;
use log::warn;
use serde::Deserialize;
use std::sync::RwLock;

/// A JSON Web Key Set, as published by an attestation service
#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<JwkEntry>,
}

/// The subset of a JWK needed to build a signer.  Services publish their
/// signing certificates in `x5c` and may leave out the raw key parameters.
#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    x5c: Option<Vec<String>>,
}

/// The store where trusted signers are stashed, in load order.
#[derive(Debug, Default)]
pub struct MemoSignerStore {
    s: RwLock<Vec<AttestationSigner>>,
}

impl MemoSignerStore {
    /// Returns a new empty MemoSignerStore
    pub fn new() -> Self {
        Self {
            s: Default::default(),
        }
    }

    /// Add a single signer to the store
    pub fn add(&mut self, signer: AttestationSigner) {
        self.s
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .push(signer);
    }

    /// Add to an existing (and possibly empty) MemoSignerStore the signers
    /// described by the given JWKS document.  Keys with no certificate chain
    /// are skipped.  Nothing is added if any certificate fails to decode.
    pub fn load_json(&mut self, j: &str) -> Result<(), Error> {
        let jwks: JwkSet = serde_json::from_str(j).map_err(|e| Error::Syntax(e.to_string()))?;

        let mut loaded = Vec::with_capacity(jwks.keys.len());

        for key in jwks.keys.iter() {
            let x5c = match &key.x5c {
                Some(x5c) if !x5c.is_empty() => x5c,
                _ => {
                    warn!("skipping key {:?}: no x5c certificate chain", key.kid);
                    continue;
                }
            };

            let signer = AttestationSigner::from_x5c(key.kid.clone(), x5c)
                .map_err(|e| Error::Sema(format!("key {:?}: {e}", key.kid)))?;

            loaded.push(signer);
        }

        self.s
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .extend(loaded);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.s.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ISignerStore for MemoSignerStore {
    /// Lookup the signers registered under the given key ID
    fn lookup(&self, key_id: &str) -> Vec<AttestationSigner> {
        self.s
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.key_id.as_deref() == Some(key_id))
            .cloned()
            .collect()
    }

    fn signers(&self) -> Vec<AttestationSigner> {
        self.s.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
