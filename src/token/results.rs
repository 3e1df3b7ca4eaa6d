// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Token bodies produced and consumed by an attestation service.

use super::base64::Bytes;
use super::errors::Error;
use super::signer::AttestationSigner;
use super::jwk::JsonWebKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims issued by an attestation service after appraising evidence
#[serde_with::serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttestationResult {
    /// Caller supplied nonce, echoed back
    #[serde(rename = "nonce", default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Version of the result schema
    #[serde(rename = "x-ms-ver", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Runtime data supplied with the evidence
    #[serde(rename = "x-ms-runtime", default, skip_serializing_if = "Option::is_none")]
    pub runtime_claims: Option<Value>,

    /// Initialisation time data supplied with the evidence
    #[serde(rename = "x-ms-inittime", default, skip_serializing_if = "Option::is_none")]
    pub inittime_claims: Option<Value>,

    /// Claims issued by the attestation policy
    #[serde(rename = "x-ms-policy", default, skip_serializing_if = "Option::is_none")]
    pub policy_claims: Option<Value>,

    /// Kind of evidence that was appraised (e.g. "sgx", "tpm")
    #[serde(
        rename = "x-ms-attestation-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verifier_type: Option<String>,

    /// Key that signed the policy used for appraisal
    #[serde(
        rename = "x-ms-policy-signer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub policy_signer: Option<JsonWebKey>,

    /// Digest of the policy used for appraisal
    #[serde(
        rename = "x-ms-policy-hash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub policy_hash: Option<Bytes>,

    #[serde(
        rename = "x-ms-sgx-is-debuggable",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sgx_is_debuggable: Option<bool>,

    #[serde(
        rename = "x-ms-sgx-product-id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sgx_product_id: Option<u32>,

    #[serde(rename = "x-ms-sgx-mrenclave", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    pub sgx_mrenclave: Option<Vec<u8>>,

    #[serde(rename = "x-ms-sgx-mrsigner", skip_serializing_if = "Option::is_none")]
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    pub sgx_mrsigner: Option<Vec<u8>>,

    #[serde(rename = "x-ms-sgx-svn", default, skip_serializing_if = "Option::is_none")]
    pub sgx_svn: Option<u32>,

    /// Enclave held data, as bound into the evidence
    #[serde(rename = "x-ms-sgx-ehd", default, skip_serializing_if = "Option::is_none")]
    pub sgx_enclave_held_data: Option<Bytes>,

    /// Collateral used to appraise SGX evidence
    #[serde(
        rename = "x-ms-sgx-collateral",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sgx_collateral: Option<Value>,
}

impl AttestationResult {
    /// The policy signer as a candidate signer, if it carries a certificate
    /// chain
    pub fn policy_signer(&self) -> Result<Option<AttestationSigner>, Error> {
        match &self.policy_signer {
            Some(jwk) => AttestationSigner::from_jwk(jwk),
            None => Ok(None),
        }
    }
}

/// Body of a token used to set an attestation policy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAttestationPolicy {
    #[serde(
        rename = "AttestationPolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attestation_policy: Option<Bytes>,
}

impl StoredAttestationPolicy {
    pub fn new(policy: &str) -> Self {
        Self {
            attestation_policy: Some(Bytes::from(policy.as_bytes())),
        }
    }

    /// The policy document as text
    pub fn policy(&self) -> Result<Option<String>, Error> {
        self.attestation_policy
            .as_ref()
            .map(|b| {
                String::from_utf8(b.as_slice().to_vec())
                    .map_err(|e| Error::SchemaMismatch(format!("AttestationPolicy: {e}")))
            })
            .transpose()
    }
}

/// Body of the token returned when a policy is set or reset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    /// "Updated" or "Removed"
    #[serde(rename = "x-ms-policy-result")]
    pub policy_resolution: String,

    /// SHA-256 of the policy token that was submitted
    #[serde(
        rename = "x-ms-policy-token-hash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub policy_token_hash: Option<Bytes>,

    #[serde(
        rename = "x-ms-policy-signer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub policy_signer: Option<JsonWebKey>,

    /// The policy now in force, as a JWS
    #[serde(rename = "x-ms-policy", default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}
