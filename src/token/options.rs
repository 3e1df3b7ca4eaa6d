// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::time::Duration;

/// Policy applied by [`validate`](super::validate) to an attestation token.
///
/// By default the signature, expiration and not-before checks are enabled,
/// the issuer check is disabled, and no clock skew is tolerated.  The options
/// can also be loaded from JSON, where absent fields take their defaults and
/// the slack is given in whole seconds (`validation_time_slack_secs`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttestationTokenValidationOptions {
    /// When false, no check is performed at all
    pub validate_token: bool,
    pub validate_expiration_time: bool,
    pub validate_not_before_time: bool,
    pub validate_issuer: bool,
    pub validate_signer: bool,
    /// Clock skew tolerated on the expiration and not-before checks
    #[serde(rename = "validation_time_slack_secs", with = "secs")]
    pub validation_time_slack: Duration,
    /// Compared for exact equality with the `iss` claim
    pub expected_issuer: String,
}

impl Default for AttestationTokenValidationOptions {
    fn default() -> Self {
        Self {
            validate_token: true,
            validate_expiration_time: true,
            validate_not_before_time: true,
            validate_issuer: false,
            validate_signer: true,
            validation_time_slack: Duration::ZERO,
            expected_issuer: String::new(),
        }
    }
}

impl AttestationTokenValidationOptions {
    pub fn with_validate_token(mut self, v: bool) -> Self {
        self.validate_token = v;
        self
    }

    pub fn with_validate_expiration_time(mut self, v: bool) -> Self {
        self.validate_expiration_time = v;
        self
    }

    pub fn with_validate_not_before_time(mut self, v: bool) -> Self {
        self.validate_not_before_time = v;
        self
    }

    pub fn with_validate_signer(mut self, v: bool) -> Self {
        self.validate_signer = v;
        self
    }

    /// Enable the issuer check against `issuer`
    pub fn with_expected_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.validate_issuer = true;
        self.expected_issuer = issuer.into();
        self
    }

    pub fn with_validation_time_slack(mut self, slack: Duration) -> Self {
        self.validation_time_slack = slack;
        self
    }
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
