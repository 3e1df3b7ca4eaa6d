// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::attestation_token::AttestationToken;
use super::errors::Error;
use super::options::AttestationTokenValidationOptions;
use super::signer::{resolve_signers, AttestationSigner};
use super::verifier::verify_signature;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use log::debug;

/// Validate `token` against `options` at the current time.
///
/// `signers` are the candidate signers supplied by the caller (e.g. from a
/// JWKS document); when empty, the signers embedded in the token are used.
/// Checks run in a fixed order (signature, time window, issuer) and the
/// first failure is returned.
pub fn validate<T>(
    token: &AttestationToken<T>,
    options: &AttestationTokenValidationOptions,
    signers: &[AttestationSigner],
) -> Result<(), Error> {
    validate_at(token, options, signers, Utc::now())
}

/// Same as [`validate`], evaluating the time window at `now` (truncated to
/// whole seconds) instead of the current time.
pub fn validate_at<T>(
    token: &AttestationToken<T>,
    options: &AttestationTokenValidationOptions,
    signers: &[AttestationSigner],
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if !options.validate_token {
        debug!("token validation disabled");
        return Ok(());
    }

    if !token.is_unsecured() && options.validate_signer {
        check_signature(token, signers)?;
    }

    check_time(token, options, now.trunc_subsecs(0))?;

    if options.validate_issuer {
        check_issuer(token, &options.expected_issuer)?;
    }

    Ok(())
}

fn check_signature<T>(
    token: &AttestationToken<T>,
    signers: &[AttestationSigner],
) -> Result<(), Error> {
    let candidates = resolve_signers(token, signers)?;

    match verify_signature(token, &candidates) {
        Some(signer) => {
            debug!("token signature verified by {:?}", signer.key_id);
            Ok(())
        }
        None => Err(Error::SignatureVerificationFailed(format!(
            "none of {} candidate signers verified the {} signature",
            candidates.len(),
            token.header().algorithm
        ))),
    }
}

fn check_time<T>(
    token: &AttestationToken<T>,
    options: &AttestationTokenValidationOptions,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let slack = TimeDelta::from_std(options.validation_time_slack).unwrap_or(TimeDelta::MAX);

    if let (Some(exp), true) = (token.expires_on(), options.validate_expiration_time) {
        let delta = now - exp;

        if delta > TimeDelta::zero() && delta > slack {
            return Err(Error::TokenExpired(format!(
                "expired at {exp}, now {now}, slack {}s",
                slack.num_seconds()
            )));
        }
    }

    if let (Some(nbf), true) = (token.not_before(), options.validate_not_before_time) {
        let delta = nbf - now;

        if delta > TimeDelta::zero() && delta > slack {
            return Err(Error::TokenNotYetValid(format!(
                "not valid before {nbf}, now {now}, slack {}s",
                slack.num_seconds()
            )));
        }
    }

    Ok(())
}

fn check_issuer<T>(token: &AttestationToken<T>, expected: &str) -> Result<(), Error> {
    match token.issuer() {
        None => Err(Error::MissingIssuer("token has no iss claim".to_string())),
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(Error::IssuerMismatch(format!(
            "expected {expected}, got {actual}"
        ))),
    }
}
