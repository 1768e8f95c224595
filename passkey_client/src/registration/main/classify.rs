//! Attribution of platform failures to specific causes.
//!
//! The platform reports every failure through a handful of generic exception names,
//! so the cause has to be inferred from the exception together with what the
//! original options asked for. Each exception name maps to exactly one rule in
//! [`RULES`]; a rule either attributes the failure or declines, in which case the
//! failure is passed through untouched.

use url::{Host, Url};

use super::cancel::CEREMONY_ABORT_MARKER;
use crate::registration::errors::{ClassifiedError, ErrorCode};
use crate::registration::platform::{PlatformException, PlatformFailure};
use crate::registration::types::{CreationOptions, PUBLIC_KEY_TYPE};
use crate::utils::base64url_decode;

/// Facts about a ceremony that platform failures are judged against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationFacts {
    pub requires_discoverable_credential: bool,
    pub requires_user_verification: bool,
    pub has_public_key_param: bool,
    /// Decoded length of `user.id`, None if it did not decode
    pub user_id_len: Option<usize>,
    pub rp_id: Option<String>,
    /// Host of the origin running the ceremony
    pub effective_host: Option<Host<String>>,
    /// Whether this ceremony's own cancellation signal fired before it settled
    pub signal_fired: bool,
}

impl RegistrationFacts {
    pub fn from_options(
        options: &CreationOptions,
        origin: Option<&Url>,
        signal_fired: bool,
    ) -> Self {
        let selection = options.authenticator_selection.as_ref();

        Self {
            requires_discoverable_credential: selection.is_some_and(|s| {
                s.require_resident_key == Some(true)
                    || s.resident_key.as_deref() == Some("required")
            }),
            requires_user_verification: selection
                .is_some_and(|s| s.user_verification.as_deref() == Some("required")),
            has_public_key_param: options
                .pub_key_cred_params
                .iter()
                .any(|param| param.type_ == PUBLIC_KEY_TYPE),
            user_id_len: base64url_decode(&options.user.id).ok().map(|id| id.len()),
            rp_id: options.rp.id.clone(),
            effective_host: origin.and_then(Url::host).map(|host| host.to_owned()),
            signal_fired,
        }
    }
}

/// Outcome of classifying a platform failure.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Classified(ClassifiedError),
    /// No rule recognized the failure; callers should surface it unchanged
    Unrecognized(PlatformFailure),
}

type Rule = fn(&PlatformException, &RegistrationFacts) -> Option<(ErrorCode, String)>;

/// Exception name to rule.
pub(crate) const RULES: &[(&str, Rule)] = &[
    ("AbortError", abort_error as Rule),
    ("ConstraintError", constraint_error as Rule),
    ("InvalidStateError", invalid_state_error as Rule),
    ("NotAllowedError", not_allowed_error as Rule),
    ("NotSupportedError", not_supported_error as Rule),
    ("SecurityError", security_error as Rule),
    ("TypeError", type_error as Rule),
    ("UnknownError", unknown_error as Rule),
];

/// Attributes a platform failure to a cause, or hands it back if none applies.
pub fn classify(failure: PlatformFailure, facts: &RegistrationFacts) -> Classification {
    let attributed = match &failure {
        PlatformFailure::Exception(exception) => RULES
            .iter()
            .find(|(name, _)| *name == exception.name)
            .and_then(|(_, rule)| rule(exception, facts))
            .map(|(code, message)| (exception.name.clone(), code, message)),
        PlatformFailure::Other(_) => None,
    };

    match attributed {
        Some((name, code, message)) => {
            tracing::debug!("Classified {} as {}", name, code);
            Classification::Classified(ClassifiedError {
                name,
                code,
                message,
                cause: failure,
            })
        }
        None => {
            tracing::debug!("No classification for platform failure: {}", failure);
            Classification::Unrecognized(failure)
        }
    }
}

fn abort_error(
    exception: &PlatformException,
    facts: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    (facts.signal_fired || exception.message.contains(CEREMONY_ABORT_MARKER)).then(|| {
        (
            ErrorCode::CeremonyAborted,
            "Registration ceremony was sent an abort signal".to_string(),
        )
    })
}

fn constraint_error(
    _: &PlatformException,
    facts: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    if facts.requires_discoverable_credential {
        Some((
            ErrorCode::AuthenticatorMissingDiscoverableCredentialSupport,
            "Discoverable credentials were required but no available authenticator supported it"
                .to_string(),
        ))
    } else if facts.requires_user_verification {
        Some((
            ErrorCode::AuthenticatorMissingUserVerificationSupport,
            "User verification was required but no available authenticator supported it"
                .to_string(),
        ))
    } else {
        None
    }
}

fn invalid_state_error(
    _: &PlatformException,
    _: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    Some((
        ErrorCode::AuthenticatorPreviouslyRegistered,
        "The authenticator was previously registered".to_string(),
    ))
}

fn not_allowed_error(
    exception: &PlatformException,
    _: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    Some((ErrorCode::PassthroughSeeCause, exception.message.clone()))
}

fn not_supported_error(
    _: &PlatformException,
    facts: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    if facts.has_public_key_param {
        Some((
            ErrorCode::AuthenticatorNoSupportedPubKeyCredParamsAlg,
            "No available authenticator supported any of the specified pubKeyCredParams algorithms"
                .to_string(),
        ))
    } else {
        Some((
            ErrorCode::MalformedPubKeyCredParams,
            "No entry in pubKeyCredParams was of type \"public-key\"".to_string(),
        ))
    }
}

fn security_error(
    _: &PlatformException,
    facts: &RegistrationFacts,
) -> Option<(ErrorCode, String)> {
    let invalid_host = match &facts.effective_host {
        Some(host @ (Host::Ipv4(_) | Host::Ipv6(_))) => Some(host),
        Some(host @ Host::Domain(domain)) if !is_valid_domain(domain) => Some(host),
        _ => None,
    };
    if let Some(host) = invalid_host {
        return Some((
            ErrorCode::InvalidDomain,
            format!("{host} is an invalid domain"),
        ));
    }

    Some((
        ErrorCode::InvalidRpId,
        format!(
            "The RP ID \"{}\" is invalid for this domain",
            facts.rp_id.as_deref().unwrap_or_default()
        ),
    ))
}

fn type_error(_: &PlatformException, facts: &RegistrationFacts) -> Option<(ErrorCode, String)> {
    match facts.user_id_len {
        Some(len) if (1..=64).contains(&len) => None,
        _ => Some((
            ErrorCode::InvalidUserIdLength,
            "User ID was not between 1 and 64 characters".to_string(),
        )),
    }
}

fn unknown_error(_: &PlatformException, _: &RegistrationFacts) -> Option<(ErrorCode, String)> {
    Some((
        ErrorCode::AuthenticatorGeneralError,
        "The authenticator was unable to process the specified options, or could not create a new credential"
            .to_string(),
    ))
}

/// Whether a domain name can serve as a WebAuthn effective domain.
///
/// Either `localhost` or a dotted name of LDH labels ending in an alphabetic
/// (or punycode) top-level label.
pub(crate) fn is_valid_domain(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let is_ldh_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    let tld_ok = (tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        || (tld.to_ascii_lowercase().starts_with("xn--") && is_ldh_label(tld));

    tld_ok && rest.iter().all(|label| is_ldh_label(label))
}
