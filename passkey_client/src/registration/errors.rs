use std::fmt;

use thiserror::Error;

use super::platform::PlatformFailure;
use crate::utils::UtilError;

/// Stable identifiers for the reasons a registration ceremony can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The ceremony was cancelled, typically because a newer one started
    CeremonyAborted,
    /// Discoverable credentials were required but no authenticator supports them
    AuthenticatorMissingDiscoverableCredentialSupport,
    /// User verification was required but no authenticator supports it
    AuthenticatorMissingUserVerificationSupport,
    /// One of the excluded credentials lives on the chosen authenticator
    AuthenticatorPreviouslyRegistered,
    /// The platform message is the best explanation available; see the cause
    PassthroughSeeCause,
    /// `pubKeyCredParams` has no entry of type "public-key"
    MalformedPubKeyCredParams,
    /// No authenticator supports any requested algorithm
    AuthenticatorNoSupportedPubKeyCredParamsAlg,
    /// The current host cannot act as a WebAuthn domain
    InvalidDomain,
    /// The RP ID is not valid for the current host
    InvalidRpId,
    /// The decoded user handle is not 1 to 64 bytes long
    InvalidUserIdLength,
    /// The authenticator failed for an unspecified reason
    AuthenticatorGeneralError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CeremonyAborted => "CEREMONY_ABORTED",
            Self::AuthenticatorMissingDiscoverableCredentialSupport => {
                "AUTHENTICATOR_MISSING_DISCOVERABLE_CREDENTIAL_SUPPORT"
            }
            Self::AuthenticatorMissingUserVerificationSupport => {
                "AUTHENTICATOR_MISSING_USER_VERIFICATION_SUPPORT"
            }
            Self::AuthenticatorPreviouslyRegistered => "AUTHENTICATOR_PREVIOUSLY_REGISTERED",
            Self::PassthroughSeeCause => "PASSTHROUGH_SEE_CAUSE",
            Self::MalformedPubKeyCredParams => "MALFORMED_PUBKEYCREDPARAMS",
            Self::AuthenticatorNoSupportedPubKeyCredParamsAlg => {
                "AUTHENTICATOR_NO_SUPPORTED_PUBKEYCREDPARAMS_ALG"
            }
            Self::InvalidDomain => "INVALID_DOMAIN",
            Self::InvalidRpId => "INVALID_RP_ID",
            Self::InvalidUserIdLength => "INVALID_USER_ID_LENGTH",
            Self::AuthenticatorGeneralError => "AUTHENTICATOR_GENERAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform failure attributed to a specific cause.
///
/// `name` is the original exception name and `cause` the untouched platform failure,
/// kept for diagnostics.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct ClassifiedError {
    pub name: String,
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub cause: PlatformFailure,
}

/// Errors that can occur while running a registration ceremony.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The runtime does not expose the credential API; nothing was attempted
    #[error("WebAuthn is not supported in this browser")]
    NotSupportedBrowser,

    /// The platform settled without a credential and without raising
    #[error("Registration was not completed")]
    CeremonyIncomplete,

    /// A platform failure with an identified cause
    #[error(transparent)]
    Classified(ClassifiedError),

    /// A platform failure this crate does not recognize, passed through as-is
    #[error("Platform error: {0}")]
    Platform(PlatformFailure),

    /// Options carried a field that could not be decoded
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from JSON serialization/deserialization
    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl RegistrationError {
    /// Stable code for classified failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Classified(e) => Some(e.code),
            _ => None,
        }
    }

    /// Log the error and return self
    ///
    /// Classified failures are expected user-facing outcomes and are logged at warn
    /// level; everything else is logged as an error.
    pub fn log(self) -> Self {
        match &self {
            Self::NotSupportedBrowser => tracing::error!("WebAuthn is not supported"),
            Self::CeremonyIncomplete => tracing::warn!("Registration was not completed"),
            Self::Classified(e) => tracing::warn!(
                name = %e.name,
                code = %e.code,
                "Registration failed: {}",
                e.message
            ),
            Self::Platform(failure) => {
                tracing::error!("Unrecognized platform failure: {}", failure)
            }
            Self::Utils(err) => tracing::error!("Utils error: {}", err),
            Self::SerdeJson(err) => tracing::error!("Serde error: {}", err),
        }
        self
    }
}
