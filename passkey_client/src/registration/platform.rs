//! The seam between this crate and the host's credential API.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::main::CancellationSignal;
use super::types::CreationRequest;

/// Host operation that actually creates a credential.
///
/// Implementations resolve with `Ok(Some(credential))` on success, `Ok(None)` when the
/// user or platform declined without raising, and `Err(..)` with a named exception on
/// failure. The signal fires when a newer ceremony supersedes this one or the caller
/// cancels; honoring it is up to the implementation.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    async fn create(
        &self,
        request: CreationRequest,
        signal: CancellationSignal,
    ) -> Result<Option<Credential>, PlatformFailure>;
}

/// Reports whether the runtime exposes the credential API at all.
pub trait CapabilityProbe: Send + Sync {
    fn supports_webauthn(&self) -> bool;
}

/// Probe for hosts that always provide the credential API.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysSupported;

impl CapabilityProbe for AlwaysSupported {
    fn supports_webauthn(&self) -> bool {
        true
    }
}

/// Named exception raised by the platform, e.g. `InvalidStateError`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct PlatformException {
    pub name: String,
    pub message: String,
}

impl PlatformException {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Raw failure reported by the platform before classification.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlatformFailure {
    #[error("{0}")]
    Exception(PlatformException),

    /// The platform failed with something that is not a named exception
    #[error("Non-exception platform failure: {0}")]
    Other(String),
}

impl PlatformFailure {
    pub fn exception(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exception(PlatformException::new(name, message))
    }

    /// Exception name, if the failure carried one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Exception(e) => Some(&e.name),
            Self::Other(_) => None,
        }
    }
}

/// Credential produced by the platform.
#[derive(Clone, Debug, PartialEq)]
pub struct Credential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub type_: String,
    pub authenticator_attachment: Option<String>,
    pub response: AuthenticatorAttestationResponse,
    /// Result of `getClientExtensionResults()`, None when unavailable
    pub client_extension_results: Option<Map<String, Value>>,
}

/// Attestation response of a freshly created credential.
///
/// The optional fields hold what the corresponding platform accessor returned. Older
/// platforms lack some accessors entirely, which is represented as None.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthenticatorAttestationResponse {
    pub attestation_object: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub transports: Option<Vec<String>>,
    pub authenticator_data: Option<Vec<u8>>,
    pub public_key: Option<Vec<u8>>,
    pub public_key_algorithm: Option<i64>,
}
