//! passkey-client - Client-side WebAuthn registration ceremonies
//!
//! This crate drives `navigator.credentials.create()`-style registration against a
//! host-provided platform authenticator. It translates the server's JSON-safe
//! options into a binary request, makes sure only one ceremony is pending at a
//! time, turns the resulting credential back into JSON, and attributes platform
//! failures to a stable [`ErrorCode`].

mod config;
mod registration;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{ORIGIN, PASSKEY_USE_AUTO_REGISTER};

pub use registration::{
    AlwaysSupported, AttestationResponseJson, AuthenticatorAttestationResponse,
    AuthenticatorSelection, CEREMONY_ABORT_MARKER, CancellationSignal, CapabilityProbe,
    CeremonyId, CeremonyRegistry, Classification, ClassifiedError, CreationOptions,
    CreationRequest, Credential, CredentialDescriptor, CredentialDescriptorJson, ErrorCode,
    Mediation, PlatformAuthenticator, PlatformException, PlatformFailure, PubKeyCredParam,
    RegistrationClient, RegistrationError, RegistrationFacts, RegistrationResult, RelyingParty,
    StartRegistrationOpts, UserEntity, UserEntityRequest, classify, start_registration,
    to_request, to_result,
};

pub use utils::UtilError;
