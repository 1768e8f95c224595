mod errors;
mod main;
mod platform;
mod types;

pub use errors::{ClassifiedError, ErrorCode, RegistrationError};

pub use main::{
    CEREMONY_ABORT_MARKER, CancellationSignal, CeremonyId, CeremonyRegistry, Classification,
    RegistrationClient, RegistrationFacts, classify, start_registration, to_request, to_result,
};

pub use platform::{
    AlwaysSupported, AuthenticatorAttestationResponse, CapabilityProbe, Credential,
    PlatformAuthenticator, PlatformException, PlatformFailure,
};

pub use types::{
    AttestationResponseJson, AuthenticatorSelection, CreationOptions, CreationRequest,
    CredentialDescriptor, CredentialDescriptorJson, Mediation, PubKeyCredParam, RegistrationResult,
    RelyingParty, StartRegistrationOpts, UserEntity, UserEntityRequest,
};
