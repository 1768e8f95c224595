//! Test utilities shared by the unit tests across the crate
//!
//! Provides a scripted platform authenticator, a fixed capability probe and the
//! canonical options/credential fixtures used throughout the tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::registration::{
    AuthenticatorAttestationResponse, AuthenticatorSelection, CancellationSignal,
    CapabilityProbe, CreationOptions, CreationRequest, Credential, PlatformAuthenticator,
    PlatformFailure, PubKeyCredParam, RelyingParty, UserEntity,
};

/// Options with challenge = base64url("fizz") and user.id = base64url("5678")
pub fn sample_options() -> CreationOptions {
    CreationOptions {
        challenge: "Zml6eg".to_string(),
        rp: RelyingParty {
            id: Some("example.com".to_string()),
            name: "Example".to_string(),
        },
        user: UserEntity {
            id: "NTY3OA".to_string(),
            name: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
        },
        pub_key_cred_params: vec![
            PubKeyCredParam::public_key(-7),
            PubKeyCredParam::public_key(-257),
        ],
        timeout: Some(60000),
        exclude_credentials: None,
        authenticator_selection: Some(AuthenticatorSelection {
            resident_key: Some("preferred".to_string()),
            user_verification: Some("preferred".to_string()),
            ..Default::default()
        }),
        attestation: Some("none".to_string()),
        extensions: None,
        hints: None,
    }
}

/// Credential with rawId = "foobar" and 8-byte ASCII attestation/client data
pub fn sample_credential() -> Credential {
    Credential {
        id: "Zm9vYmFy".to_string(),
        raw_id: b"foobar".to_vec(),
        type_: "public-key".to_string(),
        authenticator_attachment: Some("platform".to_string()),
        response: AuthenticatorAttestationResponse {
            attestation_object: b"attestat".to_vec(),
            client_data_json: b"clientDa".to_vec(),
            transports: Some(vec!["internal".to_string()]),
            authenticator_data: Some(b"authData".to_vec()),
            public_key: Some(b"publicKey".to_vec()),
            public_key_algorithm: Some(-7),
        },
        client_extension_results: Some(serde_json::Map::new()),
    }
}

pub struct MockProbe(pub bool);

impl CapabilityProbe for MockProbe {
    fn supports_webauthn(&self) -> bool {
        self.0
    }
}

/// Platform authenticator that settles every call the same scripted way.
pub struct MockPlatform {
    outcome: Result<Option<Credential>, PlatformFailure>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CreationRequest>>,
}

impl MockPlatform {
    fn new(outcome: Result<Option<Credential>, PlatformFailure>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn resolving(credential: Credential) -> Self {
        Self::new(Ok(Some(credential)))
    }

    pub fn empty() -> Self {
        Self::new(Ok(None))
    }

    pub fn rejecting(failure: PlatformFailure) -> Self {
        Self::new(Err(failure))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CreationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformAuthenticator for MockPlatform {
    async fn create(
        &self,
        request: CreationRequest,
        _signal: CancellationSignal,
    ) -> Result<Option<Credential>, PlatformFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        self.outcome.clone()
    }
}
