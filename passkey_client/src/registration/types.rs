use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options for a WebAuthn registration ceremony, as delivered by a relying party server.
///
/// This is the JSON-safe form of `PublicKeyCredentialCreationOptions`: every binary
/// field is carried as base64url text so the document can travel over HTTP unchanged.
/// Use [`crate::RegistrationClient::start_registration`] to run a ceremony with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptions {
    /// Server challenge (base64url)
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    /// Timeout in milliseconds, forwarded to the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<CredentialDescriptorJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
    /// Opaque extension inputs, forwarded verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelyingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// User handle (base64url)
    pub id: String,
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PubKeyCredParam {
    pub alg: i32,
    #[serde(rename = "type")]
    pub type_: String,
}

impl PubKeyCredParam {
    pub fn public_key(alg: i32) -> Self {
        Self {
            alg,
            type_: PUBLIC_KEY_TYPE.to_string(),
        }
    }
}

/// A credential the server already knows about, in JSON-safe form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialDescriptorJson {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_resident_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

pub(crate) const PUBLIC_KEY_TYPE: &str = "public-key";

/// Caller-facing knobs for a single ceremony.
#[derive(Clone, Debug)]
pub struct StartRegistrationOpts {
    pub options: CreationOptions,
    /// Ask the platform to register without a modal prompt (conditional mediation)
    pub use_auto_register: bool,
}

impl From<CreationOptions> for StartRegistrationOpts {
    fn from(options: CreationOptions) -> Self {
        Self {
            options,
            use_auto_register: false,
        }
    }
}

/// Registration request handed to the platform authenticator.
///
/// Mirrors [`CreationOptions`] with every base64url field decoded to bytes. It is
/// built once per ceremony and moved into the platform call.
#[derive(Clone, Debug, PartialEq)]
pub struct CreationRequest {
    pub challenge: Vec<u8>,
    pub rp: RelyingParty,
    pub user: UserEntityRequest,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    pub timeout: Option<u32>,
    pub exclude_credentials: Option<Vec<CredentialDescriptor>>,
    pub authenticator_selection: Option<AuthenticatorSelection>,
    pub attestation: Option<String>,
    pub extensions: Option<Map<String, Value>>,
    pub hints: Option<Vec<String>>,
    pub mediation: Option<Mediation>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserEntityRequest {
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CredentialDescriptor {
    pub id: Vec<u8>,
    pub type_: String,
    pub transports: Option<Vec<String>>,
}

/// Mediation requested from the platform.
///
/// Registration only ever asks for conditional mediation; an absent tag leaves the
/// choice to the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mediation {
    Conditional,
}

/// JSON-safe registration result to send back to the relying party server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub id: String,
    pub raw_id: String,
    pub response: AttestationResponseJson,
    #[serde(rename = "type")]
    pub type_: String,
    pub client_extension_results: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponseJson {
    pub attestation_object: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_algorithm: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
}
