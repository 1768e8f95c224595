//! In-process software authenticator standing in for the browser's credential API.

use std::sync::Mutex;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ciborium::value::{Integer, Value as CborValue};
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{self, EcdsaKeyPair, KeyPair};

use passkey_client::{
    AuthenticatorAttestationResponse, CancellationSignal, CreationRequest, Credential,
    PlatformAuthenticator, PlatformFailure,
};

const COSE_ALG_ES256: i32 = -7;

// DER prefix of a P-256 SubjectPublicKeyInfo, followed by the uncompressed point
const P256_SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

// UP | UV | AT
const FLAGS: u8 = 0x01 | 0x04 | 0x40;

pub(crate) struct SoftwareAuthenticator {
    origin: String,
    rng: SystemRandom,
    registered: Mutex<Vec<Vec<u8>>>,
}

impl SoftwareAuthenticator {
    pub(crate) fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            rng: SystemRandom::new(),
            registered: Mutex::new(Vec::new()),
        }
    }

    fn unknown_error(message: impl Into<String>) -> PlatformFailure {
        PlatformFailure::exception("UnknownError", message)
    }

    fn rp_id(&self, request: &CreationRequest) -> String {
        request.rp.id.clone().unwrap_or_else(|| {
            self.origin
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .split(':')
                .next()
                .unwrap_or_default()
                .to_string()
        })
    }

    fn is_registered(&self, request: &CreationRequest) -> bool {
        let registered = self
            .registered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        request
            .exclude_credentials
            .iter()
            .flatten()
            .any(|excluded| registered.contains(&excluded.id))
    }

    fn make_credential(&self, request: &CreationRequest) -> Result<Credential, PlatformFailure> {
        let pkcs8 =
            EcdsaKeyPair::generate_pkcs8(&signature::ECDSA_P256_SHA256_ASN1_SIGNING, &self.rng)
                .map_err(|_| Self::unknown_error("Failed to generate key pair"))?;
        let key_pair = EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            pkcs8.as_ref(),
            &self.rng,
        )
        .map_err(|_| Self::unknown_error("Failed to load key pair"))?;
        let point = key_pair.public_key().as_ref();

        let mut credential_id = vec![0u8; 32];
        self.rng
            .fill(&mut credential_id)
            .map_err(|_| Self::unknown_error("Failed to generate credential id"))?;

        let cose_key = CborValue::Map(vec![
            (CborValue::Integer(Integer::from(1)), CborValue::Integer(Integer::from(2))),
            (
                CborValue::Integer(Integer::from(3)),
                CborValue::Integer(Integer::from(COSE_ALG_ES256)),
            ),
            (CborValue::Integer(Integer::from(-1)), CborValue::Integer(Integer::from(1))),
            (CborValue::Integer(Integer::from(-2)), CborValue::Bytes(point[1..33].to_vec())),
            (CborValue::Integer(Integer::from(-3)), CborValue::Bytes(point[33..65].to_vec())),
        ]);
        let mut cose_bytes = Vec::new();
        ciborium::ser::into_writer(&cose_key, &mut cose_bytes)
            .map_err(|e| Self::unknown_error(format!("Failed to encode COSE key: {e}")))?;

        let rp_id = self.rp_id(request);
        let rp_id_hash = ring::digest::digest(&ring::digest::SHA256, rp_id.as_bytes());
        let mut auth_data = Vec::new();
        auth_data.extend_from_slice(rp_id_hash.as_ref());
        auth_data.push(FLAGS);
        auth_data.extend_from_slice(&0u32.to_be_bytes());
        auth_data.extend_from_slice(&[0u8; 16]); // AAGUID
        auth_data.extend_from_slice(&(credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&credential_id);
        auth_data.extend_from_slice(&cose_bytes);

        let attestation = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text("none".to_string()),
            ),
            (
                CborValue::Text("attStmt".to_string()),
                CborValue::Map(vec![]),
            ),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data.clone()),
            ),
        ]);
        let mut attestation_object = Vec::new();
        ciborium::ser::into_writer(&attestation, &mut attestation_object)
            .map_err(|e| Self::unknown_error(format!("Failed to encode attestation: {e}")))?;

        let client_data_json = serde_json::json!({
            "type": "webauthn.create",
            "challenge": URL_SAFE_NO_PAD.encode(&request.challenge),
            "origin": self.origin,
            "crossOrigin": false
        })
        .to_string()
        .into_bytes();

        let mut public_key = P256_SPKI_PREFIX.to_vec();
        public_key.extend_from_slice(point);

        self.registered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(credential_id.clone());

        let cred_props = request
            .extensions
            .as_ref()
            .is_some_and(|ext| ext.contains_key("credProps"));
        let client_extension_results = cred_props.then(|| {
            let mut results = serde_json::Map::new();
            results.insert("credProps".to_string(), serde_json::json!({ "rk": true }));
            results
        });

        Ok(Credential {
            id: URL_SAFE_NO_PAD.encode(&credential_id),
            raw_id: credential_id,
            type_: "public-key".to_string(),
            authenticator_attachment: Some("platform".to_string()),
            response: AuthenticatorAttestationResponse {
                attestation_object,
                client_data_json,
                transports: Some(vec!["internal".to_string(), "hybrid".to_string()]),
                authenticator_data: Some(auth_data),
                public_key: Some(public_key),
                public_key_algorithm: Some(COSE_ALG_ES256.into()),
            },
            client_extension_results,
        })
    }
}

#[async_trait]
impl PlatformAuthenticator for SoftwareAuthenticator {
    async fn create(
        &self,
        request: CreationRequest,
        signal: CancellationSignal,
    ) -> Result<Option<Credential>, PlatformFailure> {
        if let Some(reason) = signal.reason() {
            return Err(PlatformFailure::exception("AbortError", reason));
        }

        if !request
            .pub_key_cred_params
            .iter()
            .any(|param| param.type_ == "public-key" && param.alg == COSE_ALG_ES256)
        {
            return Err(PlatformFailure::exception(
                "NotSupportedError",
                "The specified algorithms are not supported",
            ));
        }

        if request.user.id.is_empty() || request.user.id.len() > 64 {
            return Err(PlatformFailure::exception(
                "TypeError",
                "user.id must be between 1 and 64 bytes",
            ));
        }

        if self.is_registered(&request) {
            return Err(PlatformFailure::exception(
                "InvalidStateError",
                "The user attempted to register an authenticator that contains one of the credentials already registered with the relying party.",
            ));
        }

        tracing::info!(
            "Creating credential for {} at {}",
            request.user.name,
            self.rp_id(&request)
        );

        self.make_credential(&request).map(Some)
    }
}
