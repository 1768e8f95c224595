use passkey_client::{AuthenticatorAttestationResponse, CreationOptions, Credential};
use serde_json::{Value, json};

/// Registration options as a relying party server would send them
///
/// challenge = base64url("fizz"), user.id = base64url("5678")
pub fn options_json() -> Value {
    json!({
        "challenge": "Zml6eg",
        "rp": { "id": "example.com", "name": "Example Corp" },
        "user": {
            "id": "NTY3OA",
            "name": "bob@example.com",
            "displayName": "Bob"
        },
        "pubKeyCredParams": [
            { "alg": -7, "type": "public-key" },
            { "alg": -257, "type": "public-key" }
        ],
        "timeout": 60000,
        "authenticatorSelection": {
            "residentKey": "preferred",
            "userVerification": "preferred"
        },
        "attestation": "none"
    })
}

pub fn sample_options() -> CreationOptions {
    serde_json::from_value(options_json()).expect("fixture options should deserialize")
}

/// Credential with rawId = "foobar" and 8-byte ASCII attestation/client data
pub fn sample_credential() -> Credential {
    Credential {
        id: "Zm9vYmFy".to_string(),
        raw_id: b"foobar".to_vec(),
        type_: "public-key".to_string(),
        authenticator_attachment: Some("cross-platform".to_string()),
        response: AuthenticatorAttestationResponse {
            attestation_object: b"attestat".to_vec(),
            client_data_json: b"clientDa".to_vec(),
            transports: Some(vec!["usb".to_string(), "nfc".to_string()]),
            authenticator_data: Some(b"authData".to_vec()),
            public_key: None,
            public_key_algorithm: Some(-7),
        },
        client_extension_results: None,
    }
}
