use crate::registration::platform::{AuthenticatorAttestationResponse, Credential};
use crate::registration::types::{AttestationResponseJson, RegistrationResult};
use crate::utils::{base64url_encode, bytes_to_utf8};

/// Accessors whose results the platform did not provide.
fn missing_accessors(response: &AuthenticatorAttestationResponse) -> Vec<&'static str> {
    [
        ("getTransports", response.transports.is_none()),
        ("getAuthenticatorData", response.authenticator_data.is_none()),
        ("getPublicKey", response.public_key.is_none()),
        ("getPublicKeyAlgorithm", response.public_key_algorithm.is_none()),
    ]
    .into_iter()
    .filter_map(|(accessor, missing)| missing.then_some(accessor))
    .collect()
}

/// Converts the platform credential into its JSON-safe form.
///
/// Accessor results the platform could not provide are left out of the result
/// instead of failing the ceremony.
pub fn to_result(credential: Credential) -> RegistrationResult {
    let response = credential.response;

    if let Ok(client_data) = bytes_to_utf8(&response.client_data_json) {
        tracing::debug!("Client data JSON: {}", client_data);
    }

    for accessor in missing_accessors(&response) {
        tracing::warn!(
            "The platform credential has no working {}() accessor; omitting it from the result",
            accessor
        );
    }

    let authenticator_attachment = credential
        .authenticator_attachment
        .filter(|attachment| !attachment.is_empty());
    if let Some(attachment) = &authenticator_attachment {
        if attachment != "platform" && attachment != "cross-platform" {
            tracing::debug!("Unrecognized authenticator attachment: {}", attachment);
        }
    }

    RegistrationResult {
        id: credential.id,
        raw_id: base64url_encode(&credential.raw_id),
        response: AttestationResponseJson {
            attestation_object: base64url_encode(&response.attestation_object),
            client_data_json: base64url_encode(&response.client_data_json),
            transports: response.transports,
            public_key_algorithm: response.public_key_algorithm,
            public_key: response.public_key.as_deref().map(base64url_encode),
            authenticator_data: response.authenticator_data.as_deref().map(base64url_encode),
        },
        type_: credential.type_,
        client_extension_results: credential.client_extension_results.unwrap_or_default(),
        authenticator_attachment,
    }
}
