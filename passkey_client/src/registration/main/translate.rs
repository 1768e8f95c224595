use crate::registration::errors::RegistrationError;
use crate::registration::types::{
    CreationOptions, CreationRequest, CredentialDescriptor, Mediation, UserEntityRequest,
};
use crate::utils::{UtilError, base64url_decode};

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>, UtilError> {
    base64url_decode(value)
        .map_err(|UtilError::Format(msg)| UtilError::Format(format!("{field}: {msg}")))
}

/// Converts JSON-safe creation options into the request handed to the platform.
///
/// Only the base64url fields are touched. Everything else, including unknown
/// transport tags and the opaque extension inputs, is forwarded as-is. Lengths are
/// not checked here; the platform rejects what it cannot use and the failure is
/// classified afterwards.
pub fn to_request(
    options: &CreationOptions,
    use_auto_register: bool,
) -> Result<CreationRequest, RegistrationError> {
    let challenge = decode_field("challenge", &options.challenge)?;
    let user_id = decode_field("user.id", &options.user.id)?;

    let exclude_credentials = options
        .exclude_credentials
        .as_ref()
        .map(|credentials| {
            credentials
                .iter()
                .enumerate()
                .map(|(i, cred)| {
                    Ok(CredentialDescriptor {
                        id: decode_field(&format!("excludeCredentials[{i}].id"), &cred.id)?,
                        type_: cred.type_.clone(),
                        transports: cred.transports.clone(),
                    })
                })
                .collect::<Result<Vec<_>, RegistrationError>>()
        })
        .transpose()?;

    Ok(CreationRequest {
        challenge,
        rp: options.rp.clone(),
        user: UserEntityRequest {
            id: user_id,
            name: options.user.name.clone(),
            display_name: options.user.display_name.clone(),
        },
        pub_key_cred_params: options.pub_key_cred_params.clone(),
        timeout: options.timeout,
        exclude_credentials,
        authenticator_selection: options.authenticator_selection.clone(),
        attestation: options.attestation.clone(),
        extensions: options.extensions.clone(),
        hints: options.hints.clone(),
        mediation: use_auto_register.then_some(Mediation::Conditional),
    })
}
