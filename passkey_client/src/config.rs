//! Central configuration for the passkey-client crate

use std::sync::LazyLock;

use url::Url;

/// Origin of the page driving the ceremony, e.g. `https://example.com`.
///
/// Its host is the effective domain used to attribute `SecurityError`
/// failures. Unset or unparsable values leave it unknown.
pub static ORIGIN: LazyLock<Option<Url>> =
    LazyLock::new(|| parse_origin(std::env::var("ORIGIN").ok()));

/// Whether ceremonies started through the free `start_registration` ask the
/// platform for conditional (automatic) registration.
/// Default: false
pub static PASSKEY_USE_AUTO_REGISTER: LazyLock<bool> =
    LazyLock::new(|| parse_bool_flag(std::env::var("PASSKEY_USE_AUTO_REGISTER").ok(), false));

fn parse_origin(value: Option<String>) -> Option<Url> {
    let value = value?;
    match Url::parse(&value) {
        Ok(url) if url.host_str().is_some() => Some(url),
        Ok(_) => {
            tracing::warn!("ORIGIN has no host: {}. Leaving origin unset", value);
            None
        }
        Err(e) => {
            tracing::warn!("Invalid ORIGIN: {} ({}). Leaving origin unset", value, e);
            None
        }
    }
}

fn parse_bool_flag(value: Option<String>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => match v.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            invalid => {
                tracing::warn!("Invalid boolean flag: {}. Using default '{}'", invalid, default);
                default
            }
        },
    }
}
