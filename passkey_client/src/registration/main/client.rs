use std::sync::Arc;

use url::Url;

use super::cancel::CeremonyRegistry;
use super::classify::{Classification, RegistrationFacts, classify};
use super::invoke::{InvokeError, ensure_supported, invoke};
use super::response::to_result;
use super::translate::to_request;
use crate::config::{ORIGIN, PASSKEY_USE_AUTO_REGISTER};
use crate::registration::errors::RegistrationError;
use crate::registration::platform::{CapabilityProbe, PlatformAuthenticator};
use crate::registration::types::{CreationOptions, RegistrationResult, StartRegistrationOpts};

/// Runs WebAuthn registration ceremonies against a platform authenticator.
///
/// Each client owns a [`CeremonyRegistry`] so that starting a ceremony cancels the
/// one still pending. Clients built from the same registry share that guarantee.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use passkey_client::{AlwaysSupported, PlatformAuthenticator, RegistrationClient, CreationOptions};
/// # async fn run(platform: Arc<dyn PlatformAuthenticator>, options: CreationOptions) {
/// let client = RegistrationClient::new(platform, Arc::new(AlwaysSupported));
/// match client.start_registration(options).await {
///     Ok(result) => println!("{}", serde_json::to_string(&result).unwrap()),
///     Err(e) => eprintln!("registration failed: {e} ({:?})", e.code()),
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct RegistrationClient {
    platform: Arc<dyn PlatformAuthenticator>,
    probe: Arc<dyn CapabilityProbe>,
    registry: CeremonyRegistry,
    origin: Option<Url>,
}

impl RegistrationClient {
    /// Creates a client with its own registry and the configured `ORIGIN`.
    pub fn new(platform: Arc<dyn PlatformAuthenticator>, probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            platform,
            probe,
            registry: CeremonyRegistry::new(),
            origin: ORIGIN.clone(),
        }
    }

    pub fn with_registry(mut self, registry: CeremonyRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Origin of the page running the ceremony, used to attribute `SecurityError`s.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn registry(&self) -> &CeremonyRegistry {
        &self.registry
    }

    /// Cancels the pending ceremony, if any. Returns whether one was cancelled.
    pub fn cancel_ceremony(&self) -> bool {
        self.registry.cancel_ceremony()
    }

    pub async fn start_registration(
        &self,
        options: CreationOptions,
    ) -> Result<RegistrationResult, RegistrationError> {
        self.start_registration_with(options.into()).await
    }

    /// Runs one registration ceremony.
    ///
    /// Platform failures are attributed to a cause where possible
    /// ([`RegistrationError::Classified`]); failures nothing recognizes come back
    /// untouched as [`RegistrationError::Platform`].
    pub async fn start_registration_with(
        &self,
        opts: StartRegistrationOpts,
    ) -> Result<RegistrationResult, RegistrationError> {
        let StartRegistrationOpts {
            options,
            use_auto_register,
        } = opts;

        ensure_supported(self.probe.as_ref()).map_err(|e| RegistrationError::from(e).log())?;

        let request = to_request(&options, use_auto_register).map_err(RegistrationError::log)?;

        let credential = match invoke(
            self.platform.as_ref(),
            self.probe.as_ref(),
            &self.registry,
            request,
        )
        .await
        {
            Ok(credential) => credential,
            Err(InvokeError::Rejected {
                failure,
                signal_fired,
            }) => {
                let facts = RegistrationFacts::from_options(
                    &options,
                    self.origin.as_ref(),
                    signal_fired,
                );
                let err = match classify(failure, &facts) {
                    Classification::Classified(e) => RegistrationError::Classified(e),
                    Classification::Unrecognized(failure) => RegistrationError::Platform(failure),
                };
                return Err(err.log());
            }
            Err(e) => return Err(RegistrationError::from(e).log()),
        };

        let result = to_result(credential);
        tracing::debug!("Registration ceremony produced credential {}", result.id);

        Ok(result)
    }

    /// JSON in, JSON out variant of [`Self::start_registration`].
    pub async fn start_registration_json(
        &self,
        options_json: &str,
    ) -> Result<String, RegistrationError> {
        let options: CreationOptions = serde_json::from_str(options_json)
            .map_err(|e| RegistrationError::from(e).log())?;
        let result = self.start_registration(options).await?;
        serde_json::to_string(&result).map_err(|e| RegistrationError::from(e).log())
    }
}

/// Runs a ceremony using the process-wide registry and environment configuration.
pub async fn start_registration(
    platform: Arc<dyn PlatformAuthenticator>,
    probe: Arc<dyn CapabilityProbe>,
    options: CreationOptions,
) -> Result<RegistrationResult, RegistrationError> {
    RegistrationClient::new(platform, probe)
        .with_registry(CeremonyRegistry::global().clone())
        .start_registration_with(StartRegistrationOpts {
            options,
            use_auto_register: *PASSKEY_USE_AUTO_REGISTER,
        })
        .await
}
