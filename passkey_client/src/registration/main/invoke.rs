use super::cancel::{CancellationSignal, CeremonyRegistry};
use crate::registration::errors::RegistrationError;
use crate::registration::platform::{
    CapabilityProbe, Credential, PlatformAuthenticator, PlatformFailure,
};
use crate::registration::types::CreationRequest;

/// Why a ceremony produced no credential.
#[derive(Debug)]
pub(crate) enum InvokeError {
    NotSupported,
    Incomplete,
    /// The platform rejected; `signal_fired` records whether this ceremony had been
    /// cancelled by the time it settled
    Rejected {
        failure: PlatformFailure,
        signal_fired: bool,
    },
}

impl From<InvokeError> for RegistrationError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::NotSupported => RegistrationError::NotSupportedBrowser,
            InvokeError::Incomplete => RegistrationError::CeremonyIncomplete,
            InvokeError::Rejected { failure, .. } => RegistrationError::Platform(failure),
        }
    }
}

pub(crate) fn ensure_supported(probe: &dyn CapabilityProbe) -> Result<(), InvokeError> {
    if probe.supports_webauthn() {
        Ok(())
    } else {
        Err(InvokeError::NotSupported)
    }
}

/// Runs one platform call for `request`.
///
/// Any ceremony still registered with `registry` is cancelled first. The call is made
/// exactly once and never retried; a superseded ceremony still settles normally.
pub(crate) async fn invoke(
    platform: &dyn PlatformAuthenticator,
    probe: &dyn CapabilityProbe,
    registry: &CeremonyRegistry,
    request: CreationRequest,
) -> Result<Credential, InvokeError> {
    ensure_supported(probe)?;

    let (ceremony_id, signal) = registry.begin_ceremony();
    tracing::debug!("Starting registration ceremony {}", ceremony_id);

    let settled = platform.create(request, signal.clone()).await;

    if registry.finish_ceremony(ceremony_id) {
        tracing::debug!("Registration ceremony {} settled", ceremony_id);
    } else {
        tracing::debug!(
            "Registration ceremony {} settled after being superseded",
            ceremony_id
        );
    }

    settle(settled, &signal)
}

fn settle(
    settled: Result<Option<Credential>, PlatformFailure>,
    signal: &CancellationSignal,
) -> Result<Credential, InvokeError> {
    match settled {
        Ok(Some(credential)) => Ok(credential),
        Ok(None) => Err(InvokeError::Incomplete),
        Err(failure) => Err(InvokeError::Rejected {
            failure,
            signal_fired: signal.is_cancelled(),
        }),
    }
}
