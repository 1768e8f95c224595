mod cancel;
mod classify;
mod client;
mod invoke;
mod response;
mod translate;

pub use cancel::{CEREMONY_ABORT_MARKER, CancellationSignal, CeremonyId, CeremonyRegistry};
pub use classify::{Classification, RegistrationFacts, classify};
pub use client::{RegistrationClient, start_registration};
pub use response::to_result;
pub use translate::to_request;
