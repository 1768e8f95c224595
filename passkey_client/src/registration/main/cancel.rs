use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use uuid::Uuid;

/// Substring carried by every cancellation reason this registry emits.
///
/// Platforms typically echo the reason in the `AbortError` they raise.
pub const CEREMONY_ABORT_MARKER: &str = "existing WebAuthn API call";

const SUPERSEDED_REASON: &str = "Cancelling existing WebAuthn API call for new one";
const MANUAL_REASON: &str = "Manually cancelling existing WebAuthn API call";

/// Identifies one ceremony for the lifetime of its registry slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CeremonyId(Uuid);

impl CeremonyId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CeremonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Receiving side of a ceremony's cancellation.
#[derive(Clone, Debug)]
pub struct CancellationSignal {
    rx: watch::Receiver<Option<String>>,
}

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Reason given when the signal fired.
    pub fn reason(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    /// Resolves with the reason once the signal fires.
    ///
    /// A ceremony that completes without being cancelled never fires, so this stays
    /// pending forever in that case.
    pub async fn cancelled(&self) -> String {
        let mut rx = self.rx.clone();
        loop {
            let reason = rx.borrow_and_update().clone();
            if let Some(reason) = reason {
                return reason;
            }
            if rx.changed().await.is_err() {
                // The controller was released without firing
                let reason = rx.borrow().clone();
                match reason {
                    Some(reason) => return reason,
                    None => std::future::pending::<()>().await,
                }
            }
        }
    }
}

#[derive(Debug)]
struct CancellationController {
    id: CeremonyId,
    tx: watch::Sender<Option<String>>,
}

impl CancellationController {
    fn new() -> (Self, CancellationSignal) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                id: CeremonyId::new(),
                tx,
            },
            CancellationSignal { rx },
        )
    }

    fn cancel(&self, reason: &str) {
        self.tx.send_replace(Some(reason.to_string()));
    }
}

static GLOBAL_REGISTRY: LazyLock<CeremonyRegistry> = LazyLock::new(CeremonyRegistry::new);

/// Single-slot store for the cancellation controller of the active ceremony.
///
/// Starting a ceremony cancels whatever ceremony is still registered, so at most one
/// platform prompt is ever requested at a time. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct CeremonyRegistry {
    slot: Arc<Mutex<Option<CancellationController>>>,
}

impl CeremonyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the free `start_registration` function.
    pub fn global() -> &'static CeremonyRegistry {
        &GLOBAL_REGISTRY
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationController>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new ceremony, cancelling the one currently registered.
    pub fn begin_ceremony(&self) -> (CeremonyId, CancellationSignal) {
        let (controller, signal) = CancellationController::new();
        let id = controller.id;

        let mut slot = self.lock();
        if let Some(previous) = slot.replace(controller) {
            tracing::debug!(
                "Ceremony {} superseded by {}, cancelling it",
                previous.id,
                id
            );
            previous.cancel(SUPERSEDED_REASON);
        }

        (id, signal)
    }

    /// Releases the slot if `id` still owns it. Returns whether it did.
    pub fn finish_ceremony(&self, id: CeremonyId) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(current) if current.id == id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Cancels and releases the registered ceremony, if any.
    pub fn cancel_ceremony(&self) -> bool {
        match self.lock().take() {
            Some(current) => {
                tracing::debug!("Cancelling ceremony {} on request", current.id);
                current.cancel(MANUAL_REASON);
                true
            }
            None => false,
        }
    }

    /// Ceremony currently holding the slot.
    pub fn current(&self) -> Option<CeremonyId> {
        self.lock().as_ref().map(|c| c.id)
    }
}
