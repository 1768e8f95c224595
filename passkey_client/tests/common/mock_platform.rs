use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use passkey_client::{
    CancellationSignal, CreationRequest, Credential, PlatformAuthenticator, PlatformFailure,
};

type Outcome = Result<Option<Credential>, PlatformFailure>;

/// Platform that settles calls immediately with queued outcomes
///
/// Once the queue is empty every further call resolves without a credential.
pub struct ScriptedPlatform {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<CreationRequest>>,
}

impl ScriptedPlatform {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CreationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformAuthenticator for ScriptedPlatform {
    async fn create(
        &self,
        request: CreationRequest,
        _signal: CancellationSignal,
    ) -> Result<Option<Credential>, PlatformFailure> {
        self.requests.lock().unwrap().push(request);
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Platform whose calls stay pending until released by the test
///
/// With `honor_cancellation` a pending call whose signal fires rejects with an
/// `AbortError` carrying the cancellation reason, the way browsers do.
pub struct GatedPlatform {
    credential: Credential,
    honor_cancellation: bool,
    gate: Notify,
    signals: Mutex<Vec<CancellationSignal>>,
    settled: AtomicUsize,
}

impl GatedPlatform {
    pub fn new(credential: Credential, honor_cancellation: bool) -> Self {
        Self {
            credential,
            honor_cancellation,
            gate: Notify::new(),
            signals: Mutex::new(Vec::new()),
            settled: AtomicUsize::new(0),
        }
    }

    /// Lets one pending call resolve with the credential.
    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.signals.lock().unwrap().len()
    }

    pub fn settled(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }

    /// Which calls have seen their cancellation signal fire, in call order.
    pub fn cancelled_flags(&self) -> Vec<bool> {
        self.signals
            .lock()
            .unwrap()
            .iter()
            .map(CancellationSignal::is_cancelled)
            .collect()
    }
}

#[async_trait]
impl PlatformAuthenticator for GatedPlatform {
    async fn create(
        &self,
        _request: CreationRequest,
        signal: CancellationSignal,
    ) -> Result<Option<Credential>, PlatformFailure> {
        self.signals.lock().unwrap().push(signal.clone());

        let outcome = if self.honor_cancellation {
            tokio::select! {
                reason = signal.cancelled() => {
                    Err(PlatformFailure::exception("AbortError", reason))
                }
                _ = self.gate.notified() => Ok(Some(self.credential.clone())),
            }
        } else {
            self.gate.notified().await;
            Ok(Some(self.credential.clone()))
        };

        self.settled.fetch_add(1, Ordering::SeqCst);
        outcome
    }
}

/// Waits until the platform has received `count` calls.
pub async fn wait_for_calls(platform: &GatedPlatform, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while platform.calls() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("platform did not receive the expected calls");
}
