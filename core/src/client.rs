//! Network client: the public entry point of the pipeline.
//!
//! # Design
//! `NetworkClient` holds the current configuration and a status broadcaster.
//! Each run snapshots the configuration `Arc` on entry, so replacing the
//! configuration never affects runs already in flight. Runs are independent
//! and may execute concurrently on the same client.
//!
//! Cancellation has two forms: dropping the future returned by `run`, or
//! cancelling the token passed to `run_with_cancellation`. The latter
//! reports `RunError::Cancelled`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::NetworkConfiguration;
use crate::error::RunError;
use crate::pipeline;
use crate::request::NetworkRequest;
use crate::response::NetworkResponse;

const STATUS_CHANNEL_CAPACITY: usize = 16;

/// Whether the client has at least one run in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkClientStatus {
    Running,
    Idle,
}

/// In-flight counter and status broadcaster. Counter changes and the
/// matching send happen under one lock, so subscribers never see `Idle`
/// while a run is in flight.
struct StatusTracker {
    in_flight: Mutex<usize>,
    sender: broadcast::Sender<NetworkClientStatus>,
}

impl StatusTracker {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            in_flight: Mutex::new(0),
            sender,
        }
    }

    fn begin(&self) -> RunGuard<'_> {
        let mut in_flight = self.lock();
        *in_flight += 1;
        if *in_flight == 1 {
            // No subscribers is not an error.
            let _ = self.sender.send(NetworkClientStatus::Running);
        }
        RunGuard { tracker: self }
    }

    fn end(&self) {
        let mut in_flight = self.lock();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            let _ = self.sender.send(NetworkClientStatus::Idle);
        }
    }

    fn is_running(&self) -> bool {
        *self.lock() > 0
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // The counter stays consistent even if a holder panicked.
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the end of a run on drop, including cancellation by drop.
struct RunGuard<'a> {
    tracker: &'a StatusTracker,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.tracker.end();
    }
}

/// Runs typed requests through the interceptor and retry pipeline.
pub struct NetworkClient {
    configuration: watch::Sender<Arc<NetworkConfiguration>>,
    status: Arc<StatusTracker>,
}

impl NetworkClient {
    pub fn new(configuration: NetworkConfiguration) -> Self {
        let (sender, _) = watch::channel(Arc::new(configuration));
        Self {
            configuration: sender,
            status: Arc::new(StatusTracker::new()),
        }
    }

    /// Snapshot of the configuration new runs will use.
    pub fn configuration(&self) -> Arc<NetworkConfiguration> {
        self.configuration.borrow().clone()
    }

    /// Swap in a new configuration for subsequent runs and return the
    /// previous one.
    pub fn replace_configuration(&self, configuration: NetworkConfiguration) -> Arc<NetworkConfiguration> {
        self.configuration.send_replace(Arc::new(configuration))
    }

    /// Subscribe to `Running`/`Idle` transitions.
    pub fn status(&self) -> broadcast::Receiver<NetworkClientStatus> {
        self.status.sender.subscribe()
    }

    pub fn current_status(&self) -> NetworkClientStatus {
        if self.status.is_running() {
            NetworkClientStatus::Running
        } else {
            NetworkClientStatus::Idle
        }
    }

    /// Run `request`. Dropping the returned future cancels the run.
    pub async fn run<Req, Res>(&self, request: &NetworkRequest<Req, Res>) -> Result<NetworkResponse<Res>, RunError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned + Send + 'static,
    {
        self.run_with_cancellation(request, &CancellationToken::new()).await
    }

    /// Run `request`, stopping with `RunError::Cancelled` as soon as `token`
    /// is cancelled.
    pub async fn run_with_cancellation<Req, Res>(
        &self,
        request: &NetworkRequest<Req, Res>,
        token: &CancellationToken,
    ) -> Result<NetworkResponse<Res>, RunError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned + Send + 'static,
    {
        let configuration = self.configuration();
        let _guard = self.status.begin();
        let span = tracing::info_span!(
            "network_request",
            method = %request.method(),
            path = request.path().unwrap_or_default(),
        );
        pipeline::execute(&configuration, request, token).instrument(span).await
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("configuration", &*self.configuration.borrow())
            .field("status", &self.current_status())
            .finish()
    }
}
