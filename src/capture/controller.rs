use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{capture_loop, TickOutcome};

/// Owns the running capture loop, if any.
#[derive(Default)]
pub struct CaptureController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a capture loop. Any previous loop is cancelled first and left to
    /// wind down on its own.
    pub fn start<F, Fut>(&mut self, start_delay: Duration, tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickOutcome> + Send + 'static,
    {
        let _ = self.cancel();
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(start_delay, tick, cancel_token.clone()));
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
    }

    /// Signals the loop to stop without waiting for it. The caller may await
    /// the returned handle once it holds no locks the loop needs.
    pub fn cancel(&mut self) -> Option<JoinHandle<()>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.handle.take()
    }
}
