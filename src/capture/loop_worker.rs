use std::future::Future;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// What the loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick again after this delay
    Continue(Duration),
    /// Round resolved or no longer wanted
    Finished,
}

/// Drives `tick` until it reports `Finished` or the token is cancelled.
///
/// The next tick is only scheduled after the previous one has returned, so
/// ticks never overlap.
pub async fn capture_loop<F, Fut>(start_delay: Duration, mut tick: F, cancel_token: CancellationToken)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TickOutcome>,
{
    let mut delay = start_delay;
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down after {} ticks", ticks);
                return;
            }
        }

        if cancel_token.is_cancelled() {
            return;
        }
        ticks += 1;

        match tick().await {
            TickOutcome::Continue(next) => delay = next,
            TickOutcome::Finished => {
                log_debug!("capture loop finished after {} ticks", ticks);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test]
    async fn stops_when_tick_finishes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        capture_loop(
            Duration::ZERO,
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                        TickOutcome::Finished
                    } else {
                        TickOutcome::Continue(Duration::from_millis(1))
                    }
                }
            },
            CancellationToken::new(),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_prevents_further_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            Duration::from_secs(60),
            {
                let calls = Arc::clone(&calls);
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { TickOutcome::Continue(Duration::ZERO) }
                }
            },
            token.clone(),
        ));
        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
