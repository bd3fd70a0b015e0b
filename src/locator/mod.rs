//! Finds the draft screen on one of the attached displays.
//!
//! Search runs on a blocking worker and repeats after a pause until it either
//! succeeds or its token is cancelled.

pub mod screen;
pub mod template;

use anyhow::{Context, Result};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::histogram::Rect;

pub use screen::{DisplayInfo, ScreenSource};
pub use template::{find_layout, DraftLayout, LayoutKind, LayoutMatch, MatchOptions};

#[cfg(feature = "xcap")]
pub use screen::DesktopScreens;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Where the three draft slots are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenGeometry {
    pub display: usize,
    pub slots: [Rect; 3],
    /// Physical pixels per logical unit on that display
    pub scale: f64,
}

/// One pass over every display. `None` if the layout is not visible anywhere.
pub fn locate_once(
    screens: &dyn ScreenSource,
    layout: &DraftLayout,
    options: &MatchOptions,
) -> Result<Option<ScreenGeometry>> {
    for display in screens.displays().context("Failed to list displays")? {
        let grab = match screens.capture(display.index) {
            Ok(grab) => grab,
            Err(err) => {
                log_debug!("skipping display {}: {err:#}", display.index);
                continue;
            }
        };
        if let Some(found) = find_layout(&grab, layout, options) {
            log_debug!(
                "layout match {:.3} at template scale {:.3}",
                found.score,
                found.template_scale
            );
            return Ok(Some(ScreenGeometry {
                display: display.index,
                slots: found.slots,
                scale: display.scale_factor,
            }));
        }
    }
    Ok(None)
}

/// Timing for a search task.
#[derive(Debug, Clone, Copy)]
pub struct SearchSchedule {
    pub initial_delay: Duration,
    pub retry: Duration,
}

/// Keeps searching until the layout shows up. Returns `None` once cancelled.
pub async fn search_until_found<F>(
    screens: Arc<dyn ScreenSource>,
    layout: Arc<DraftLayout>,
    options: MatchOptions,
    schedule: SearchSchedule,
    cancel_token: CancellationToken,
    mut on_miss: F,
) -> Option<ScreenGeometry>
where
    F: FnMut(),
{
    let mut delay = schedule.initial_delay;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel_token.cancelled() => {
                log_info!("screen search cancelled");
                return None;
            }
        }

        let attempt = tokio::task::spawn_blocking({
            let screens = Arc::clone(&screens);
            let layout = Arc::clone(&layout);
            let options = options.clone();
            move || locate_once(screens.as_ref(), &layout, &options)
        })
        .await;

        if cancel_token.is_cancelled() {
            return None;
        }
        match attempt {
            Ok(Ok(Some(geometry))) => {
                log_info!("Arena screen detected on display {}", geometry.display);
                return Some(geometry);
            }
            Ok(Ok(None)) => log_info!("Arena screen not found. Retrying..."),
            Ok(Err(err)) => log_info!("Arena screen search failed: {err:#}. Retrying..."),
            Err(err) => log_info!("Arena screen search worker failed: {err}. Retrying..."),
        }
        on_miss();
        delay = schedule.retry;
    }
}

/// Handle to the single in-flight screen search.
#[derive(Default)]
pub struct LocatorTask {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl LocatorTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Starts `task` unless a search is already running. Returns whether it
    /// was started.
    pub fn start<F, Fut>(&mut self, task: F) -> bool
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }
        let cancel_token = CancellationToken::new();
        self.handle = Some(tokio::spawn(task(cancel_token.clone())));
        self.cancel_token = Some(cancel_token);
        true
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.handle = None;
    }
}
