pub mod capture;
pub mod config;
pub mod draft;
pub mod error;
pub mod histogram;
pub mod library;
pub mod locator;
pub mod settings;
pub mod tiers;
mod utils;

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub use config::DraftConfig;
pub use draft::{DraftCommand, DraftController, DraftEvent, DraftServices};
pub use error::DraftError;
pub use library::{CardCatalog, HttpImageFetcher};
pub use settings::SettingsStore;

const CATALOG_FILE: &str = "cards.json";
const SETTINGS_FILE: &str = "settings.json";

/// Runs the engine headless: commands arrive as JSON lines on stdin and
/// every draft event is written as a JSON line to stdout.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("draft-lens starting up...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let config = DraftConfig::load_or_default(&config_path);

    std::fs::create_dir_all(&config.cards_dir)
        .with_context(|| format!("Failed to create {}", config.cards_dir.display()))?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let settings = SettingsStore::new(config.data_dir.join(SETTINGS_FILE))?;
    let catalog = match CardCatalog::load(&config.data_dir.join(CATALOG_FILE)) {
        Ok(catalog) => {
            info!("Card catalog loaded: {} cards", catalog.len());
            catalog
        }
        Err(err) => {
            warn!("Running without card catalog: {err:#}");
            CardCatalog::default()
        }
    };
    let fetcher = Arc::new(HttpImageFetcher::new(config.image_url_template.clone())?);
    let services = DraftServices::new(desktop_screens()?, fetcher);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(serve(config, settings, catalog, services))
}

#[cfg(feature = "xcap")]
fn desktop_screens() -> Result<Arc<dyn locator::ScreenSource>> {
    Ok(Arc::new(locator::DesktopScreens))
}

#[cfg(not(feature = "xcap"))]
fn desktop_screens() -> Result<Arc<dyn locator::ScreenSource>> {
    Err(anyhow::anyhow!("built without screen capture support"))
}

async fn serve(
    config: DraftConfig,
    settings: SettingsStore,
    catalog: CardCatalog,
    services: DraftServices,
) -> Result<()> {
    let (controller, mut events) = DraftController::new(config, settings, catalog, services);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => {
                    if let Err(err) = stdout.write_all(format!("{line}\n").as_bytes()).await {
                        error!("Failed to write event: {err}");
                        return;
                    }
                    let _ = stdout.flush().await;
                }
                Err(err) => error!("Failed to serialize event: {err}"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command: DraftCommand = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(err) => {
                warn!("Ignoring malformed command {line:?}: {err}");
                continue;
            }
        };
        match draft::dispatch(&controller, command).await {
            Ok(reply) => {
                if let Ok(text) = serde_json::to_string(&reply) {
                    info!("{text}");
                }
            }
            Err(err) => warn!("Command failed: {err}"),
        }
    }

    info!("Input closed, shutting down");
    controller.end_draft().await?;
    controller.end_hero_draft().await?;
    drop(controller);
    // Background tasks still hold senders until they notice the session ended.
    if tokio::time::timeout(Duration::from_secs(2), printer).await.is_err() {
        warn!("Event printer still busy at shutdown");
    }
    Ok(())
}
