use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Tunables for recognition, cadence and data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftConfig {
    /// Reference card art, `<code>.png` and `<code>_premium.png`
    pub cards_dir: PathBuf,
    /// Draft screen templates (`arenaTemplate.png`, `heroesTemplate.png`)
    pub templates_dir: PathBuf,
    /// Tier lists and `cards.json`
    pub data_dir: PathBuf,
    /// Download URL for missing card art, `{code}` is substituted
    pub image_url_template: String,

    /// Acceptance threshold at round zero
    pub accept_threshold: f64,
    /// Added to the threshold for every counted round
    pub accept_threshold_step: f64,
    /// A slot can only stabilize once this many rounds were counted
    pub min_rounds: u32,

    /// Unseen candidates tracked per slot each tick
    pub candidate_pool: usize,
    /// Pool size after an explicit refresh
    pub extended_candidate_pool: usize,

    /// Delay before the first tick of a round following a pick
    pub start_delay_ms: u64,
    /// Tick interval while no round has been counted yet
    pub fading_interval_ms: u64,
    /// Tick interval once counting has begun
    pub poll_interval_ms: u64,

    /// Pause between failed screen searches
    pub locator_retry_ms: u64,
    /// Hero portraits take a moment to appear
    pub hero_locator_delay_ms: u64,
    /// Minimum normalized cross-correlation accepted as a template hit
    pub template_match_threshold: f32,
    /// Screens are downscaled to this width before template search
    pub template_search_width: u32,
    /// Share of the display height the template spans at native layout
    pub template_screen_fraction: f32,
    /// Multipliers around the expected template scale to try
    pub template_scale_steps: Vec<f32>,

    /// Score cards against every class table, not only the hero's
    pub multi_class: bool,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            cards_dir: PathBuf::from("cards"),
            templates_dir: PathBuf::from("templates"),
            data_dir: PathBuf::from("data"),
            image_url_template: "https://art.hearthstonejson.com/v1/orig/{code}.png".into(),
            accept_threshold: 0.35,
            accept_threshold_step: 0.005,
            min_rounds: 3,
            candidate_pool: 7,
            extended_candidate_pool: 15,
            start_delay_ms: 1500,
            fading_interval_ms: 50,
            poll_interval_ms: 200,
            locator_retry_ms: 4000,
            hero_locator_delay_ms: 1000,
            template_match_threshold: 0.8,
            template_search_width: 400,
            template_screen_fraction: 0.55,
            template_scale_steps: vec![0.9, 1.0, 1.1],
            multi_class: false,
        }
    }
}

impl DraftConfig {
    /// Reads a JSON config. Missing or malformed files fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("Using default config: {err:#}");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn fading_interval(&self) -> Duration {
        Duration::from_millis(self.fading_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn locator_retry(&self) -> Duration {
        Duration::from_millis(self.locator_retry_ms)
    }

    pub fn hero_locator_delay(&self) -> Duration {
        Duration::from_millis(self.hero_locator_delay_ms)
    }

    pub fn pool_size(&self, extended: bool) -> usize {
        if extended {
            self.extended_candidate_pool
        } else {
            self.candidate_pool
        }
    }
}
