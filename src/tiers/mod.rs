pub mod hearth_arena;
pub mod lightforge;
pub mod score;

use anyhow::{Context, Result};
use log::debug;
use std::{collections::BTreeMap, collections::HashMap, fs, path::Path};

use crate::library::{CardCatalog, CardClass};

pub use lightforge::LightForgeTier;
pub use score::{normalize_lf, rate_slots, CardScores, DeckAverages, DeckScore, SlotRating};

pub const LIGHTFORGE_FILE: &str = "lightForge.json";
pub const HEARTH_ARENA_FILE: &str = "hearthArena.json";

/// Per-hero tier lists for one draft.
#[derive(Debug, Clone, Default)]
pub struct TierTables {
    lightforge: BTreeMap<String, LightForgeTier>,
    hearth_arena: HashMap<String, i32>,
}

impl TierTables {
    pub fn load(data_dir: &Path, hero: CardClass, multi_class: bool, catalog: &CardCatalog) -> Result<Self> {
        let lf_path = data_dir.join(LIGHTFORGE_FILE);
        let ha_path = data_dir.join(HEARTH_ARENA_FILE);
        let lf_json = fs::read_to_string(&lf_path)
            .with_context(|| format!("Failed to read {}", lf_path.display()))?;
        let ha_json = fs::read_to_string(&ha_path)
            .with_context(|| format!("Failed to read {}", ha_path.display()))?;
        Self::from_json(&lf_json, &ha_json, hero, multi_class, catalog)
    }

    pub fn from_json(
        lightforge_json: &str,
        hearth_arena_json: &str,
        hero: CardClass,
        multi_class: bool,
        catalog: &CardCatalog,
    ) -> Result<Self> {
        let lightforge = lightforge::parse(lightforge_json, hero, multi_class)
            .context("Malformed LightForge tier list")?;
        let hearth_arena = hearth_arena::parse(
            hearth_arena_json,
            hero,
            multi_class,
            lightforge.keys().map(String::as_str),
            catalog,
        )
        .context("Malformed HearthArena tier list")?;
        Ok(Self {
            lightforge,
            hearth_arena,
        })
    }

    /// Draftable codes for this hero.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.lightforge.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lightforge.is_empty() || self.hearth_arena.is_empty()
    }

    /// Both scores for `code`, zero for anything the lists do not know.
    pub fn scores(&self, code: &str) -> CardScores {
        let tier = self.lightforge.get(code).copied().unwrap_or_else(|| {
            debug!("LightForge missing: {code}");
            LightForgeTier::default()
        });
        let rank = self.hearth_arena.get(code).copied().unwrap_or(0);
        CardScores::new(tier, rank)
    }
}
