use anyhow::Result;
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::library::CardClass;

/// LightForge rating with its recommended copy cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightForgeTier {
    pub score: i32,
    /// `None` when any number of copies is fine
    pub max_uses: Option<u8>,
}

#[derive(Deserialize)]
struct TierFile {
    #[serde(rename = "Cards", default)]
    cards: Vec<TierCard>,
}

#[derive(Deserialize)]
struct TierCard {
    #[serde(rename = "CardId")]
    card_id: String,
    #[serde(rename = "Scores", default)]
    scores: Vec<TierScore>,
}

#[derive(Deserialize)]
struct TierScore {
    #[serde(rename = "Hero", default)]
    hero: Option<String>,
    #[serde(rename = "Score", default)]
    score: f64,
    #[serde(rename = "StopAfterFirst", default)]
    stop_after_first: bool,
    #[serde(rename = "StopAfterSecond", default)]
    stop_after_second: bool,
}

impl TierScore {
    fn tier(&self) -> LightForgeTier {
        let max_uses = if self.stop_after_first {
            Some(1)
        } else if self.stop_after_second {
            Some(2)
        } else {
            None
        };
        LightForgeTier {
            score: self.score as i32,
            max_uses,
        }
    }
}

/// Parses a LightForge tier list for `hero`.
///
/// Single-class drafts take neutral scores and let the hero's own entry
/// override them. Multi-class drafts accept every entry and keep the first one
/// seen per card.
pub fn parse(json: &str, hero: CardClass, multi_class: bool) -> Result<BTreeMap<String, LightForgeTier>> {
    let file: TierFile = serde_json::from_str(json)?;
    let hero_name = hero.display_name();
    let mut tiers = BTreeMap::new();

    for card in file.cards {
        for entry in &card.scores {
            let applies = multi_class
                || entry.hero.as_deref().map_or(true, |h| h == hero_name);
            if !applies {
                continue;
            }
            if multi_class {
                tiers.entry(card.card_id.clone()).or_insert_with(|| entry.tier());
            } else {
                tiers.insert(card.card_id.clone(), entry.tier());
            }
        }
    }

    info!("LightForge cards: {}", tiers.len());
    Ok(tiers)
}
