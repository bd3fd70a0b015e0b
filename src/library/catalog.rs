use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Free,
    Common,
    Rare,
    Epic,
    Legendary,
    #[default]
    #[serde(other)]
    Invalid,
}

impl Rarity {
    pub fn is_legendary(self) -> bool {
        self == Rarity::Legendary
    }
}

/// Player classes in the order heroes are numbered in the game logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardClass {
    Warrior,
    Shaman,
    Rogue,
    Paladin,
    Hunter,
    Druid,
    Warlock,
    Mage,
    Priest,
    Neutral,
    #[default]
    #[serde(other)]
    Invalid,
}

impl CardClass {
    pub const HEROES: [CardClass; 9] = [
        CardClass::Warrior,
        CardClass::Shaman,
        CardClass::Rogue,
        CardClass::Paladin,
        CardClass::Hunter,
        CardClass::Druid,
        CardClass::Warlock,
        CardClass::Mage,
        CardClass::Priest,
    ];

    /// Hero ids run `1..=9`, or the two-digit form found in hero codes.
    pub fn from_hero_id(id: &str) -> Option<Self> {
        let number: usize = id.trim().parse().ok()?;
        number
            .checked_sub(1)
            .and_then(|index| Self::HEROES.get(index).copied())
    }

    /// `HERO_04b` -> Paladin.
    pub fn from_hero_code(code: &str) -> Option<Self> {
        let digits = code.strip_prefix("HERO_")?.get(..2)?;
        Self::from_hero_id(digits)
    }

    /// Name used as key by the tier lists.
    pub fn display_name(self) -> &'static str {
        match self {
            CardClass::Warrior => "Warrior",
            CardClass::Shaman => "Shaman",
            CardClass::Rogue => "Rogue",
            CardClass::Paladin => "Paladin",
            CardClass::Hunter => "Hunter",
            CardClass::Druid => "Druid",
            CardClass::Warlock => "Warlock",
            CardClass::Mage => "Mage",
            CardClass::Priest => "Priest",
            CardClass::Neutral => "Neutral",
            CardClass::Invalid => "",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub collectible: bool,
    #[serde(default)]
    pub card_class: CardClass,
}

/// Static card metadata keyed by code.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: HashMap<String, CardInfo>,
}

impl CardCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read card catalog {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse card catalog {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let cards: Vec<CardInfo> = serde_json::from_str(contents)?;
        Ok(Self::from_cards(cards))
    }

    pub fn from_cards(cards: impl IntoIterator<Item = CardInfo>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CardInfo> {
        self.cards.get(code)
    }

    /// English name, or the code itself when unknown.
    pub fn name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(|c| c.name.as_str()).unwrap_or(code)
    }

    pub fn rarity(&self, code: &str) -> Rarity {
        self.get(code).map(|c| c.rarity).unwrap_or_default()
    }

    pub fn is_collectible(&self, code: &str) -> bool {
        self.get(code).map(|c| c.collectible).unwrap_or(false)
    }

    pub fn card_class(&self, code: &str) -> CardClass {
        match self.get(code).map(|c| c.card_class) {
            Some(class) if class != CardClass::Invalid => class,
            _ => CardClass::from_hero_code(code).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"[
        {"id": "EX1_001", "name": "Lightwarden", "rarity": "RARE", "collectible": true, "cardClass": "NEUTRAL"},
        {"id": "EX1_002", "name": "The Black Knight", "rarity": "LEGENDARY", "collectible": true, "cardClass": "NEUTRAL"},
        {"id": "ARENA_01", "name": "Arena Only", "rarity": "SOMETHING_NEW", "cardClass": "DEATHKNIGHT"},
        {"id": "HERO_08", "name": "Jaina Proudmoore", "rarity": "FREE", "cardClass": "MAGE"}
    ]"#;

    #[test]
    fn parses_known_and_unknown_enums() {
        let catalog = CardCatalog::from_json(CARDS).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.rarity("EX1_002"), Rarity::Legendary);
        assert_eq!(catalog.rarity("ARENA_01"), Rarity::Invalid);
        assert!(!catalog.is_collectible("ARENA_01"));
        assert_eq!(catalog.card_class("HERO_08"), CardClass::Mage);
    }

    #[test]
    fn unknown_codes_get_defaults() {
        let catalog = CardCatalog::default();
        assert_eq!(catalog.name("NOPE_1"), "NOPE_1");
        assert_eq!(catalog.rarity("NOPE_1"), Rarity::Invalid);
        assert!(!catalog.is_collectible("NOPE_1"));
    }

    #[test]
    fn hero_ids_follow_log_numbering() {
        assert_eq!(CardClass::from_hero_id("1"), Some(CardClass::Warrior));
        assert_eq!(CardClass::from_hero_id("09"), Some(CardClass::Priest));
        assert_eq!(CardClass::from_hero_id("0"), None);
        assert_eq!(CardClass::from_hero_id("10"), None);
        assert_eq!(CardClass::from_hero_id("x"), None);
        assert_eq!(CardClass::from_hero_code("HERO_04b"), Some(CardClass::Paladin));
    }
}
