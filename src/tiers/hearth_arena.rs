use anyhow::Result;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

use crate::library::{CardCatalog, CardClass};

/// Fallback lookup order for multi-class drafts.
const LOOKUP_ORDER: [CardClass; 9] = [
    CardClass::Druid,
    CardClass::Hunter,
    CardClass::Mage,
    CardClass::Paladin,
    CardClass::Priest,
    CardClass::Rogue,
    CardClass::Shaman,
    CardClass::Warlock,
    CardClass::Warrior,
];

/// Resolves HearthArena ranks for `codes`, looked up by English card name.
/// Cards missing from the table rank 0.
pub fn parse<'a>(
    json: &str,
    hero: CardClass,
    multi_class: bool,
    codes: impl IntoIterator<Item = &'a str>,
    catalog: &CardCatalog,
) -> Result<HashMap<String, i32>> {
    let tables: HashMap<String, HashMap<String, Value>> = serde_json::from_str(json)?;
    let empty = HashMap::new();
    let own = tables.get(hero.display_name()).unwrap_or(&empty);
    let others: Vec<_> = LOOKUP_ORDER
        .iter()
        .filter(|class| **class != hero)
        .filter_map(|class| tables.get(class.display_name()))
        .collect();

    let mut ranks = HashMap::new();
    for code in codes {
        let name = catalog.name(code);
        let mut rank = own.get(name).map(rank_of);
        if rank.is_none() && multi_class {
            rank = others.iter().find_map(|table| table.get(name).map(rank_of));
        }
        let rank = rank.unwrap_or(0);
        if rank == 0 {
            debug!("HearthArena missing: {name}");
        }
        ranks.insert(code.to_string(), rank);
    }
    Ok(ranks)
}

fn rank_of(value: &Value) -> i32 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .unwrap_or(0) as i32
}
