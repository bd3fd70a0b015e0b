use crate::library::{CardCatalog, CardClass};

/// Hero portraits that can be offered during a hero pick.
pub const HERO_CODES: [&str; 21] = [
    "HERO_01", "HERO_01a", "HERO_02", "HERO_02a", "HERO_03", "HERO_03a", "HERO_04", "HERO_04a",
    "HERO_04b", "HERO_05", "HERO_05a", "HERO_06", "HERO_06a", "HERO_07", "HERO_07a", "HERO_07b",
    "HERO_08", "HERO_08a", "HERO_08b", "HERO_09", "HERO_09a",
];

pub fn hero_class(code: &str, catalog: &CardCatalog) -> CardClass {
    catalog.card_class(code)
}
