use serde::Serialize;

use super::lightforge::LightForgeTier;
use crate::settings::{DisplaySettings, DraftMethod};

/// Both tier scores of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardScores {
    pub lightforge: i32,
    pub max_uses: Option<u8>,
    pub hearth_arena: i32,
}

impl CardScores {
    pub fn new(tier: LightForgeTier, hearth_arena: i32) -> Self {
        Self {
            lightforge: tier.score,
            max_uses: tier.max_uses,
            hearth_arena,
        }
    }
}

/// Maps the raw LightForge scale onto 0..100.
pub fn normalize_lf(score: f64, enabled: bool) -> f64 {
    if !enabled {
        return score;
    }
    ((score - 20.0) * 100.0 / 70.0).clamp(0.0, 100.0)
}

/// Running deck rating over every pick so far.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckScore {
    pub lightforge_total: f64,
    pub hearth_arena_total: f64,
    pub cards: u32,
}

/// Integer averages as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckAverages {
    pub lightforge: i32,
    pub hearth_arena: i32,
    pub cards: u32,
}

impl DeckScore {
    pub fn add_pick(&mut self, scores: CardScores) {
        self.cards += 1;
        self.lightforge_total += scores.lightforge as f64;
        self.hearth_arena_total += scores.hearth_arena as f64;
    }

    pub fn lightforge_average(&self, normalized: bool) -> f64 {
        if self.cards == 0 {
            return 0.0;
        }
        normalize_lf(self.lightforge_total / self.cards as f64, normalized)
    }

    pub fn hearth_arena_average(&self) -> f64 {
        if self.cards == 0 {
            return 0.0;
        }
        self.hearth_arena_total / self.cards as f64
    }

    pub fn averages(&self, normalized: bool) -> DeckAverages {
        DeckAverages {
            lightforge: self.lightforge_average(normalized) as i32,
            hearth_arena: self.hearth_arena_average() as i32,
            cards: self.cards,
        }
    }

    /// Running label, e.g. `" LF: 55 -- HA: 70 (12/30)"`.
    pub fn label(&self, method: DraftMethod, normalized: bool) -> String {
        let avg = self.averages(normalized);
        match method {
            DraftMethod::All => format!(
                " LF: {} -- HA: {} ({}/30)",
                avg.lightforge, avg.hearth_arena, avg.cards
            ),
            DraftMethod::LightForge => format!(" LF: {} ({}/30)", avg.lightforge, avg.cards),
            DraftMethod::HearthArena => format!(" HA: {} ({}/30)", avg.hearth_arena, avg.cards),
            DraftMethod::None => String::new(),
        }
    }

    /// End-of-draft summary line.
    pub fn final_message(&self, method: DraftMethod, normalized: bool) -> String {
        let avg = self.averages(normalized);
        match method {
            DraftMethod::All => format!("LF:{} -- HA:{}", avg.lightforge, avg.hearth_arena),
            DraftMethod::LightForge => format!("Deck Score: {}", avg.lightforge),
            DraftMethod::HearthArena => format!("Deck Score: {}", avg.hearth_arena),
            DraftMethod::None => String::new(),
        }
    }
}

/// What the overlay shows for one slot. `None` texts are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRating {
    pub lightforge: Option<String>,
    pub hearth_arena: Option<String>,
    pub lightforge_best: bool,
    pub hearth_arena_best: bool,
}

pub fn rate_slots(scores: &[CardScores; 3], display: DisplaySettings) -> [SlotRating; 3] {
    let best_lf = scores.iter().map(|s| s.lightforge).max().unwrap_or(0);
    let best_ha = scores.iter().map(|s| s.hearth_arena).max().unwrap_or(0);
    let show_lf = !display.learning_mode && display.draft_method.shows_lightforge();
    let show_ha = !display.learning_mode && display.draft_method.shows_hearth_arena();

    scores.map(|s| {
        let lightforge = show_lf.then(|| {
            let value = normalize_lf(s.lightforge as f64, display.normalized_lf) as i32;
            match s.max_uses {
                Some(max) => format!("{value} - MAX({max})"),
                None => value.to_string(),
            }
        });
        SlotRating {
            lightforge,
            hearth_arena: show_ha.then(|| s.hearth_arena.to_string()),
            lightforge_best: show_lf && s.lightforge == best_lf,
            hearth_arena_best: show_ha && s.hearth_arena == best_ha,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(lf: i32, ha: i32) -> CardScores {
        CardScores {
            lightforge: lf,
            max_uses: None,
            hearth_arena: ha,
        }
    }

    #[test]
    fn empty_deck_averages_zero() {
        let deck = DeckScore::default();
        assert_eq!(deck.lightforge_average(false), 0.0);
        assert_eq!(deck.hearth_arena_average(), 0.0);
        assert_eq!(deck.label(DraftMethod::All, false), " LF: 0 -- HA: 0 (0/30)");
    }

    #[test]
    fn averages_use_post_increment_count() {
        let mut deck = DeckScore::default();
        for (lf, ha) in [(60, 90), (70, 75), (81, 61)] {
            deck.add_pick(scores(lf, ha));
        }
        assert_eq!(deck.cards, 3);
        assert_eq!(deck.lightforge_average(false), 211.0 / 3.0);
        assert_eq!(deck.hearth_arena_average(), 226.0 / 3.0);
        assert_eq!(deck.averages(false), DeckAverages { lightforge: 70, hearth_arena: 75, cards: 3 });
    }

    #[test]
    fn normalization_changes_display_only() {
        let mut deck = DeckScore::default();
        deck.add_pick(scores(55, 0));
        assert_eq!(deck.lightforge_average(false), 55.0);
        assert_eq!(deck.lightforge_average(true), 50.0);
        assert_eq!(deck.lightforge_total, 55.0);
    }

    #[test]
    fn labels_follow_draft_method() {
        let mut deck = DeckScore::default();
        deck.add_pick(scores(55, 80));
        assert_eq!(deck.label(DraftMethod::LightForge, false), " LF: 55 (1/30)");
        assert_eq!(deck.label(DraftMethod::HearthArena, false), " HA: 80 (1/30)");
        assert_eq!(deck.final_message(DraftMethod::All, false), "LF:55 -- HA:80");
        assert_eq!(deck.final_message(DraftMethod::HearthArena, true), "Deck Score: 80");
        assert_eq!(deck.label(DraftMethod::None, true), "");
    }

    #[test]
    fn slot_ratings_mark_best_and_caps() {
        let mut capped = scores(75, 40);
        capped.max_uses = Some(1);
        let display = DisplaySettings {
            draft_method: DraftMethod::All,
            normalized_lf: false,
            learning_mode: false,
        };
        let rated = rate_slots(&[scores(50, 90), capped, scores(75, 10)], display);

        assert_eq!(rated[1].lightforge.as_deref(), Some("75 - MAX(1)"));
        assert!(rated[1].lightforge_best && rated[2].lightforge_best);
        assert!(!rated[0].lightforge_best);
        assert!(rated[0].hearth_arena_best);
    }

    #[test]
    fn learning_mode_hides_everything() {
        let display = DisplaySettings {
            draft_method: DraftMethod::All,
            normalized_lf: true,
            learning_mode: true,
        };
        let rated = rate_slots(&[scores(50, 90); 3], display);
        assert!(rated.iter().all(|r| r.lightforge.is_none() && r.hearth_arena.is_none()));
    }
}
