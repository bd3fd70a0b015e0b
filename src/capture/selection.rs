use log::debug;
use serde::Serialize;

use super::round::{Candidate, SlotState, SLOT_COUNT};
use crate::histogram::degold;
use crate::library::{CardCatalog, Rarity};

/// Rarity class the three offered cards are expected to share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarityConstraint {
    /// Arena-only cards carry no usable rarity; anything goes.
    Unconstrained,
    Anchored(Rarity),
}

impl RarityConstraint {
    pub fn allows(self, rarity: Rarity) -> bool {
        match self {
            RarityConstraint::Unconstrained => true,
            RarityConstraint::Anchored(anchor) => anchor.is_legendary() == rarity.is_legendary(),
        }
    }
}

/// The card chosen for a slot and where it sits in that slot's best matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCard {
    /// Base code, premium suffix removed
    pub code: String,
    pub name: String,
    pub rarity_legendary: bool,
    pub distance: f64,
    pub index: usize,
}

impl SelectedCard {
    pub fn from_candidate(candidate: &Candidate, index: usize, catalog: &CardCatalog) -> Self {
        let code = degold(&candidate.code).to_string();
        Self {
            name: catalog.name(&code).to_string(),
            rarity_legendary: catalog.rarity(&code).is_legendary(),
            code,
            distance: candidate.distance,
            index,
        }
    }
}

/// Picks the rarity anchor from the most confident slot.
///
/// Any non-collectible top match disables the filter. Ties go to the
/// earlier slot.
pub fn reference_rarity(slots: &[SlotState; SLOT_COUNT], catalog: &CardCatalog) -> RarityConstraint {
    let mut anchor: Option<(f64, Rarity)> = None;
    for slot in slots {
        let Some(best) = slot.best_matches().first() else {
            return RarityConstraint::Unconstrained;
        };
        let code = degold(&best.code);
        if !catalog.is_collectible(code) {
            return RarityConstraint::Unconstrained;
        }
        let rarity = catalog.rarity(code);
        match anchor {
            Some((distance, _)) if best.distance >= distance => {}
            _ => anchor = Some((best.distance, rarity)),
        }
    }
    anchor.map_or(RarityConstraint::Unconstrained, |(_, rarity)| RarityConstraint::Anchored(rarity))
}

/// First candidate per slot matching the rarity anchor, or the slot's best
/// match if none does. Empty slots yield `None`.
pub fn select_cards(
    slots: &[SlotState; SLOT_COUNT],
    catalog: &CardCatalog,
) -> [Option<SelectedCard>; SLOT_COUNT] {
    let constraint = reference_rarity(slots, catalog);

    let mut selected: [Option<SelectedCard>; SLOT_COUNT] = Default::default();
    for (slot, choice) in slots.iter().zip(selected.iter_mut()) {
        let matches = slot.best_matches();
        for (index, candidate) in matches.iter().enumerate() {
            let code = degold(&candidate.code);
            let info = format!("{} {} {:.3}", code, catalog.name(code), candidate.distance);
            if constraint.allows(catalog.rarity(code)) {
                debug!("Choose: {info}");
                *choice = Some(SelectedCard::from_candidate(candidate, index, catalog));
                break;
            }
            debug!("Skip: {info} (Wrong rarity)");
        }
        if choice.is_none() {
            *choice = matches
                .first()
                .map(|best| SelectedCard::from_candidate(best, 0, catalog));
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::round::{AcceptThreshold, CaptureRound};

    const THRESHOLD: AcceptThreshold = AcceptThreshold {
        base: 0.5,
        step: 0.0,
        min_rounds: 3,
    };

    fn catalog() -> CardCatalog {
        CardCatalog::from_json(
            r#"[
                {"id": "LEG_A", "name": "Legend A", "rarity": "LEGENDARY", "collectible": true},
                {"id": "LEG_B", "name": "Legend B", "rarity": "LEGENDARY", "collectible": true},
                {"id": "COM_A", "name": "Common A", "rarity": "COMMON", "collectible": true},
                {"id": "COM_B", "name": "Common B", "rarity": "COMMON", "collectible": true},
                {"id": "RARE_A", "name": "Rare A", "rarity": "RARE", "collectible": true},
                {"id": "ARENA_X", "name": "Arena X", "rarity": "COMMON", "collectible": false}
            ]"#,
        )
        .unwrap()
    }

    fn list(entries: &[(&str, f64)]) -> Vec<Candidate> {
        entries
            .iter()
            .map(|(code, distance)| Candidate {
                code: code.to_string(),
                distance: *distance,
            })
            .collect()
    }

    fn resolved(slots: [&[(&str, f64)]; SLOT_COUNT]) -> CaptureRound {
        let mut round = CaptureRound::default();
        for _ in 0..4 {
            round.apply_tick([list(slots[0]), list(slots[1]), list(slots[2])], 5, &THRESHOLD);
        }
        assert!(round.all_detected());
        round
    }

    #[test]
    fn most_confident_slot_anchors_rarity() {
        let round = resolved([
            &[("COM_A", 0.10), ("LEG_A", 0.12)],
            &[("LEG_B", 0.02), ("COM_B", 0.30)],
            &[("RARE_A", 0.20), ("LEG_A", 0.25)],
        ]);
        assert_eq!(
            reference_rarity(round.slots(), &catalog()),
            RarityConstraint::Anchored(Rarity::Legendary)
        );

        let picked = select_cards(round.slots(), &catalog());
        let codes: Vec<_> = picked.iter().map(|c| c.as_ref().unwrap().code.as_str()).collect();
        assert_eq!(codes, vec!["LEG_A", "LEG_B", "LEG_A"]);
        assert_eq!(picked[0].as_ref().unwrap().index, 1);
    }

    #[test]
    fn legendary_anchor_spares_non_legendary_slots() {
        // Slot 1 anchors Legendary; slots 2 and 3 have no legendary option.
        let round = resolved([
            &[("COM_A", 0.10), ("LEG_A", 0.12)],
            &[("LEG_B", 0.05), ("COM_B", 0.30)],
            &[("COM_B", 0.20), ("RARE_A", 0.25)],
        ]);
        let picked = select_cards(round.slots(), &catalog());
        assert_eq!(picked[0].as_ref().unwrap().code, "LEG_A");
        assert_eq!(picked[2].as_ref().unwrap().code, "COM_B");
        assert_eq!(picked[2].as_ref().unwrap().index, 0);
    }

    #[test]
    fn common_anchor_accepts_any_non_legendary() {
        let round = resolved([
            &[("LEG_A", 0.10), ("RARE_A", 0.11)],
            &[("COM_A", 0.01)],
            &[("COM_B", 0.20)],
        ]);
        let picked = select_cards(round.slots(), &catalog());
        assert_eq!(picked[0].as_ref().unwrap().code, "RARE_A");
    }

    #[test]
    fn arena_only_card_disables_filter() {
        let round = resolved([
            &[("COM_A", 0.10), ("LEG_A", 0.12)],
            &[("LEG_B", 0.02)],
            &[("ARENA_X", 0.20)],
        ]);
        assert_eq!(reference_rarity(round.slots(), &catalog()), RarityConstraint::Unconstrained);
        let picked = select_cards(round.slots(), &catalog());
        assert_eq!(picked[0].as_ref().unwrap().code, "COM_A");
    }

    #[test]
    fn premium_match_reports_base_code() {
        let round = resolved([
            &[("COM_A_premium", 0.10)],
            &[("COM_B", 0.02)],
            &[("RARE_A", 0.20)],
        ]);
        let picked = select_cards(round.slots(), &catalog());
        assert_eq!(picked[0].as_ref().unwrap().code, "COM_A");
        assert_eq!(picked[0].as_ref().unwrap().name, "Common A");
    }

    #[test]
    fn empty_slots_select_nothing() {
        let round = CaptureRound::default();
        let picked = select_cards(round.slots(), &catalog());
        assert!(picked.iter().all(Option::is_none));
    }
}
