//! Per-round matching state for the three draft slots.
//!
//! A round starts counting only once a tick brings no new codes into any
//! slot's top candidates. The first quiet tick throws away everything tracked
//! so far and every later tick refines the tracked distances. A slot locks in
//! once enough rounds were counted and its best distance beats a threshold
//! that loosens every round.

use serde::Serialize;
use std::cmp::Ordering;

use crate::histogram::{degold, distance, CardHistogram};
use crate::library::ReferenceLibrary;

pub const SLOT_COUNT: usize = 3;

/// Unknown distances count as the worst possible match.
const UNMEASURED: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub code: String,
    pub distance: f64,
}

/// Ranks every library entry against a captured slot, best first.
/// Equal distances keep library order.
pub fn rank_candidates(captured: &CardHistogram, library: &ReferenceLibrary) -> Vec<Candidate> {
    let mut ranking: Vec<Candidate> = library
        .iter()
        .map(|(code, reference)| Candidate {
            code: code.to_string(),
            distance: distance(captured, reference),
        })
        .collect();
    ranking.sort_by(|a, b| by_distance(a.distance, b.distance));
    ranking
}

fn by_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, PartialEq)]
struct Tracked {
    code: String,
    best: Option<f64>,
}

impl Tracked {
    fn record(&mut self, distance: f64) {
        self.best = Some(self.best.map_or(distance, |best| best.min(distance)));
    }

    fn distance(&self) -> f64 {
        self.best.unwrap_or(UNMEASURED)
    }
}

/// One draft slot.
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    tracked: Vec<Tracked>,
    ranking: Vec<Candidate>,
    best_matches: Vec<Candidate>,
    detected: bool,
}

impl SlotState {
    /// Full ranking from the latest tick.
    pub fn ranking(&self) -> &[Candidate] {
        &self.ranking
    }

    /// Tracked codes with their best distance so far, in insertion order.
    pub fn tracked(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.tracked.iter().map(|t| (t.code.as_str(), t.best))
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_tracking(&self, code: &str) -> bool {
        self.tracked.iter().any(|t| t.code == code)
    }

    /// Deduplicated candidates, best first. Filled once the round resolves.
    pub fn best_matches(&self) -> &[Candidate] {
        &self.best_matches
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn min_distance(&self) -> f64 {
        self.tracked
            .iter()
            .filter_map(|t| t.best)
            .fold(UNMEASURED, |min, d| if d < min { d } else { min })
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty() && self.ranking.is_empty() && self.best_matches.is_empty()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Refreshes tracked distances and adds unseen codes from the top `pool`.
    fn absorb(&mut self, ranking: Vec<Candidate>, pool: usize, counting: bool) -> bool {
        if counting {
            for tracked in &mut self.tracked {
                if let Some(found) = ranking.iter().find(|c| c.code == tracked.code) {
                    tracked.record(found.distance);
                }
            }
        }

        let mut found_new = false;
        for candidate in ranking.iter().take(pool) {
            if self.is_tracking(&candidate.code) {
                continue;
            }
            found_new = true;
            self.tracked.push(Tracked {
                code: candidate.code.clone(),
                best: counting.then_some(candidate.distance),
            });
        }

        self.ranking = ranking;
        found_new
    }

    /// Sorts tracked codes by distance and keeps the best of each
    /// premium/plain pair.
    fn build_best_matches(&mut self) {
        let mut ordered: Vec<&Tracked> = self.tracked.iter().collect();
        ordered.sort_by(|a, b| by_distance(a.distance(), b.distance()));

        let mut seen: Vec<&str> = Vec::new();
        self.best_matches.clear();
        for tracked in ordered {
            let base = degold(&tracked.code);
            if seen.contains(&base) {
                continue;
            }
            seen.push(base);
            self.best_matches.push(Candidate {
                code: tracked.code.clone(),
                distance: tracked.distance(),
            });
        }
    }
}

/// Acceptance rule for a slot's best match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptThreshold {
    pub base: f64,
    pub step: f64,
    pub min_rounds: u32,
}

impl AcceptThreshold {
    /// Distance a slot must beat after `rounds` counted rounds. Unbounded.
    pub fn limit(&self, rounds: u32) -> f64 {
        self.base + rounds as f64 * self.step
    }

    pub fn accepts(&self, rounds: u32, distance: f64) -> bool {
        rounds >= self.min_rounds && distance < self.limit(rounds)
    }
}

/// Outcome of feeding one tick into the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub new_candidates: bool,
    pub rounds: u32,
    pub resolved: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureRound {
    slots: [SlotState; SLOT_COUNT],
    rounds: u32,
    extended: bool,
    leaving: bool,
}

impl CaptureRound {
    pub fn slots(&self) -> &[SlotState; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotState> {
        self.slots.get(index)
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    /// Nothing has been counted yet; the cards may still be fading in.
    pub fn is_fading(&self) -> bool {
        self.rounds == 0
    }

    pub fn all_detected(&self) -> bool {
        self.slots.iter().all(SlotState::is_detected)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(SlotState::is_empty)
    }

    /// Starts a fresh round.
    pub fn reset(&mut self, extended: bool) {
        self.slots.iter_mut().for_each(SlotState::clear);
        self.rounds = 0;
        self.extended = extended;
        self.leaving = false;
    }

    /// Drops all slot state and flags the round so in-flight results are
    /// discarded.
    pub fn abandon(&mut self) {
        self.reset(false);
        self.leaving = true;
    }

    pub fn clear_leaving(&mut self) {
        self.leaving = false;
    }

    /// Applies one tick of rankings and re-evaluates detection.
    pub fn apply_tick(
        &mut self,
        rankings: [Vec<Candidate>; SLOT_COUNT],
        pool: usize,
        threshold: &AcceptThreshold,
    ) -> TickReport {
        let counting = self.rounds != 0;
        let mut new_candidates = false;
        for (slot, ranking) in self.slots.iter_mut().zip(rankings) {
            new_candidates |= slot.absorb(ranking, pool, counting);
        }

        if counting || !new_candidates {
            if !counting {
                for slot in &mut self.slots {
                    slot.tracked.clear();
                }
            }
            self.rounds += 1;
        }

        let rounds = self.rounds;
        for slot in &mut self.slots {
            if !slot.detected && threshold.accepts(rounds, slot.min_distance()) {
                slot.detected = true;
            }
        }

        let resolved = self.all_detected();
        if resolved {
            self.slots.iter_mut().for_each(SlotState::build_best_matches);
        }

        TickReport {
            new_candidates,
            rounds,
            resolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(entries: &[(&str, f64)]) -> Vec<Candidate> {
        let mut list: Vec<Candidate> = entries
            .iter()
            .map(|(code, distance)| Candidate {
                code: code.to_string(),
                distance: *distance,
            })
            .collect();
        list.sort_by(|a, b| by_distance(a.distance, b.distance));
        list
    }

    fn same_for_all(entries: &[(&str, f64)]) -> [Vec<Candidate>; SLOT_COUNT] {
        [ranking(entries), ranking(entries), ranking(entries)]
    }

    const LOOSE: AcceptThreshold = AcceptThreshold {
        base: 0.35,
        step: 0.005,
        min_rounds: 3,
    };

    #[test]
    fn threshold_relaxes_linearly() {
        let threshold = AcceptThreshold {
            base: 0.2,
            step: 0.05,
            min_rounds: 3,
        };
        assert!(threshold.accepts(5, 0.4));
        assert!(!threshold.accepts(2, 0.4));
        assert!(!threshold.accepts(2, 0.0));
        assert!(threshold.limit(1000) > 1.0);
    }

    #[test]
    fn counting_waits_for_a_quiet_tick() {
        let mut round = CaptureRound::default();
        let first = round.apply_tick(same_for_all(&[("A", 0.1), ("B", 0.5)]), 1, &LOOSE);
        assert!(first.new_candidates);
        assert_eq!(first.rounds, 0);
        assert!(round.is_fading());

        let churn = round.apply_tick(same_for_all(&[("B", 0.1), ("A", 0.5)]), 1, &LOOSE);
        assert!(churn.new_candidates);
        assert_eq!(churn.rounds, 0);

        let quiet = round.apply_tick(same_for_all(&[("B", 0.1), ("A", 0.5)]), 1, &LOOSE);
        assert!(!quiet.new_candidates);
        assert_eq!(quiet.rounds, 1);
        // The first quiet tick starts from a clean slate.
        assert_eq!(round.slot(0).unwrap().tracked_len(), 0);
    }

    #[test]
    fn resolves_after_min_rounds_and_stays_detected() {
        let mut round = CaptureRound::default();
        let frame = [("C1", 0.05), ("C2", 0.6), ("C3", 0.7)];
        round.apply_tick(same_for_all(&frame), 2, &LOOSE);
        round.apply_tick(same_for_all(&frame), 2, &LOOSE);
        assert_eq!(round.rounds(), 1);
        assert_eq!(round.slot(0).unwrap().min_distance(), UNMEASURED);

        let second = round.apply_tick(same_for_all(&frame), 2, &LOOSE);
        assert_eq!(second.rounds, 2);
        assert!(!second.resolved);

        let third = round.apply_tick(same_for_all(&frame), 2, &LOOSE);
        assert_eq!(third.rounds, 3);
        assert!(third.resolved);

        // Later frames that look nothing alike do not undo detection.
        round.apply_tick(same_for_all(&[("C2", 0.9), ("C1", 0.95)]), 2, &LOOSE);
        assert!(round.all_detected());
        assert_eq!(round.slot(0).unwrap().min_distance(), 0.05);
    }

    #[test]
    fn tracked_distance_keeps_the_best_seen() {
        let mut round = CaptureRound::default();
        round.apply_tick(same_for_all(&[("A", 0.3)]), 1, &LOOSE);
        round.apply_tick(same_for_all(&[("A", 0.3)]), 1, &LOOSE);
        round.apply_tick(same_for_all(&[("A", 0.3)]), 1, &LOOSE);
        round.apply_tick(same_for_all(&[("A", 0.2)]), 1, &LOOSE);
        round.apply_tick(same_for_all(&[("A", 0.4)]), 1, &LOOSE);
        let tracked: Vec<_> = round.slot(1).unwrap().tracked().collect();
        assert_eq!(tracked, vec![("A", Some(0.2))]);
    }

    #[test]
    fn premium_variant_is_deduplicated_to_lower_distance() {
        let mut round = CaptureRound::default();
        let frame = [("CARD_01_premium", 0.08), ("CARD_01", 0.12), ("CARD_02", 0.3)];
        for _ in 0..5 {
            round.apply_tick(same_for_all(&frame), 3, &LOOSE);
        }
        assert!(round.all_detected());

        let best = round.slot(2).unwrap().best_matches();
        let codes: Vec<_> = best.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["CARD_01_premium", "CARD_02"]);
        assert_eq!(best[0].distance, 0.08);
    }

    #[test]
    fn dedup_never_leaves_two_of_the_same_base() {
        let mut round = CaptureRound::default();
        let frame = [
            ("X", 0.1),
            ("X_premium", 0.1),
            ("Y_premium", 0.15),
            ("Y", 0.2),
            ("Z", 0.25),
        ];
        for _ in 0..4 {
            round.apply_tick(same_for_all(&frame), 5, &LOOSE);
        }
        for slot in round.slots() {
            let mut bases: Vec<_> = slot.best_matches().iter().map(|c| degold(&c.code)).collect();
            let total = bases.len();
            bases.sort();
            bases.dedup();
            assert_eq!(bases.len(), total);
            // Equal distances keep the earlier tracked code.
            assert_eq!(slot.best_matches()[0].code, "X");
        }
    }

    #[test]
    fn recapture_tracks_the_wider_pool() {
        let config = crate::config::DraftConfig {
            candidate_pool: 3,
            extended_candidate_pool: 5,
            ..Default::default()
        };
        let frame = [
            ("A", 0.1),
            ("B", 0.2),
            ("C", 0.3),
            ("D", 0.4),
            ("E", 0.5),
            ("F", 0.6),
        ];

        let mut round = CaptureRound::default();
        round.apply_tick(same_for_all(&frame), config.pool_size(round.is_extended()), &LOOSE);
        assert_eq!(round.slot(0).unwrap().tracked_len(), 3);

        round.reset(true);
        for _ in 0..5 {
            round.apply_tick(same_for_all(&frame), config.pool_size(round.is_extended()), &LOOSE);
        }
        assert!(round.all_detected());
        for slot in round.slots() {
            assert_eq!(slot.tracked_len(), 5);
            let codes: Vec<_> = slot.best_matches().iter().map(|c| c.code.as_str()).collect();
            assert_eq!(codes, vec!["A", "B", "C", "D", "E"]);
        }
    }

    #[test]
    fn abandon_clears_everything() {
        let mut round = CaptureRound::default();
        round.apply_tick(same_for_all(&[("A", 0.1)]), 1, &LOOSE);
        round.abandon();
        assert!(round.is_empty());
        assert!(round.is_leaving());
        assert_eq!(round.rounds(), 0);

        round.reset(true);
        assert!(!round.is_leaving());
        assert!(round.is_extended());
    }
}
