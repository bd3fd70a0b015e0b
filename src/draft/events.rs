use serde::Serialize;
use uuid::Uuid;

use super::state::SessionMode;
use super::synergy::CounterDeltas;
use crate::capture::{Candidate, SelectedCard, SLOT_COUNT};
use crate::library::CardClass;
use crate::locator::ScreenGeometry;
use crate::tiers::{CardScores, DeckAverages, SlotRating};

/// Notifications for whoever renders the draft.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DraftEvent {
    SessionStarted {
        session_id: Uuid,
        mode: SessionMode,
    },
    SessionEnded {
        session_id: Option<Uuid>,
        deck: DeckAverages,
        message: String,
    },
    DownloadsStarted {
        pending: usize,
    },
    DownloadProgress {
        code: String,
        remaining: usize,
    },
    DownloadsFinished,
    ScreenLocated {
        geometry: ScreenGeometry,
    },
    ScreenNotFound,
    RoundStarted {
        extended: bool,
    },
    RoundCancelled,
    CardsResolved {
        candidates: [Vec<Candidate>; SLOT_COUNT],
        selected: [Option<SelectedCard>; SLOT_COUNT],
        scores: [CardScores; SLOT_COUNT],
        ratings: [SlotRating; SLOT_COUNT],
    },
    SelectionChanged {
        slot: usize,
        selected: SelectedCard,
        scores: [CardScores; SLOT_COUNT],
        ratings: [SlotRating; SLOT_COUNT],
    },
    HeroesResolved {
        candidates: [Vec<Candidate>; SLOT_COUNT],
        classes: [CardClass; SLOT_COUNT],
        winrates: [f32; SLOT_COUNT],
    },
    CardPicked {
        code: String,
        scores: CardScores,
        counters: CounterDeltas,
        deck: DeckAverages,
    },
    DeckScoreUpdated {
        deck: DeckAverages,
        label: String,
    },
    DisplayChanged {
        ratings: Option<[SlotRating; SLOT_COUNT]>,
        label: String,
    },
}
