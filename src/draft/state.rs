use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::capture::{CaptureRound, SelectedCard, SLOT_COUNT};
use crate::library::{CardClass, ReferenceLibrary};
use crate::locator::ScreenGeometry;
use crate::tiers::{CardScores, DeckScore, TierTables};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum SessionMode {
    Idle,
    CardDraft { hero: CardClass },
    HeroDraft,
}

impl Default for SessionMode {
    fn default() -> Self {
        SessionMode::Idle
    }
}

impl SessionMode {
    pub fn is_card_draft(self) -> bool {
        matches!(self, SessionMode::CardDraft { .. })
    }

    pub fn is_hero_draft(self) -> bool {
        self == SessionMode::HeroDraft
    }

    pub fn is_active(self) -> bool {
        self != SessionMode::Idle
    }
}

/// A card already in the deck when a draft is resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub code: String,
    pub total: u32,
}

#[derive(Debug, Default)]
pub struct DraftState {
    pub mode: SessionMode,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    /// Bumped whenever a session starts or ends
    pub session_epoch: u64,
    /// Bumped whenever the capture round is reset
    pub round_epoch: u64,
    pub geometry: Option<ScreenGeometry>,
    pub library: Arc<ReferenceLibrary>,
    pub tiers: TierTables,
    pub round: CaptureRound,
    pub capturing: bool,
    pub shown: [Option<SelectedCard>; SLOT_COUNT],
    pub shown_scores: [CardScores; SLOT_COUNT],
    pub deck: DeckScore,
    pub deck_codes: Vec<String>,
    pub just_picked: Option<String>,
    /// Survives across sessions
    pub hero_winrates: HashMap<CardClass, f32>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_session(&mut self, mode: SessionMode, library: ReferenceLibrary, tiers: TierTables) {
        self.end_session();
        self.mode = mode;
        self.session_id = Some(Uuid::new_v4());
        self.started_at = Some(Utc::now());
        self.library = Arc::new(library);
        self.tiers = tiers;
    }

    /// Back to idle. Epochs advance so in-flight work from the old session
    /// is discarded.
    pub fn end_session(&mut self) {
        let hero_winrates = std::mem::take(&mut self.hero_winrates);
        let session_epoch = self.session_epoch + 1;
        let round_epoch = self.round_epoch + 1;
        *self = Self {
            session_epoch,
            round_epoch,
            hero_winrates,
            ..Self::default()
        };
    }

    /// Clears the current round and the cards on display.
    pub fn reset_round(&mut self, extended: bool) {
        self.round.reset(extended);
        self.round_epoch += 1;
        self.capturing = false;
        self.shown = Default::default();
        self.shown_scores = Default::default();
    }

    /// Leaving the screen mid-round: drop everything and flag the round.
    pub fn abandon_round(&mut self) {
        self.reset_round(false);
        self.round.abandon();
    }

    pub fn has_shown_cards(&self) -> bool {
        self.shown.iter().any(Option::is_some)
    }

    pub fn shown_index(&self, code: &str) -> Option<usize> {
        self.shown
            .iter()
            .position(|card| card.as_ref().is_some_and(|c| c.code == code))
    }

    /// Library, tiers and screen are all there for a round to start.
    pub fn ready_to_capture(&self) -> bool {
        let data_ready = match self.mode {
            SessionMode::CardDraft { .. } => !self.tiers.is_empty(),
            SessionMode::HeroDraft => true,
            SessionMode::Idle => false,
        };
        data_ready && !self.capturing && self.geometry.is_some() && self.library.is_ready()
    }
}
