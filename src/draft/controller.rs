use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::Duration,
};
use uuid::Uuid;

use super::events::DraftEvent;
use super::hero::{hero_class, HERO_CODES};
use super::state::{DeckCard, DraftState, SessionMode};
use super::synergy::{NoSynergy, SynergyCounters};
use crate::capture::{
    rank_candidates, select_cards, AcceptThreshold, Candidate, CaptureController, SelectedCard,
    TickOutcome, SLOT_COUNT,
};
use crate::config::DraftConfig;
use crate::error::DraftError;
use crate::histogram::histogram_of_region;
use crate::library::{load_histogram, CardCatalog, CardClass, CardImageFetcher, ReferenceLibrary};
use crate::locator::{
    search_until_found, DraftLayout, LayoutKind, LocatorTask, MatchOptions, ScreenGeometry, ScreenSource,
    SearchSchedule,
};
use crate::settings::{DisplaySettings, DraftMethod, SettingsStore};
use crate::tiers::{rate_slots, CardScores, DeckAverages, TierTables};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Point-in-time view of the session for UI refreshes and tests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub mode: SessionMode,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub geometry: Option<ScreenGeometry>,
    pub capturing: bool,
    pub rounds: u32,
    pub round_empty: bool,
    pub pending_downloads: usize,
    pub shown: [Option<SelectedCard>; SLOT_COUNT],
    pub scores: [CardScores; SLOT_COUNT],
    pub deck: DeckAverages,
    pub deck_codes: Vec<String>,
    pub label: String,
}

/// External collaborators the controller drives.
pub struct DraftServices {
    pub screens: Arc<dyn ScreenSource>,
    pub fetcher: Arc<dyn CardImageFetcher>,
    pub synergy: Box<dyn SynergyCounters>,
}

impl DraftServices {
    pub fn new(screens: Arc<dyn ScreenSource>, fetcher: Arc<dyn CardImageFetcher>) -> Self {
        Self {
            screens,
            fetcher,
            synergy: Box::new(NoSynergy),
        }
    }

    pub fn with_synergy(mut self, synergy: Box<dyn SynergyCounters>) -> Self {
        self.synergy = synergy;
        self
    }
}

/// Owns the draft session and every task working on its behalf.
///
/// All session state sits behind one async mutex. Background work (screen
/// search, image downloads, capture ticks) captures the session or round
/// epoch when it starts and drops its result if the epoch has moved on.
/// Lock order is state, then capture, then locator; std guards are never
/// held across an await.
#[derive(Clone)]
pub struct DraftController {
    state: Arc<Mutex<DraftState>>,
    capture: Arc<StdMutex<CaptureController>>,
    locator: Arc<StdMutex<LocatorTask>>,
    synergy: Arc<StdMutex<Box<dyn SynergyCounters>>>,
    layouts: Arc<StdMutex<HashMap<LayoutKind, Arc<DraftLayout>>>>,
    config: Arc<DraftConfig>,
    settings: Arc<SettingsStore>,
    catalog: Arc<CardCatalog>,
    screens: Arc<dyn ScreenSource>,
    fetcher: Arc<dyn CardImageFetcher>,
    events: mpsc::UnboundedSender<DraftEvent>,
}

impl DraftController {
    pub fn new(
        config: DraftConfig,
        settings: SettingsStore,
        catalog: CardCatalog,
        services: DraftServices,
    ) -> (Self, mpsc::UnboundedReceiver<DraftEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            state: Arc::new(Mutex::new(DraftState::new())),
            capture: Arc::new(StdMutex::new(CaptureController::new())),
            locator: Arc::new(StdMutex::new(LocatorTask::new())),
            synergy: Arc::new(StdMutex::new(services.synergy)),
            layouts: Arc::new(StdMutex::new(HashMap::new())),
            config: Arc::new(config),
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            screens: services.screens,
            fetcher: services.fetcher,
            events,
        };
        (controller, receiver)
    }

    /// Uses `layout` instead of reading its template from disk.
    pub fn preload_layout(&self, layout: DraftLayout) {
        lock(&self.layouts).insert(layout.kind, Arc::new(layout));
    }

    pub async fn snapshot(&self) -> DraftSnapshot {
        let state = self.state.lock().await;
        let display = self.settings.display();
        DraftSnapshot {
            mode: state.mode,
            session_id: state.session_id,
            started_at: state.started_at,
            geometry: state.geometry,
            capturing: state.capturing,
            rounds: state.round.rounds(),
            round_empty: state.round.is_empty(),
            pending_downloads: state.library.pending_count(),
            shown: state.shown.clone(),
            scores: state.shown_scores,
            deck: state.deck.averages(display.normalized_lf),
            deck_codes: state.deck_codes.clone(),
            label: state.deck.label(display.draft_method, display.normalized_lf),
        }
    }

    /// Starts a card draft for hero id `"1"`..`"9"`, replaying `deck` when
    /// resuming.
    pub async fn begin_draft(&self, hero: &str, deck: Vec<DeckCard>) -> Result<()> {
        let Some(class) = CardClass::from_hero_id(hero) else {
            error!("Begin draft with unknown hero id: {hero}");
            return Err(DraftError::UnknownHero(hero.to_string()).into());
        };

        let config = Arc::clone(&self.config);
        let catalog = Arc::clone(&self.catalog);
        let (tiers, library) = tokio::task::spawn_blocking(move || -> Result<_> {
            let tiers = TierTables::load(&config.data_dir, class, config.multi_class, &catalog)?;
            let mut library = ReferenceLibrary::new(config.cards_dir.clone(), false);
            for code in tiers.codes() {
                library.add_card(code, &catalog);
            }
            Ok((tiers, library))
        })
        .await
        .context("draft data worker failed")??;
        let layout = self.layout(LayoutKind::Cards).await?;

        let stale = self.stop_tasks();
        let mut state = self.state.lock().await;
        self.close_session(&mut state);
        state.begin_session(SessionMode::CardDraft { hero: class }, library, tiers);

        {
            let mut synergy = lock(&self.synergy);
            synergy.reset();
            for card in &deck {
                for _ in 0..card.total {
                    synergy.update_counters(&card.code);
                    let scores = state.tiers.scores(&card.code);
                    state.deck.add_pick(scores);
                    state.deck_codes.push(card.code.clone());
                }
            }
        }

        info!(
            "New draft: {} ({} cards in deck, {} reference images)",
            class.display_name(),
            state.deck.cards,
            state.library.len()
        );
        self.emit_session_started(&state);
        if state.deck.cards > 0 {
            let display = self.settings.display();
            self.emit(DraftEvent::DeckScoreUpdated {
                deck: state.deck.averages(display.normalized_lf),
                label: state.deck.label(display.draft_method, display.normalized_lf),
            });
        }
        self.start_locator(state.session_epoch, layout, Duration::ZERO);
        self.start_downloads(&state);
        drop(state);

        join_stale(stale).await;
        Ok(())
    }

    /// Ends the card draft and reports the final deck score.
    pub async fn end_draft(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.mode.is_card_draft() {
            log_debug!("end_draft without a card draft");
            return Ok(());
        }
        let stale = self.stop_tasks();
        self.close_session(&mut state);
        drop(state);

        join_stale(stale).await;
        info!("End draft.");
        Ok(())
    }

    /// Starts watching the hero selection screen.
    pub async fn begin_hero_draft(&self) -> Result<()> {
        let config = Arc::clone(&self.config);
        let library = tokio::task::spawn_blocking(move || {
            let mut library = ReferenceLibrary::new(config.cards_dir.clone(), true);
            for code in HERO_CODES {
                library.add_code(code);
            }
            library
        })
        .await
        .context("hero data worker failed")?;
        let layout = self.layout(LayoutKind::Heroes).await?;

        let stale = self.stop_tasks();
        let mut state = self.state.lock().await;
        self.close_session(&mut state);
        state.begin_session(SessionMode::HeroDraft, library, TierTables::default());

        info!("Begin hero draft.");
        self.emit_session_started(&state);
        self.start_locator(state.session_epoch, layout, self.config.hero_locator_delay());
        self.start_downloads(&state);
        drop(state);

        join_stale(stale).await;
        Ok(())
    }

    pub async fn end_hero_draft(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.mode.is_hero_draft() {
            log_debug!("end_hero_draft without a hero draft");
            return Ok(());
        }
        let stale = self.stop_tasks();
        self.close_session(&mut state);
        drop(state);

        join_stale(stale).await;
        info!("End hero draft.");
        Ok(())
    }

    /// The draft screen is visible again.
    pub async fn enter_arena(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.mode.is_card_draft() && !state.has_shown_cards() {
            self.start_round_locked(&mut state, true);
        }
        Ok(())
    }

    /// The draft screen was left. A running round is abandoned; a hero draft
    /// ends.
    pub async fn leave_arena(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let mode = state.mode;
        match mode {
            SessionMode::HeroDraft => {
                drop(state);
                self.end_hero_draft().await
            }
            SessionMode::CardDraft { .. } if state.capturing => {
                state.abandon_round();
                let stale = lock(&self.capture).cancel();
                drop(state);
                info!("Left arena mid capture");
                self.emit(DraftEvent::RoundCancelled);
                join_stale(stale).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Records a pick. `code` is a card code or a slot index `"0"`..`"2"`.
    pub async fn pick_card(&self, code: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.mode.is_card_draft() {
            warn!("Pick {code} outside a draft");
            return Err(DraftError::NotDrafting.into());
        }
        let slot = match code {
            "0" => Some(0),
            "1" => Some(1),
            "2" => Some(2),
            _ => None,
        };
        let (picked, delayed) = match slot {
            Some(slot) => match &state.shown[slot] {
                Some(card) => (card.code.clone(), false),
                None => {
                    warn!("Pick by slot {slot} with no card shown");
                    return Err(DraftError::InvalidSlot(slot).into());
                }
            },
            None => (code.to_string(), true),
        };
        if state.just_picked.as_deref() == Some(picked.as_str()) {
            warn!("Duplicate pick code detected: {picked}");
            return Err(DraftError::DuplicatePick(picked).into());
        }

        let scores = match state.shown_index(&picked) {
            Some(index) => state.shown_scores[index],
            None => state.tiers.scores(&picked),
        };
        let counters = lock(&self.synergy).update_counters(&picked);
        state.deck.add_pick(scores);
        state.deck_codes.push(picked.clone());
        state.just_picked = Some(picked.clone());

        state.reset_round(false);
        let stale = lock(&self.capture).cancel();

        let display = self.settings.display();
        info!("Pick card: {} {}", picked, self.catalog.name(&picked));
        self.emit(DraftEvent::CardPicked {
            code: picked,
            scores,
            counters,
            deck: state.deck.averages(display.normalized_lf),
        });
        self.emit(DraftEvent::DeckScoreUpdated {
            deck: state.deck.averages(display.normalized_lf),
            label: state.deck.label(display.draft_method, display.normalized_lf),
        });
        self.start_round_locked(&mut state, delayed);
        drop(state);

        join_stale(stale).await;
        Ok(())
    }

    /// Discards the cards on display and recaptures with a wider pool.
    pub async fn refresh_captured_cards(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.mode.is_card_draft() {
            return Err(DraftError::NotDrafting.into());
        }
        state.reset_round(true);
        let stale = lock(&self.capture).cancel();
        info!("Refresh captured cards");
        self.start_round_locked(&mut state, false);
        drop(state);

        join_stale(stale).await;
        Ok(())
    }

    /// Replaces the shown card in `slot` with another of its best matches.
    pub async fn select_candidate(&self, slot: usize, index: usize) -> Result<SelectedCard> {
        let mut state = self.state.lock().await;
        if !state.mode.is_card_draft() {
            return Err(DraftError::NotDrafting.into());
        }
        let round_slot = state.round.slot(slot).ok_or(DraftError::InvalidSlot(slot))?;
        let candidate = round_slot
            .best_matches()
            .get(index)
            .ok_or(DraftError::InvalidCandidate { slot, index })?;
        let selected = SelectedCard::from_candidate(candidate, index, &self.catalog);

        let scores = state.tiers.scores(&selected.code);
        state.shown_scores[slot] = scores;
        state.shown[slot] = Some(selected.clone());
        log_debug!("Slot {} now shows {} {}", slot, selected.code, selected.name);

        let ratings = rate_slots(&state.shown_scores, self.settings.display());
        self.emit(DraftEvent::SelectionChanged {
            slot,
            selected: selected.clone(),
            scores: state.shown_scores,
            ratings,
        });
        Ok(selected)
    }

    pub async fn set_draft_method(&self, method: DraftMethod) -> Result<DisplaySettings> {
        self.update_display(|display| display.draft_method = method).await
    }

    pub async fn set_normalized_lf(&self, enabled: bool) -> Result<DisplaySettings> {
        self.update_display(|display| display.normalized_lf = enabled).await
    }

    pub async fn set_learning_mode(&self, enabled: bool) -> Result<DisplaySettings> {
        self.update_display(|display| display.learning_mode = enabled).await
    }

    pub async fn set_hero_winrates(&self, winrates: HashMap<CardClass, f32>) {
        self.state.lock().await.hero_winrates = winrates;
    }

    /// Feeds the result of one reference image download into the library.
    pub async fn report_card_image(&self, code: &str, found: bool) {
        let (path, crop, session_epoch) = {
            let state = self.state.lock().await;
            if !state.library.is_pending(code) {
                log_debug!("Ignoring image report for {}", code);
                return;
            }
            (
                state.library.image_path(code),
                state.library.crop_mode(code),
                state.session_epoch,
            )
        };

        let hist = if found {
            match tokio::task::spawn_blocking(move || load_histogram(&path, crop)).await {
                Ok(Ok(hist)) => Some(hist),
                Ok(Err(err)) => {
                    warn!("Unusable card image {code}: {err:#}");
                    None
                }
                Err(err) => {
                    error!("Card image worker failed for {code}: {err}");
                    None
                }
            }
        } else {
            warn!("Card image {code} missing on web");
            None
        };

        let mut state = self.state.lock().await;
        if state.session_epoch != session_epoch {
            return;
        }
        let Some(remaining) = Arc::make_mut(&mut state.library).complete_download(code, hist) else {
            return;
        };
        self.emit(DraftEvent::DownloadProgress {
            code: code.to_string(),
            remaining,
        });
        if remaining == 0 {
            info!("All card images ready");
            self.emit(DraftEvent::DownloadsFinished);
            self.start_round_locked(&mut state, false);
        }
    }

    async fn update_display<F>(&self, apply: F) -> Result<DisplaySettings>
    where
        F: FnOnce(&mut DisplaySettings),
    {
        let display = self.settings.update(apply)?;
        let state = self.state.lock().await;
        let ratings = state
            .has_shown_cards()
            .then(|| rate_slots(&state.shown_scores, display));
        self.emit(DraftEvent::DisplayChanged {
            ratings,
            label: state.deck.label(display.draft_method, display.normalized_lf),
        });
        Ok(display)
    }

    async fn layout(&self, kind: LayoutKind) -> Result<Arc<DraftLayout>> {
        if let Some(layout) = lock(&self.layouts).get(&kind) {
            return Ok(Arc::clone(layout));
        }
        let dir: PathBuf = self.config.templates_dir.clone();
        let layout = tokio::task::spawn_blocking(move || DraftLayout::load(&dir, kind))
            .await
            .context("template loader failed")??;
        let layout = Arc::new(layout);
        lock(&self.layouts).insert(kind, Arc::clone(&layout));
        Ok(layout)
    }

    /// Cancels capture and screen search. The returned handle is awaited
    /// once the state lock is released.
    fn stop_tasks(&self) -> Option<JoinHandle<()>> {
        let stale = lock(&self.capture).cancel();
        lock(&self.locator).cancel();
        stale
    }

    /// Reports the end of whatever session is active and resets to idle.
    fn close_session(&self, state: &mut DraftState) {
        let display = self.settings.display();
        match state.mode {
            SessionMode::Idle => return,
            SessionMode::CardDraft { .. } => {
                let message = state.deck.final_message(display.draft_method, display.normalized_lf);
                info!("Draft: {message}");
                self.emit(DraftEvent::SessionEnded {
                    session_id: state.session_id,
                    deck: state.deck.averages(display.normalized_lf),
                    message,
                });
            }
            SessionMode::HeroDraft => self.emit(DraftEvent::SessionEnded {
                session_id: state.session_id,
                deck: DeckAverages::default(),
                message: String::new(),
            }),
        }
        state.end_session();
        lock(&self.synergy).reset();
    }

    fn emit_session_started(&self, state: &DraftState) {
        if let Some(session_id) = state.session_id {
            self.emit(DraftEvent::SessionStarted {
                session_id,
                mode: state.mode,
            });
        }
    }

    fn start_locator(&self, session_epoch: u64, layout: Arc<DraftLayout>, initial_delay: Duration) {
        let controller = self.clone();
        let screens = Arc::clone(&self.screens);
        let options = MatchOptions::from(self.config.as_ref());
        let schedule = SearchSchedule {
            initial_delay,
            retry: self.config.locator_retry(),
        };
        let events = self.events.clone();

        let mut locator = lock(&self.locator);
        locator.cancel();
        locator.start(move |cancel_token| async move {
            let found = search_until_found(screens, layout, options, schedule, cancel_token, move || {
                let _ = events.send(DraftEvent::ScreenNotFound);
            })
            .await;
            if let Some(geometry) = found {
                controller.apply_geometry(session_epoch, geometry).await;
            }
        });
    }

    async fn apply_geometry(&self, session_epoch: u64, geometry: ScreenGeometry) {
        let mut state = self.state.lock().await;
        if state.session_epoch != session_epoch || !state.mode.is_active() {
            log_debug!("Dropping screen geometry from an old session");
            return;
        }
        state.geometry = Some(geometry);
        self.emit(DraftEvent::ScreenLocated { geometry });
        self.start_round_locked(&mut state, false);
    }

    /// Fetches pending reference images one at a time. When nothing is
    /// pending the first round starts right away.
    fn start_downloads(&self, state: &DraftState) {
        let pending: Vec<(String, PathBuf)> = state
            .library
            .pending()
            .map(|code| (code.to_string(), state.library.image_path(code)))
            .collect();
        if pending.is_empty() {
            return;
        }
        info!("Downloading {} card images", pending.len());
        self.emit(DraftEvent::DownloadsStarted {
            pending: pending.len(),
        });

        let controller = self.clone();
        let session_epoch = state.session_epoch;
        tokio::spawn(async move {
            for (code, dest) in pending {
                if controller.state.lock().await.session_epoch != session_epoch {
                    log_info!("Download queue dropped, session changed");
                    return;
                }
                let fetcher = Arc::clone(&controller.fetcher);
                let fetch_code = code.clone();
                let found = match tokio::task::spawn_blocking(move || fetcher.fetch(&fetch_code, &dest)).await {
                    Ok(Ok(found)) => found,
                    Ok(Err(err)) => {
                        warn!("Failed to download {code}: {err:#}");
                        false
                    }
                    Err(err) => {
                        error!("Download worker failed for {code}: {err}");
                        false
                    }
                };
                controller.report_card_image(&code, found).await;
            }
        });
    }

    /// Spawns a capture loop for the current round if nothing blocks it.
    fn start_round_locked(&self, state: &mut DraftState, delayed: bool) -> bool {
        if !state.ready_to_capture() {
            return false;
        }
        state.capturing = true;
        state.round.clear_leaving();
        let round_epoch = state.round_epoch;
        let start_delay = if delayed {
            self.config.start_delay()
        } else {
            Duration::ZERO
        };

        let controller = self.clone();
        lock(&self.capture).start(start_delay, move || {
            let controller = controller.clone();
            async move { controller.capture_tick(round_epoch).await }
        });
        self.emit(DraftEvent::RoundStarted {
            extended: state.round.is_extended(),
        });
        true
    }

    fn threshold(&self) -> AcceptThreshold {
        AcceptThreshold {
            base: self.config.accept_threshold,
            step: self.config.accept_threshold_step,
            min_rounds: self.config.min_rounds,
        }
    }

    fn tick_delay(&self, state: &DraftState) -> Duration {
        if state.round.is_fading() {
            self.config.fading_interval()
        } else {
            self.config.poll_interval()
        }
    }

    /// One capture tick: grab, rank, fold into the round, resolve when every
    /// slot is stable.
    async fn capture_tick(&self, round_epoch: u64) -> TickOutcome {
        let (geometry, library, pool) = {
            let mut state = self.state.lock().await;
            if state.round_epoch != round_epoch || !state.mode.is_active() {
                return TickOutcome::Finished;
            }
            if state.round.is_leaving() {
                state.round.clear_leaving();
                state.capturing = false;
                return TickOutcome::Finished;
            }
            let Some(geometry) = state.geometry else {
                state.capturing = false;
                return TickOutcome::Finished;
            };
            (
                geometry,
                Arc::clone(&state.library),
                self.config.pool_size(state.round.is_extended()),
            )
        };

        let screens = Arc::clone(&self.screens);
        let grabbed =
            tokio::task::spawn_blocking(move || rank_slots(screens.as_ref(), &geometry, &library)).await;

        let mut state = self.state.lock().await;
        if state.round_epoch != round_epoch {
            return TickOutcome::Finished;
        }
        if state.round.is_leaving() {
            state.round.clear_leaving();
            state.capturing = false;
            return TickOutcome::Finished;
        }
        let rankings = match grabbed {
            Ok(Ok(rankings)) => rankings,
            Ok(Err(err)) => {
                log_warn!("Slot grab failed: {:#}", err);
                return TickOutcome::Continue(self.tick_delay(&state));
            }
            Err(err) => {
                log_error!("Capture worker failed: {}", err);
                return TickOutcome::Continue(self.tick_delay(&state));
            }
        };

        state.just_picked = None;
        let report = state.round.apply_tick(rankings, pool, &self.threshold());
        log_debug!(
            "tick: rounds {} new {} resolved {}",
            report.rounds,
            report.new_candidates,
            report.resolved
        );
        if !report.resolved {
            return TickOutcome::Continue(self.tick_delay(&state));
        }

        state.capturing = false;
        self.resolve_round(&mut state);
        TickOutcome::Finished
    }

    fn resolve_round(&self, state: &mut DraftState) {
        let candidates: [Vec<Candidate>; SLOT_COUNT] =
            std::array::from_fn(|i| state.round.slots()[i].best_matches().to_vec());

        match state.mode {
            SessionMode::CardDraft { .. } => {
                let selected = select_cards(state.round.slots(), &self.catalog);
                let scores: [CardScores; SLOT_COUNT] = std::array::from_fn(|i| {
                    selected[i]
                        .as_ref()
                        .map(|card| state.tiers.scores(&card.code))
                        .unwrap_or_default()
                });
                info!(
                    "({}) {} New codes.",
                    state.deck.cards,
                    selected
                        .iter()
                        .map(|card| card.as_ref().map_or("-", |c| c.code.as_str()))
                        .collect::<Vec<_>>()
                        .join("/")
                );
                state.shown = selected.clone();
                state.shown_scores = scores;
                let ratings = rate_slots(&scores, self.settings.display());
                self.emit(DraftEvent::CardsResolved {
                    candidates,
                    selected,
                    scores,
                    ratings,
                });
            }
            SessionMode::HeroDraft => {
                let classes: [CardClass; SLOT_COUNT] = std::array::from_fn(|i| {
                    candidates[i]
                        .first()
                        .map_or(CardClass::Invalid, |best| hero_class(&best.code, &self.catalog))
                });
                let winrates = classes.map(|class| state.hero_winrates.get(&class).copied().unwrap_or(0.0));
                info!(
                    "Heroes: {}/{}/{}",
                    classes[0].display_name(),
                    classes[1].display_name(),
                    classes[2].display_name()
                );
                self.emit(DraftEvent::HeroesResolved {
                    candidates,
                    classes,
                    winrates,
                });
            }
            SessionMode::Idle => {}
        }
    }

    fn emit(&self, event: DraftEvent) {
        if self.events.send(event).is_err() {
            log_debug!("No draft event listener");
        }
    }
}

/// Grabs the display and ranks every slot against the library.
fn rank_slots(
    screens: &dyn ScreenSource,
    geometry: &ScreenGeometry,
    library: &ReferenceLibrary,
) -> Result<[Vec<Candidate>; SLOT_COUNT]> {
    let grab = screens.capture(geometry.display)?;
    let mut rankings: [Vec<Candidate>; SLOT_COUNT] = Default::default();
    for (ranking, rect) in rankings.iter_mut().zip(geometry.slots) {
        let hist = histogram_of_region(&grab, rect)?;
        *ranking = rank_candidates(&hist, library);
    }
    Ok(rankings)
}

async fn join_stale(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if let Err(err) = handle.await {
            error!("Capture loop failed to join: {err}");
        }
    }
}

fn lock<T: ?Sized>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
