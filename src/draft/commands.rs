use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::controller::{DraftController, DraftSnapshot};
use super::state::DeckCard;
use crate::library::CardClass;
use crate::settings::{DisplaySettings, DraftMethod};

/// Inbound requests from the game log watcher and the overlay, one JSON
/// object per line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum DraftCommand {
    BeginDraft {
        hero: String,
        #[serde(default)]
        deck: Vec<DeckCard>,
    },
    EndDraft,
    BeginHeroDraft,
    EndHeroDraft,
    EnterArena,
    LeaveArena,
    PickCard {
        code: String,
    },
    RefreshCapturedCards,
    SelectCandidate {
        slot: usize,
        index: usize,
    },
    SetDraftMethod {
        method: DraftMethod,
    },
    SetNormalizedLf {
        enabled: bool,
    },
    SetLearningMode {
        enabled: bool,
    },
    SetHeroWinrates {
        winrates: HashMap<CardClass, f32>,
    },
    Snapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reply", rename_all = "camelCase")]
pub enum CommandReply {
    Ok,
    Display { settings: DisplaySettings },
    Snapshot { snapshot: DraftSnapshot },
}

pub async fn dispatch(controller: &DraftController, command: DraftCommand) -> Result<CommandReply, String> {
    let done = |result: anyhow::Result<()>| result.map(|_| CommandReply::Ok).map_err(|e| e.to_string());
    let display = |result: anyhow::Result<DisplaySettings>| {
        result
            .map(|settings| CommandReply::Display { settings })
            .map_err(|e| e.to_string())
    };

    match command {
        DraftCommand::BeginDraft { hero, deck } => done(controller.begin_draft(&hero, deck).await),
        DraftCommand::EndDraft => done(controller.end_draft().await),
        DraftCommand::BeginHeroDraft => done(controller.begin_hero_draft().await),
        DraftCommand::EndHeroDraft => done(controller.end_hero_draft().await),
        DraftCommand::EnterArena => done(controller.enter_arena().await),
        DraftCommand::LeaveArena => done(controller.leave_arena().await),
        DraftCommand::PickCard { code } => done(controller.pick_card(&code).await),
        DraftCommand::RefreshCapturedCards => done(controller.refresh_captured_cards().await),
        DraftCommand::SelectCandidate { slot, index } => controller
            .select_candidate(slot, index)
            .await
            .map(|_| CommandReply::Ok)
            .map_err(|e| e.to_string()),
        DraftCommand::SetDraftMethod { method } => display(controller.set_draft_method(method).await),
        DraftCommand::SetNormalizedLf { enabled } => display(controller.set_normalized_lf(enabled).await),
        DraftCommand::SetLearningMode { enabled } => display(controller.set_learning_mode(enabled).await),
        DraftCommand::SetHeroWinrates { winrates } => {
            controller.set_hero_winrates(winrates).await;
            Ok(CommandReply::Ok)
        }
        DraftCommand::Snapshot => Ok(CommandReply::Snapshot {
            snapshot: controller.snapshot().await,
        }),
    }
}
