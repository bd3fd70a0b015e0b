use thiserror::Error;

/// Requests the draft controller refuses outright. Each one is logged and
/// leaves the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("unknown hero id {0:?}")]
    UnknownHero(String),
    #[error("duplicate pick code detected: {0}")]
    DuplicatePick(String),
    #[error("no draft in progress")]
    NotDrafting,
    #[error("slot {0} out of range")]
    InvalidSlot(usize),
    #[error("slot {slot} has no candidate at index {index}")]
    InvalidCandidate { slot: usize, index: usize },
}
