pub mod controller;
pub mod loop_worker;
pub mod round;
pub mod selection;

pub use controller::CaptureController;
pub use loop_worker::{capture_loop, TickOutcome};
pub use round::{rank_candidates, AcceptThreshold, Candidate, CaptureRound, SlotState, TickReport, SLOT_COUNT};
pub use selection::{reference_rarity, select_cards, RarityConstraint, SelectedCard};
