pub mod commands;
pub mod controller;
pub mod events;
pub mod hero;
pub mod state;
pub mod synergy;

pub use commands::{dispatch, CommandReply, DraftCommand};
pub use controller::{DraftController, DraftServices, DraftSnapshot};
pub use events::DraftEvent;
pub use hero::{hero_class, HERO_CODES};
pub use state::{DeckCard, DraftState, SessionMode};
pub use synergy::{CounterDeltas, NoSynergy, SynergyCounters};
