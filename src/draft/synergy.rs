use serde::Serialize;

/// Aggregate counter movement reported for one drafted card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDeltas {
    pub draw: i32,
    pub to_your_hand: i32,
    pub discover: i32,
}

/// Deck mechanics tracking. Only the narrow update contract is used here.
pub trait SynergyCounters: Send {
    fn update_counters(&mut self, code: &str) -> CounterDeltas;

    fn reset(&mut self);
}

/// Tracks nothing.
#[derive(Debug, Default)]
pub struct NoSynergy;

impl SynergyCounters for NoSynergy {
    fn update_counters(&mut self, _code: &str) -> CounterDeltas {
        CounterDeltas::default()
    }

    fn reset(&mut self) {}
}
