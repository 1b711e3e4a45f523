//! Game simulation: the turn loop and its retry budgets.
//!
//! ## Key Types
//!
//! - `SimulationLoop`: drives one game to completion against one event log
//! - `RetryPolicy` / `Backoff`: logic attempts and transient backoff
//! - `Clock`: time source for backoff (`SystemClock`, `ManualClock`)
//! - `TurnGate`: optional pause before each turn (semi-automatic mode)

pub mod retry;
pub mod runner;

use std::time::{SystemTime, UNIX_EPOCH};

pub use retry::{Backoff, Clock, ManualClock, RetryPolicy, SystemClock};
pub use runner::{
    NoGate, SimulationError, SimulationLoop, SimulationOptions, SimulationOutcome, StdinGate,
    TurnGate,
};

/// Id for a fresh game: `game_{unix_seconds}`.
#[must_use]
pub fn new_game_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("game_{secs}")
}
