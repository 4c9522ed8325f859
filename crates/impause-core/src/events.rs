use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::purchase::Category;
use crate::reflection::{ReflectionResult, TimerState};

/// Every reflection-timer state change produces an Event.
/// Front ends render them; the ledger store and buddy feed consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PurchaseSubmitted {
        ticket: u64,
        name: String,
        price: f64,
        category: Category,
        at: DateTime<Utc>,
    },
    /// Prompt list adopted for the active purchase.
    PromptsReady {
        count: usize,
        fallback: bool,
        current: String,
        at: DateTime<Utc>,
    },
    DurationSelected {
        minutes: u32,
        at: DateTime<Utc>,
    },
    NotesUpdated {
        at: DateTime<Utc>,
    },
    TimerStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// One countdown second elapsed. `prompt` is set when the prompt rotated.
    TimerTicked {
        remaining_secs: u64,
        prompt: Option<String>,
    },
    /// Countdown reached zero. Nothing is recorded until the user decides.
    TimerExpired {
        at: DateTime<Utc>,
    },
    BypassRequested {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    BypassCancelled {
        restored: TimerState,
        at: DateTime<Utc>,
    },
    DecisionRecorded {
        result: ReflectionResult,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
}
