//! Impulse-purchase reflection: the countdown that gates a purchase
//! decision, the prompts shown while it runs, and the ledger of outcomes.

mod duration;
mod engine;
mod ledger;
mod prompts;
mod session;

pub use duration::{format_clock, DurationPreset, DurationSelection};
pub use engine::{PromptTicket, ReflectionTimer, TimerSnapshot, TimerState, PROMPT_ROTATION_SECS};
pub use ledger::{DecisionLedger, LedgerSummary, Outcome, ReflectionResult};
pub use prompts::{
    fallback_prompts, HttpPromptSource, PromptSource, StaticPromptSource, FALLBACK_PROMPTS,
    GENERATING_PLACEHOLDER,
};
pub use session::{ReflectionSession, Request, SessionHandle, SessionOptions};
