//! Reflection timer state machine.
//!
//! The timer does not own a clock. The caller drives it by calling `tick()`
//! once per elapsed second while it is `Running` (see
//! [`ReflectionSession`](super::ReflectionSession) for the async driver).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Armed -> Running <-> Paused
//!                  Running -> Expired
//! (Running | Paused | Expired) <-> BypassConfirming
//! (Running | Paused | Expired | BypassConfirming) -> Idle   (decision recorded)
//! any non-Idle -> Idle                                      (reset, nothing recorded)
//! ```
//!
//! Every rejected command leaves the timer exactly as it was.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::duration::{DurationPreset, DurationSelection};
use super::ledger::{DecisionLedger, Outcome, ReflectionResult};
use super::prompts::{fallback_prompts, GENERATING_PLACEHOLDER};
use crate::error::{CoreError, PromptError, TimerError};
use crate::events::Event;
use crate::purchase::{Purchase, PurchaseDraft};

/// Seconds between prompt rotations.
pub const PROMPT_ROTATION_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// No active purchase.
    Idle,
    /// Purchase submitted, countdown not started.
    Armed,
    Running,
    Paused,
    /// Countdown hit zero; waiting for bypass or decline.
    Expired,
    /// User asked to proceed early and has not confirmed yet.
    BypassConfirming,
}

/// Identifies one purchase submission so late prompt responses for an
/// earlier purchase are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTicket {
    pub id: u64,
    pub purchase: Purchase,
}

/// Point-in-time view of the timer for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub is_running: bool,
    pub duration_secs: u64,
    pub remaining_secs: u64,
    pub selected_minutes: u32,
    pub purchase: Option<Purchase>,
    pub current_prompt: Option<String>,
    pub generating_prompts: bool,
    pub hours_of_work: Option<f64>,
    pub savings_percentage: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionTimer {
    state: TimerState,
    /// State to return to when a bypass is cancelled.
    #[serde(default)]
    bypass_from: Option<TimerState>,
    selection: DurationSelection,
    duration_secs: u64,
    remaining_secs: u64,
    purchase: Option<Purchase>,
    #[serde(default)]
    notes: Option<String>,
    ticket: u64,
    #[serde(default)]
    prompts: Vec<String>,
    #[serde(default)]
    current_prompt: Option<String>,
    #[serde(default)]
    generating: bool,
}

impl Default for ReflectionTimer {
    fn default() -> Self {
        Self::new(DurationSelection::default())
    }
}

impl ReflectionTimer {
    pub fn new(selection: DurationSelection) -> Self {
        let secs = selection.seconds();
        Self {
            state: TimerState::Idle,
            bypass_from: None,
            selection,
            duration_secs: secs,
            remaining_secs: secs,
            purchase: None,
            notes: None,
            ticket: 0,
            prompts: Vec::new(),
            current_prompt: None,
            generating: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn selection(&self) -> DurationSelection {
        self.selection
    }

    pub fn purchase(&self) -> Option<&Purchase> {
        self.purchase.as_ref()
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn is_generating_prompts(&self) -> bool {
        self.generating
    }

    /// The prompt to display: the placeholder while generating, otherwise the
    /// current pick (if any).
    pub fn current_prompt(&self) -> Option<&str> {
        if self.generating {
            Some(GENERATING_PLACEHOLDER)
        } else {
            self.current_prompt.as_deref()
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            is_running: self.is_running(),
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            selected_minutes: self.selection.minutes(),
            purchase: self.purchase.clone(),
            current_prompt: self.current_prompt().map(str::to_string),
            generating_prompts: self.generating,
            hours_of_work: self.purchase.as_ref().and_then(Purchase::hours_of_work),
            savings_percentage: self.purchase.as_ref().and_then(Purchase::savings_percentage),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate the intake draft and arm the timer with it.
    pub fn submit_purchase(&mut self, draft: PurchaseDraft) -> Result<PromptTicket, CoreError> {
        self.expect(&[TimerState::Idle], "submit_purchase")?;
        let purchase = Purchase::from_draft(draft)?;
        Ok(self.arm(purchase))
    }

    /// Arm the timer with an already-validated purchase.
    pub fn submit(&mut self, purchase: Purchase) -> Result<PromptTicket, TimerError> {
        self.expect(&[TimerState::Idle], "submit")?;
        Ok(self.arm(purchase))
    }

    fn arm(&mut self, purchase: Purchase) -> PromptTicket {
        self.ticket += 1;
        self.duration_secs = self.selection.seconds();
        self.remaining_secs = self.duration_secs;
        self.purchase = Some(purchase.clone());
        self.notes = None;
        self.prompts.clear();
        self.current_prompt = None;
        self.generating = true;
        self.state = TimerState::Armed;
        tracing::debug!(ticket = self.ticket, name = purchase.name(), "Purchase armed");
        PromptTicket {
            id: self.ticket,
            purchase,
        }
    }

    /// Adopt the prompt generator's answer for `ticket`, or the fallback list
    /// when it failed or came back empty. Returns `None` for stale tickets.
    pub fn resolve_prompts(
        &mut self,
        ticket: u64,
        result: Result<Vec<String>, PromptError>,
    ) -> Option<Event> {
        if ticket != self.ticket || self.purchase.is_none() {
            tracing::debug!(ticket, current = self.ticket, "Ignoring stale prompt response");
            return None;
        }

        let (prompts, fallback) = match result {
            Ok(prompts) if !prompts.is_empty() => (prompts, false),
            Ok(_) => {
                tracing::warn!("Prompt generator returned nothing, using fallback prompts");
                (fallback_prompts(), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to generate reflection prompts, using fallback");
                (fallback_prompts(), true)
            }
        };

        let current = prompts[0].clone();
        self.prompts = prompts;
        self.current_prompt = Some(current.clone());
        self.generating = false;
        Some(Event::PromptsReady {
            count: self.prompts.len(),
            fallback,
            current,
            at: Utc::now(),
        })
    }

    pub fn select_preset(&mut self, preset: DurationPreset) -> Result<Event, TimerError> {
        self.selection.preset = preset;
        Ok(self.selection_changed())
    }

    /// `Some(m)` overrides the preset; `None` goes back to it.
    pub fn set_custom_minutes(&mut self, minutes: Option<u32>) -> Result<Event, TimerError> {
        self.selection.custom_minutes = minutes;
        Ok(self.selection_changed())
    }

    fn selection_changed(&mut self) -> Event {
        // A countdown in progress keeps its duration; only the next start sees it.
        if matches!(self.state, TimerState::Idle | TimerState::Armed) {
            self.duration_secs = self.selection.seconds();
            self.remaining_secs = self.duration_secs;
        }
        Event::DurationSelected {
            minutes: self.selection.minutes(),
            at: Utc::now(),
        }
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> Result<Event, TimerError> {
        if self.purchase.is_none() {
            return Err(TimerError::NoActivePurchase);
        }
        self.notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Ok(Event::NotesUpdated { at: Utc::now() })
    }

    /// Start (or restart) the countdown with an explicit length.
    pub fn start(&mut self, minutes: u32) -> Result<Event, TimerError> {
        if self.purchase.is_none() {
            return Err(TimerError::NoActivePurchase);
        }
        self.expect(
            &[TimerState::Armed, TimerState::Paused, TimerState::Expired],
            "start",
        )?;
        if minutes == 0 {
            return Err(TimerError::InvalidDuration);
        }

        self.duration_secs = u64::from(minutes) * 60;
        self.remaining_secs = self.duration_secs;
        self.state = TimerState::Running;
        Ok(Event::TimerStarted {
            duration_secs: self.duration_secs,
            at: Utc::now(),
        })
    }

    /// Start with the selected duration (custom minutes win over the preset).
    pub fn start_selected(&mut self) -> Result<Event, TimerError> {
        self.start(self.selection.minutes())
    }

    pub fn pause(&mut self) -> Result<Event, TimerError> {
        self.expect(&[TimerState::Running], "pause")?;
        self.state = TimerState::Paused;
        Ok(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Result<Event, TimerError> {
        self.expect(&[TimerState::Paused], "resume")?;
        if self.remaining_secs == 0 {
            return Err(TimerError::NothingRemaining);
        }
        self.state = TimerState::Running;
        Ok(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// One elapsed second. Only meaningful while `Running`.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_with(&mut rand::thread_rng())
    }

    pub fn tick_with<R: Rng>(&mut self, rng: &mut R) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }

        let mut rotated = None;
        if self.remaining_secs % PROMPT_ROTATION_SECS == 0 && !self.prompts.is_empty() {
            let pick = self.prompts[rng.gen_range(0..self.prompts.len())].clone();
            self.current_prompt = Some(pick.clone());
            rotated = Some(pick);
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            tracing::debug!("Reflection countdown expired");
            return Some(Event::TimerExpired { at: Utc::now() });
        }

        Some(Event::TimerTicked {
            remaining_secs: self.remaining_secs,
            prompt: rotated,
        })
    }

    pub fn request_bypass(&mut self) -> Result<Event, TimerError> {
        let from = self.expect(
            &[TimerState::Running, TimerState::Paused, TimerState::Expired],
            "request_bypass",
        )?;
        self.bypass_from = Some(from);
        self.state = TimerState::BypassConfirming;
        Ok(Event::BypassRequested {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn cancel_bypass(&mut self) -> Result<Event, TimerError> {
        self.expect(&[TimerState::BypassConfirming], "cancel_bypass")?;
        let restored = self.bypass_from.take().unwrap_or(TimerState::Paused);
        self.state = restored;
        Ok(Event::BypassCancelled {
            restored,
            at: Utc::now(),
        })
    }

    /// Proceed with the purchase: record `purchased` and reset.
    pub fn confirm_bypass(&mut self, ledger: &mut DecisionLedger) -> Result<Event, TimerError> {
        self.expect(&[TimerState::BypassConfirming], "confirm_bypass")?;
        self.finish(Outcome::Purchased, ledger)
    }

    /// Skip the purchase: record `declined` and reset.
    pub fn decline(&mut self, ledger: &mut DecisionLedger) -> Result<Event, TimerError> {
        self.expect(
            &[
                TimerState::Running,
                TimerState::Paused,
                TimerState::Expired,
                TimerState::BypassConfirming,
            ],
            "decline",
        )?;
        self.finish(Outcome::Declined, ledger)
    }

    /// Abandon the active purchase without recording anything.
    pub fn reset(&mut self) -> Result<Event, TimerError> {
        if self.state == TimerState::Idle {
            return Err(TimerError::InvalidTransition {
                operation: "reset",
                state: self.state,
            });
        }
        self.clear();
        Ok(Event::TimerReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expect(&self, allowed: &[TimerState], operation: &'static str) -> Result<TimerState, TimerError> {
        if allowed.contains(&self.state) {
            Ok(self.state)
        } else {
            Err(TimerError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn finish(&mut self, outcome: Outcome, ledger: &mut DecisionLedger) -> Result<Event, TimerError> {
        let purchase = self.purchase.take().ok_or(TimerError::NoActivePurchase)?;
        let notes = self.notes.take();
        let result = ledger
            .record(ReflectionResult::new(purchase, outcome, notes))
            .clone();
        tracing::info!(
            name = result.purchase.name(),
            outcome = outcome.as_str(),
            "Reflection decision recorded"
        );
        self.clear();
        Ok(Event::DecisionRecorded { result })
    }

    fn clear(&mut self) {
        self.state = TimerState::Idle;
        self.bypass_from = None;
        self.purchase = None;
        self.notes = None;
        self.prompts.clear();
        self.current_prompt = None;
        self.generating = false;
        self.duration_secs = self.selection.seconds();
        self.remaining_secs = self.duration_secs;
    }
}
