//! Async driver for a [`ReflectionTimer`].
//!
//! One tokio task owns the timer and its ledger. Commands, prompt responses
//! and countdown ticks are serialised through a single `select!` loop, so the
//! timer is never touched concurrently and needs no lock.
//!
//! The one-second tick is a [`Ticker`] that exists only while the timer is
//! `Running`. It is dropped before any command that leaves `Running` is
//! applied, and when the session ends, so at most one tick registration is
//! ever alive per session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::duration::DurationPreset;
use super::engine::{ReflectionTimer, TimerSnapshot, TimerState};
use super::ledger::{DecisionLedger, ReflectionResult};
use super::prompts::PromptSource;
use crate::error::{CoreError, PromptError};
use crate::events::Event;
use crate::purchase::{Purchase, PurchaseDraft};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Scoped one-second tick registration. Dropping it cancels the tick.
struct Ticker {
    interval: Interval,
}

impl Ticker {
    fn every(period: Duration) -> Self {
        // First tick one full period from now, not immediately.
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) {
    match ticker {
        Some(t) => t.tick().await,
        None => std::future::pending().await,
    }
}

/// Timer commands accepted by a session.
#[derive(Debug, Clone)]
pub enum Request {
    Submit(PurchaseDraft),
    /// `None` starts with the selected duration.
    Start(Option<u32>),
    SelectPreset(DurationPreset),
    SetCustomMinutes(Option<u32>),
    SetNotes(Option<String>),
    Pause,
    Resume,
    RequestBypass,
    CancelBypass,
    ConfirmBypass,
    Decline,
    Reset,
}

impl Request {
    /// Commands that, accepted from `Running`, take the timer out of it.
    fn leaves_running(&self) -> bool {
        matches!(
            self,
            Request::Pause | Request::RequestBypass | Request::Decline | Request::Reset
        )
    }
}

enum Command {
    Apply(Request, oneshot::Sender<Result<Event, CoreError>>),
    Snapshot(oneshot::Sender<TimerSnapshot>),
    Ledger(oneshot::Sender<Vec<ReflectionResult>>),
}

struct PromptOutcome {
    ticket: u64,
    result: Result<Vec<String>, PromptError>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub tick_period: Duration,
    /// Fixed seed for prompt rotation; random when `None`.
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// Cloneable handle to a running session. The session shuts down when the
/// last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

pub struct ReflectionSession {
    timer: ReflectionTimer,
    ledger: DecisionLedger,
    source: Arc<dyn PromptSource>,
    prompt_tx: mpsc::UnboundedSender<PromptOutcome>,
    prompt_task: Option<JoinHandle<()>>,
    events: broadcast::Sender<Event>,
    rng: StdRng,
    tick_period: Duration,
}

impl ReflectionSession {
    /// Spawn the session task on the current tokio runtime.
    pub fn spawn(
        timer: ReflectionTimer,
        ledger: DecisionLedger,
        source: Arc<dyn PromptSource>,
        options: SessionOptions,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (prompt_tx, prompt_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let session = Self {
            timer,
            ledger,
            source,
            prompt_tx,
            prompt_task: None,
            events: events.clone(),
            rng,
            tick_period: options.tick_period,
        };
        tokio::spawn(session.run(command_rx, prompt_rx));

        SessionHandle {
            commands: command_tx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut prompts: mpsc::UnboundedReceiver<PromptOutcome>,
    ) {
        // A timer restored mid-countdown resumes ticking straight away.
        let mut ticker = self.timer.is_running().then(|| Ticker::every(self.tick_period));
        tracing::debug!("Reflection session started");

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command, &mut ticker);
                }
                Some(outcome) = prompts.recv() => {
                    if let Some(event) = self.timer.resolve_prompts(outcome.ticket, outcome.result) {
                        self.publish(event);
                    }
                }
                () = next_tick(&mut ticker) => {
                    if let Some(event) = self.timer.tick_with(&mut self.rng) {
                        self.publish(event);
                    }
                    if !self.timer.is_running() {
                        ticker = None;
                    }
                }
            }
        }

        drop(ticker);
        if let Some(task) = self.prompt_task.take() {
            task.abort();
        }
        tracing::debug!("Reflection session stopped");
    }

    fn handle(&mut self, command: Command, ticker: &mut Option<Ticker>) {
        match command {
            Command::Apply(request, reply) => {
                if self.timer.is_running() && request.leaves_running() {
                    *ticker = None;
                }
                let result = self.apply(request);
                if self.timer.is_running() && ticker.is_none() {
                    *ticker = Some(Ticker::every(self.tick_period));
                }
                if let Ok(event) = &result {
                    self.publish(event.clone());
                }
                let _ = reply.send(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.timer.snapshot());
            }
            Command::Ledger(reply) => {
                let _ = reply.send(self.ledger.iter().cloned().collect());
            }
        }
    }

    fn apply(&mut self, request: Request) -> Result<Event, CoreError> {
        let event = match request {
            Request::Submit(draft) => {
                let ticket = self.timer.submit_purchase(draft)?;
                let event = Event::PurchaseSubmitted {
                    ticket: ticket.id,
                    name: ticket.purchase.name().to_string(),
                    price: ticket.purchase.price(),
                    category: ticket.purchase.category(),
                    at: Utc::now(),
                };
                self.request_prompts(ticket.id, ticket.purchase);
                event
            }
            Request::Start(Some(minutes)) => self.timer.start(minutes)?,
            Request::Start(None) => self.timer.start_selected()?,
            Request::SelectPreset(preset) => self.timer.select_preset(preset)?,
            Request::SetCustomMinutes(minutes) => self.timer.set_custom_minutes(minutes)?,
            Request::SetNotes(notes) => self.timer.set_notes(notes)?,
            Request::Pause => self.timer.pause()?,
            Request::Resume => self.timer.resume()?,
            Request::RequestBypass => self.timer.request_bypass()?,
            Request::CancelBypass => self.timer.cancel_bypass()?,
            Request::ConfirmBypass => self.timer.confirm_bypass(&mut self.ledger)?,
            Request::Decline => self.timer.decline(&mut self.ledger)?,
            Request::Reset => self.timer.reset()?,
        };
        Ok(event)
    }

    /// Fire the single prompt request for this submission.
    fn request_prompts(&mut self, ticket: u64, purchase: Purchase) {
        if let Some(previous) = self.prompt_task.take() {
            previous.abort();
        }
        let source = Arc::clone(&self.source);
        let tx = self.prompt_tx.clone();
        self.prompt_task = Some(tokio::spawn(async move {
            let result = source.generate(&purchase).await;
            let _ = tx.send(PromptOutcome { ticket, result });
        }));
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl SessionHandle {
    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub async fn send(&self, request: Request) -> Result<Event, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Apply(request, tx))
            .await
            .map_err(|_| CoreError::SessionClosed)?;
        rx.await.map_err(|_| CoreError::SessionClosed)?
    }

    pub async fn submit(&self, draft: PurchaseDraft) -> Result<Event, CoreError> {
        self.send(Request::Submit(draft)).await
    }

    pub async fn start(&self, minutes: Option<u32>) -> Result<Event, CoreError> {
        self.send(Request::Start(minutes)).await
    }

    pub async fn pause(&self) -> Result<Event, CoreError> {
        self.send(Request::Pause).await
    }

    pub async fn resume(&self) -> Result<Event, CoreError> {
        self.send(Request::Resume).await
    }

    pub async fn request_bypass(&self) -> Result<Event, CoreError> {
        self.send(Request::RequestBypass).await
    }

    pub async fn cancel_bypass(&self) -> Result<Event, CoreError> {
        self.send(Request::CancelBypass).await
    }

    pub async fn confirm_bypass(&self) -> Result<Event, CoreError> {
        self.send(Request::ConfirmBypass).await
    }

    pub async fn decline(&self) -> Result<Event, CoreError> {
        self.send(Request::Decline).await
    }

    pub async fn reset(&self) -> Result<Event, CoreError> {
        self.send(Request::Reset).await
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(tx))
            .await
            .map_err(|_| CoreError::SessionClosed)?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }

    pub async fn ledger(&self) -> Result<Vec<ReflectionResult>, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Ledger(tx))
            .await
            .map_err(|_| CoreError::SessionClosed)?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }

    pub async fn state(&self) -> Result<TimerState, CoreError> {
        Ok(self.snapshot().await?.state)
    }
}
