//! Interactive reflection timer.
//!
//! Reads single-letter commands from stdin while the session ticks in the
//! background. Finished decisions are written to the database; a bypass also
//! leaves a notification for accountability buddies.

use std::sync::Arc;

use clap::Args;
use impause_core::accountability::record_decision;
use impause_core::reflection::{
    format_clock, DurationPreset, HttpPromptSource, PromptSource, Request, SessionHandle,
    SessionOptions, StaticPromptSource, GENERATING_PLACEHOLDER,
};
use impause_core::storage::ProfileConfig;
use impause_core::{
    Config, CoreError, Database, Event, Outcome, PurchaseDraft, ReflectionResult,
    ReflectionSession, ReflectionTimer, SavingsGoal, TimerState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::{http_client, CmdResult};

#[derive(Args)]
pub struct ReflectArgs {
    /// What you want to buy
    #[arg(long)]
    name: String,
    /// Price in dollars
    #[arg(long)]
    price: f64,
    /// Category (e.g. "Electronics", "Home & Garden")
    #[arg(long)]
    category: String,
    /// Why you want it
    #[arg(long)]
    reason: String,
    /// How much you need it, 1-10
    #[arg(long)]
    need: u8,
    /// Your hourly wage, to show the price in hours of work
    /// (defaults to profile.hourly_wage)
    #[arg(long)]
    wage: Option<f64>,
    /// Savings goal this purchase competes with
    #[arg(long, requires_all = ["goal_current", "goal_target"])]
    goal_name: Option<String>,
    #[arg(long)]
    goal_current: Option<f64>,
    #[arg(long)]
    goal_target: Option<f64>,
    /// Preset length: 15m, 30m, 1h, 24h
    #[arg(long, conflicts_with = "minutes")]
    preset: Option<DurationPreset>,
    /// Custom length in minutes
    #[arg(long)]
    minutes: Option<u32>,
    /// Skip the prompt generator and use the built-in prompts
    #[arg(long)]
    offline: bool,
}

impl ReflectArgs {
    fn draft(&self) -> PurchaseDraft {
        let savings_goal = match (&self.goal_name, self.goal_current, self.goal_target) {
            (Some(name), Some(current), Some(target)) => Some(SavingsGoal {
                name: name.clone(),
                current,
                target,
            }),
            _ => None,
        };
        PurchaseDraft {
            name: self.name.clone(),
            price: self.price,
            category: self.category.clone(),
            reason: self.reason.clone(),
            need_score: self.need,
            hourly_wage: self.wage,
            savings_goal,
        }
    }
}

const HELP: &str = "commands: [p]ause  [r]esume  [b]ypass  [y]es buy  [c]ancel bypass  \
                    [d]ecline  [n]ote <text>  [s]tatus  [q]uit";

pub async fn run(args: ReflectArgs) -> CmdResult {
    let config = Config::load_or_default();
    let db = Database::open()?;

    let mut selection = config.duration_selection();
    if let Some(preset) = args.preset {
        selection.preset = preset;
        selection.custom_minutes = None;
    }
    if let Some(minutes) = args.minutes {
        selection.custom_minutes = Some(minutes);
    }

    let source: Arc<dyn PromptSource> = if args.offline {
        Arc::new(StaticPromptSource)
    } else {
        Arc::new(HttpPromptSource::new(
            http_client(&config)?,
            config.endpoints.prompts_url.clone(),
        ))
    };

    let session = ReflectionSession::spawn(
        ReflectionTimer::new(selection),
        db.load_ledger()?,
        source,
        SessionOptions::default(),
    );
    let mut events = session.subscribe();

    let profile = &config.profile;
    session.submit(profile.with_saved_wage(args.draft())).await?;
    let snapshot = session.snapshot().await?;
    println!("Reflecting on {} for {}", args.name, profile.money(args.price));
    if let Some(hours) = snapshot.hours_of_work {
        println!("  That's {hours:.1} hours of work.");
    }
    if let Some(pct) = snapshot.savings_percentage {
        println!("  It would take {pct}% of your savings goal.");
    }
    println!("  {GENERATING_PLACEHOLDER}");

    session.start(None).await?;
    println!("Timer started: {}", format_clock(selection.seconds()));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(result) = on_event(&event, profile) {
                        if record_decision(&db, &config, &result)?.is_some() {
                            println!("Your buddies have been told.");
                        }
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&session, line.trim()).await? {
                        break;
                    }
                }
                // stdin closed: nothing more can be decided here.
                None => {
                    let _ = session.reset().await;
                    break;
                }
            },
        }
    }
    Ok(())
}

/// Print an event; returns the recorded result when the reflection is over.
fn on_event(event: &Event, profile: &ProfileConfig) -> Option<ReflectionResult> {
    match event {
        Event::PromptsReady {
            current, fallback, ..
        } => {
            if *fallback {
                println!("  (using built-in prompts)");
            }
            println!("  💭 {current}");
        }
        Event::TimerTicked {
            remaining_secs,
            prompt,
        } => {
            if let Some(prompt) = prompt {
                println!("  💭 {prompt}");
            }
            if remaining_secs % 60 == 0 || *remaining_secs <= 5 {
                println!("  ⏳ {}", format_clock(*remaining_secs));
            }
        }
        Event::TimerPaused { remaining_secs, .. } => {
            println!("Paused at {}", format_clock(*remaining_secs));
        }
        Event::TimerResumed { remaining_secs, .. } => {
            println!("Resumed at {}", format_clock(*remaining_secs));
        }
        Event::TimerExpired { .. } => {
            println!("Time's up. Still want it? [y] buy via bypass, [d] decline");
        }
        Event::BypassRequested { .. } => {
            println!("Skip the rest of the reflection and buy anyway? [y]es / [c]ancel");
        }
        Event::BypassCancelled { restored, .. } => {
            println!("Bypass cancelled, timer {}", state_label(*restored));
        }
        Event::DecisionRecorded { result } => {
            match result.outcome {
                Outcome::Purchased => println!("Recorded: bought {}.", result.purchase.name()),
                Outcome::Declined => println!(
                    "Recorded: skipped {}. You kept {}.",
                    result.purchase.name(),
                    profile.money(result.purchase.price())
                ),
            }
            return Some(result.clone());
        }
        Event::TimerReset { .. } => println!("Reflection abandoned."),
        _ => {}
    }
    None
}

/// Returns false when the user quit.
async fn handle_line(session: &SessionHandle, line: &str) -> Result<bool, CoreError> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let request = match cmd {
        "" => return Ok(true),
        "p" | "pause" => Request::Pause,
        "r" | "resume" => Request::Resume,
        "b" | "bypass" => Request::RequestBypass,
        "c" | "cancel" => Request::CancelBypass,
        "d" | "decline" => Request::Decline,
        "y" | "yes" => {
            // From Expired the bypass prompt is implied.
            if session.state().await? != TimerState::BypassConfirming {
                if let Err(e) = session.request_bypass().await {
                    println!("{e}");
                    return Ok(true);
                }
            }
            Request::ConfirmBypass
        }
        "n" | "note" => Request::SetNotes(Some(rest.to_string())),
        "s" | "status" => {
            let snap = session.snapshot().await?;
            println!(
                "{} {} / {}",
                state_label(snap.state),
                format_clock(snap.remaining_secs),
                format_clock(snap.duration_secs)
            );
            return Ok(true);
        }
        "q" | "quit" => {
            let _ = session.reset().await;
            return Ok(false);
        }
        _ => {
            println!("{HELP}");
            return Ok(true);
        }
    };

    match session.send(request).await {
        Ok(Event::NotesUpdated { .. }) => println!("Note saved."),
        Ok(_) => {}
        Err(CoreError::SessionClosed) => return Ok(false),
        Err(e) => println!("{e}"),
    }
    Ok(true)
}

fn state_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Idle => "idle",
        TimerState::Armed => "ready",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Expired => "expired",
        TimerState::BypassConfirming => "awaiting bypass confirmation",
    }
}
