//! # Impause Core Library
//!
//! This library provides the core logic for Impause, a tool that puts a
//! cooling-off period between wanting something and buying it. All operations
//! are available through the standalone `impause-cli` binary, which is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Reflection Timer**: A tick-driven state machine holding one candidate
//!   purchase, its countdown and the rotating reflection prompts
//! - **Reflection Session**: A tokio task that owns the timer, drives ticks and
//!   publishes [`Event`]s
//! - **Storage**: SQLite decision history and TOML-based configuration
//! - **Services**: Auth, statement analysis ("wrapped") and prompt generation
//!   over HTTP
//!
//! ## Key Components
//!
//! - [`ReflectionTimer`]: Core timer state machine
//! - [`DecisionLedger`]: Most-recent-first history of decisions
//! - [`Database`]: Ledger and key-value persistence
//! - [`Config`]: Application configuration management

pub mod accountability;
pub mod auth;
pub mod error;
pub mod events;
pub mod purchase;
pub mod reflection;
pub mod storage;
pub mod wrapped;

pub use error::{CoreError, ValidationError};
pub use events::Event;
pub use purchase::{Category, Purchase, PurchaseDraft, SavingsGoal};
pub use reflection::{
    DecisionLedger, DurationPreset, Outcome, ReflectionResult, ReflectionSession, ReflectionTimer,
    SessionHandle, TimerSnapshot, TimerState,
};
pub use storage::{Config, Database};
