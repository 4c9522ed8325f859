//! Accountability buddies and the notifications shared with them.
//!
//! Both lists are persisted as JSON in the database kv table.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::reflection::{Outcome, ReflectionResult};
use crate::storage::{Config, Database};

pub const DEFAULT_INVITE_MESSAGE: &str =
    "Hey! I'm using Impause to manage my finances better. Would you be my accountability buddy?";

const BUDDIES_KEY: &str = "buddies";
const NOTIFICATIONS_KEY: &str = "notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuddyStatus {
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buddy {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: BuddyStatus,
    pub invite_message: String,
    pub invited_at: DateTime<Utc>,
}

fn invalid_email(message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: "email".into(),
        message: message.into(),
    }
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid_email("Please enter a valid email address"))?;
    let domain_ok = domain
        .split('.')
        .filter(|label| !label.is_empty())
        .count()
        >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(invalid_email("Please enter a valid email address"));
    }
    Ok(())
}

/// Everyone invited, pending or active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuddyList {
    buddies: Vec<Buddy>,
}

impl BuddyList {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, email: &str) -> Option<usize> {
        self.buddies
            .iter()
            .position(|b| b.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Add a pending buddy. An empty message uses [`DEFAULT_INVITE_MESSAGE`].
    pub fn invite(&mut self, email: &str, message: Option<&str>) -> Result<&Buddy, ValidationError> {
        let email = email.trim();
        check_email(email)?;
        if self.position(email).is_some() {
            return Err(invalid_email(format!("{email} has already been invited")));
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        let invite_message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_INVITE_MESSAGE)
            .to_string();

        self.buddies.push(Buddy {
            id: Uuid::new_v4(),
            name,
            email: email.to_string(),
            status: BuddyStatus::Pending,
            invite_message,
            invited_at: Utc::now(),
        });
        tracing::info!(email, "Invitation sent");
        let last = self.buddies.len() - 1;
        Ok(&self.buddies[last])
    }

    pub fn accept(&mut self, email: &str) -> Result<&Buddy, ValidationError> {
        let idx = self
            .position(email)
            .ok_or_else(|| invalid_email(format!("no buddy with email {email}")))?;
        self.buddies[idx].status = BuddyStatus::Active;
        Ok(&self.buddies[idx])
    }

    pub fn remove(&mut self, email: &str) -> Option<Buddy> {
        self.position(email).map(|idx| self.buddies.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buddy> {
        self.buddies.iter()
    }

    pub fn active(&self) -> impl Iterator<Item = &Buddy> {
        self.buddies
            .iter()
            .filter(|b| b.status == BuddyStatus::Active)
    }

    pub fn len(&self) -> usize {
        self.buddies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buddies.is_empty()
    }

    pub fn load(db: &Database) -> Result<Self, CoreError> {
        load_json(db, BUDDIES_KEY)
    }

    pub fn save(&self, db: &Database) -> Result<(), CoreError> {
        save_json(db, BUDDIES_KEY, self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    GoalAchieved,
    ImpulseBypass,
    WeeklySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            date: Utc::now(),
            read: false,
        }
    }
}

/// Most recent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFeed {
    items: VecDeque<Notification>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) -> &Notification {
        self.items.push_front(notification);
        &self.items[0]
    }

    /// Returns false for an unknown id.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn load(db: &Database) -> Result<Self, CoreError> {
        load_json(db, NOTIFICATIONS_KEY)
    }

    pub fn save(&self, db: &Database) -> Result<(), CoreError> {
        save_json(db, NOTIFICATIONS_KEY, self)
    }
}

/// Notification telling buddies that `name` skipped the rest of a timer.
pub fn bypass_notification(name: &str, result: &ReflectionResult) -> Notification {
    let purchase = &result.purchase;
    Notification::new(
        NotificationKind::ImpulseBypass,
        format!(
            "{name} bypassed an impulse timer for \"{} - ${:.2}\"",
            purchase.name(),
            purchase.price()
        ),
    )
}

/// Persist a finished reflection. A bypass also notifies buddies unless the
/// user stopped sharing impulse purchases; returns the notification written.
pub fn record_decision(
    db: &Database,
    config: &Config,
    result: &ReflectionResult,
) -> Result<Option<Notification>, CoreError> {
    db.record_result(result)?;
    if result.outcome != Outcome::Purchased {
        return Ok(None);
    }
    if !config.privacy.shares(NotificationKind::ImpulseBypass) {
        tracing::debug!("Impulse purchase sharing is off, no buddy notification");
        return Ok(None);
    }

    let notification = bypass_notification(&config.profile.display_name, result);
    let mut feed = NotificationFeed::load(db)?;
    feed.push(notification.clone());
    feed.save(db)?;
    Ok(Some(notification))
}

fn load_json<T>(db: &Database, key: &str) -> Result<T, CoreError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match db.kv_get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

fn save_json<T: Serialize>(db: &Database, key: &str, value: &T) -> Result<(), CoreError> {
    db.kv_set(key, &serde_json::to_string(value)?)?;
    Ok(())
}
