//! Decision ledger: every finished reflection, most recent first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::purchase::Purchase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Purchased,
    Declined,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Purchased => "purchased",
            Outcome::Declined => "declined",
        }
    }
}

/// A completed decision. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionResult {
    pub id: Uuid,
    pub purchase: Purchase,
    pub date: DateTime<Utc>,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection_notes: Option<String>,
}

impl ReflectionResult {
    pub fn new(purchase: Purchase, outcome: Outcome, reflection_notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            purchase,
            date: Utc::now(),
            outcome,
            reflection_notes,
        }
    }
}

/// Totals shown next to the history list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub purchased: usize,
    pub declined: usize,
    /// Money kept by declining.
    pub amount_saved: f64,
    pub amount_spent: f64,
}

/// Append-only, most-recent-first list of [`ReflectionResult`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionLedger {
    entries: VecDeque<ReflectionResult>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from entries already ordered most recent first.
    pub fn from_recent_first(entries: Vec<ReflectionResult>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn record(&mut self, result: ReflectionResult) -> &ReflectionResult {
        self.entries.push_front(result);
        &self.entries[0]
    }

    pub fn first(&self) -> Option<&ReflectionResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReflectionResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> LedgerSummary {
        self.entries
            .iter()
            .fold(LedgerSummary::default(), |mut acc, r| {
                match r.outcome {
                    Outcome::Purchased => {
                        acc.purchased += 1;
                        acc.amount_spent += r.purchase.price();
                    }
                    Outcome::Declined => {
                        acc.declined += 1;
                        acc.amount_saved += r.purchase.price();
                    }
                }
                acc
            })
    }
}
