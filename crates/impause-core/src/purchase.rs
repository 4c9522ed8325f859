//! Purchase intake.
//!
//! A [`PurchaseDraft`] is whatever the user typed; [`Purchase::from_draft`]
//! validates it and produces the immutable value the reflection timer holds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationError};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_REASON_CHARS: usize = 5;
pub const NEED_SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Fixed set of spending categories offered at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Electronics")]
    Electronics,
    #[serde(rename = "Fashion")]
    Fashion,
    #[serde(rename = "Home & Garden")]
    HomeAndGarden,
    #[serde(rename = "Beauty & Personal Care")]
    BeautyAndPersonalCare,
    #[serde(rename = "Sports & Outdoors")]
    SportsAndOutdoors,
    #[serde(rename = "Books & Entertainment")]
    BooksAndEntertainment,
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Digital Services")]
    DigitalServices,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Electronics,
        Category::Fashion,
        Category::HomeAndGarden,
        Category::BeautyAndPersonalCare,
        Category::SportsAndOutdoors,
        Category::BooksAndEntertainment,
        Category::FoodAndDining,
        Category::Travel,
        Category::DigitalServices,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Fashion => "Fashion",
            Category::HomeAndGarden => "Home & Garden",
            Category::BeautyAndPersonalCare => "Beauty & Personal Care",
            Category::SportsAndOutdoors => "Sports & Outdoors",
            Category::BooksAndEntertainment => "Books & Entertainment",
            Category::FoodAndDining => "Food & Dining",
            Category::Travel => "Travel",
            Category::DigitalServices => "Digital Services",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Accepts the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownCategory(wanted.to_string()))
    }
}

/// Snapshot of a savings goal the purchase would compete with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub name: String,
    pub current: f64,
    pub target: f64,
}

/// A validated candidate purchase. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    name: String,
    price: f64,
    category: Category,
    reason: String,
    need_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hourly_wage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    savings_goal: Option<SavingsGoal>,
}

/// Raw intake form values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDraft {
    pub name: String,
    pub price: f64,
    /// Category label as entered; empty means nothing was selected.
    pub category: String,
    pub reason: String,
    pub need_score: u8,
    pub hourly_wage: Option<f64>,
    pub savings_goal: Option<SavingsGoal>,
}

impl Purchase {
    /// Validate a draft. All failing fields are reported together.
    pub fn from_draft(draft: PurchaseDraft) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        let mut reject = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            })
        };

        let name = draft.name.trim().to_string();
        if name.chars().count() < MIN_NAME_CHARS {
            reject("name", "Item name must be at least 2 characters.");
        }

        if !(draft.price.is_finite() && draft.price > 0.0) {
            reject("price", "Price must be a positive number.");
        }

        let category = if draft.category.trim().is_empty() {
            reject("category", "Please select a category.");
            None
        } else {
            match draft.category.parse::<Category>() {
                Ok(c) => Some(c),
                Err(e) => {
                    reject("category", &e.to_string());
                    None
                }
            }
        };

        let reason = draft.reason.trim().to_string();
        if reason.chars().count() < MIN_REASON_CHARS {
            reject("reason", "Please provide a reason for this purchase.");
        }

        if !NEED_SCORE_RANGE.contains(&draft.need_score) {
            reject("need_score", "Need score must be between 1 and 10.");
        }

        if let Some(wage) = draft.hourly_wage {
            if !(wage.is_finite() && wage > 0.0) {
                reject("hourly_wage", "Hourly wage must be a positive number.");
            }
        }

        if let Some(goal) = &draft.savings_goal {
            if goal.name.trim().is_empty() {
                reject("savings_goal.name", "Savings goal needs a name.");
            }
            if !(goal.current.is_finite() && goal.current >= 0.0) {
                reject("savings_goal.current", "Current savings cannot be negative.");
            }
            if !(goal.target.is_finite() && goal.target > 0.0) {
                reject("savings_goal.target", "Savings target must be a positive number.");
            }
        }

        match category {
            Some(category) if errors.is_empty() => Ok(Self {
                name,
                price: draft.price,
                category,
                reason,
                need_score: draft.need_score,
                hourly_wage: draft.hourly_wage,
                savings_goal: draft.savings_goal.map(|g| SavingsGoal {
                    name: g.name.trim().to_string(),
                    ..g
                }),
            }),
            _ => Err(ValidationError::Purchase(errors)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn need_score(&self) -> u8 {
        self.need_score
    }

    pub fn hourly_wage(&self) -> Option<f64> {
        self.hourly_wage
    }

    pub fn savings_goal(&self) -> Option<&SavingsGoal> {
        self.savings_goal.as_ref()
    }

    /// Hours of work the price represents, when a wage was given.
    pub fn hours_of_work(&self) -> Option<f64> {
        self.hourly_wage.map(|wage| self.price / wage)
    }

    /// How far along the savings goal currently is, rounded to a whole percent.
    pub fn savings_percentage(&self) -> Option<u32> {
        self.savings_goal
            .as_ref()
            .map(|g| (g.current / g.target * 100.0).round() as u32)
    }
}
