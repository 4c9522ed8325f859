//! Statement analysis payload as returned by the analysis service.
//!
//! Parsed once at the boundary and validated; everything downstream works on
//! typed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Weekly,
    Monthly,
    Yearly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Weekly, Timeframe::Monthly, Timeframe::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::Yearly => "yearly",
        }
    }

    /// Gradient classes assigned, in order, to categories without a colour.
    pub fn palette(self) -> &'static [&'static str; 5] {
        match self {
            Timeframe::Weekly => &[
                "from-pink-500 to-orange-500",
                "from-purple-500 to-indigo-500",
                "from-green-500 to-emerald-500",
                "from-blue-500 to-cyan-500",
                "from-yellow-500 to-amber-500",
            ],
            Timeframe::Monthly => &[
                "from-orange-500 to-red-500",
                "from-blue-500 to-indigo-500",
                "from-green-500 to-teal-500",
                "from-purple-500 to-pink-500",
                "from-yellow-500 to-amber-500",
            ],
            Timeframe::Yearly => &[
                "from-teal-500 to-green-500",
                "from-pink-500 to-purple-500",
                "from-blue-500 to-cyan-500",
                "from-orange-500 to-amber-500",
                "from-indigo-500 to-violet-500",
            ],
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "timeframe".into(),
                message: format!("'{s}' is not one of weekly, monthly, yearly"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub visits: u32,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub amount: f64,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriptions {
    pub count: u32,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_percentage: Option<f64>,
    pub list: Vec<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPurchase {
    pub amount: f64,
    pub merchant: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub name: String,
    pub amount: f64,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteStore {
    pub name: String,
    pub visits: u32,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceAnalysis {
    pub period: String,
    pub total_spend: f64,
    pub formatted_total: String,
    pub currency: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub category_breakdown: Vec<CategorySpend>,
    #[serde(default)]
    pub top_merchants: Vec<Merchant>,
    pub subscriptions: Subscriptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_purchase: Option<TopPurchase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_category: Option<TopCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_store: Option<FavoriteStore>,
}

fn non_negative(field: &str, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::Malformed(format!(
            "{field} must be a non-negative amount, got {value}"
        )))
    }
}

fn percentage(field: &str, value: f64) -> Result<(), AnalysisError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::Malformed(format!(
            "{field} must be within 0..=100, got {value}"
        )))
    }
}

impl FinanceAnalysis {
    /// Parse and validate a raw JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, AnalysisError> {
        let analysis: Self =
            serde_json::from_str(raw).map_err(|e| AnalysisError::Malformed(e.to_string()))?;
        analysis.validate()?;
        Ok(analysis)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.period.trim().is_empty() {
            return Err(AnalysisError::Malformed("period is empty".into()));
        }
        non_negative("totalSpend", self.total_spend)?;

        for tx in &self.transactions {
            non_negative("transactions.amount", tx.amount)?;
        }
        for category in &self.category_breakdown {
            non_negative("categoryBreakdown.amount", category.amount)?;
            percentage("categoryBreakdown.percentage", category.percentage)?;
        }
        for merchant in &self.top_merchants {
            non_negative("topMerchants.amount", merchant.amount)?;
        }

        let subs = &self.subscriptions;
        non_negative("subscriptions.total", subs.total)?;
        if let Some(pct) = subs.total_percentage {
            percentage("subscriptions.totalPercentage", pct)?;
        }
        for sub in &subs.list {
            non_negative("subscriptions.list.amount", sub.amount)?;
        }
        if subs.list.len() > subs.count as usize {
            return Err(AnalysisError::Malformed(format!(
                "subscriptions.count is {} but {} are listed",
                subs.count,
                subs.list.len()
            )));
        }

        if let Some(top) = &self.top_purchase {
            non_negative("topPurchase.amount", top.amount)?;
        }
        if let Some(savings) = self.savings {
            non_negative("savings", savings)?;
        }
        if let Some(top) = &self.top_category {
            non_negative("topCategory.amount", top.amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) const SAMPLE: &str = r#"{
    "period": "Mar 1 - Mar 7",
    "totalSpend": 412.5,
    "formattedTotal": "$412.50",
    "currency": "$",
    "transactions": [
        {"date": "2024-03-02", "description": "Blue Bottle", "amount": 6.5, "category": "Food", "emoji": "☕"}
    ],
    "categoryBreakdown": [
        {"name": "Food", "amount": 180.0, "percentage": 43.6, "emoji": "🍔"},
        {"name": "Transport", "amount": 90.0, "percentage": 21.8, "color": "from-slate-500 to-gray-500", "emoji": "🚌"},
        {"name": "Shopping", "amount": 60.0, "percentage": 14.5, "emoji": "🛍️"},
        {"name": "Bills", "amount": 40.0, "percentage": 9.7, "emoji": "🧾"},
        {"name": "Fun", "amount": 30.0, "percentage": 7.3, "emoji": "🎉"},
        {"name": "Other", "amount": 12.5, "percentage": 3.0, "emoji": "📦"}
    ],
    "topMerchants": [
        {"name": "Whole Foods", "amount": 120.0, "category": "Food", "visits": 3, "emoji": "🥑"}
    ],
    "subscriptions": {
        "count": 2,
        "total": 25.98,
        "totalPercentage": 6.3,
        "list": [
            {"name": "Netflix", "amount": 15.99, "emoji": "🎬"},
            {"name": "Spotify", "amount": 9.99, "emoji": "🎵"}
        ]
    },
    "topPurchase": {"amount": 89.99, "merchant": "REI", "emoji": "🥾", "date": "2024-03-05"},
    "savings": 120.0,
    "topCategory": {"name": "Food", "amount": 180.0, "emoji": "🍔"},
    "favoriteStore": {"name": "Whole Foods", "visits": 3, "emoji": "🥑"}
}"#;
