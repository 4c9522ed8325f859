//! Per-timeframe "wrapped" view models and their slide decks.
//!
//! Fields the analysis service does not supply yet (impulse counts, mood,
//! persona) are filled with fixed placeholders.

use serde::Serialize;

use super::analysis::{FavoriteStore, FinanceAnalysis, Timeframe, TopCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
    pub color: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionLine {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionsView {
    pub count: u32,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_percentage: Option<f64>,
    pub top: Vec<SubscriptionLine>,
}

/// Fields every timeframe shares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedBase {
    pub period: String,
    /// Preformatted total, currency included.
    pub total: String,
    pub categories: Vec<CategoryView>,
    pub subscriptions: SubscriptionsView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPurchaseView {
    /// Currency symbol followed by the amount.
    pub amount: String,
    pub merchant: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub progress: u32,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyMood {
    #[serde(rename = "type")]
    pub kind: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyView {
    #[serde(flatten)]
    pub base: WrappedBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_purchase: Option<TopPurchaseView>,
    pub impulse_count: u32,
    pub goal_progress: GoalProgress,
    pub money_mood: MoneyMood,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantLine {
    pub name: String,
    pub amount: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseStats {
    pub paused: u32,
    pub saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub percentage: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyView {
    #[serde(flatten)]
    pub base: WrappedBase,
    pub top_merchants: Vec<MerchantLine>,
    pub impulse_stats: ImpulseStats,
    pub savings: f64,
    pub comparison: Comparison,
    pub score: u32,
    pub highlight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseWins {
    pub count: u32,
    pub saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovedHabit {
    pub category: String,
    pub reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuddyHighlight {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyView {
    #[serde(flatten)]
    pub base: WrappedBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_category: Option<TopCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_store: Option<FavoriteStore>,
    pub impulse_wins: ImpulseWins,
    pub savings_growth: f64,
    pub money_persona: String,
    pub improved_habit: ImprovedHabit,
    pub buddy_highlight: BuddyHighlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "timeframe", rename_all = "lowercase")]
pub enum WrappedView {
    Weekly(WeeklyView),
    Monthly(MonthlyView),
    Yearly(YearlyView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slide {
    SpendingSummary,
    CategoryBreakdown,
    TopPurchase,
    TopMerchants,
    ImpulseSpend,
    Subscription,
    GoalProgress,
    MoneyMood,
    Highlight,
    FavoriteStore,
    ImprovedHabit,
    BuddyHighlight,
    StatsOverview,
}

impl Slide {
    pub fn title(self) -> &'static str {
        match self {
            Slide::SpendingSummary => "Spending Summary",
            Slide::CategoryBreakdown => "Where Your Money Went",
            Slide::TopPurchase => "Top Purchase",
            Slide::TopMerchants => "Top Merchants",
            Slide::ImpulseSpend => "Impulse Control",
            Slide::Subscription => "Subscriptions",
            Slide::GoalProgress => "Goal Progress",
            Slide::MoneyMood => "Money Mood",
            Slide::Highlight => "Highlight",
            Slide::FavoriteStore => "Favorite Store",
            Slide::ImprovedHabit => "Most Improved Habit",
            Slide::BuddyHighlight => "Buddy Highlight",
            Slide::StatsOverview => "Stats Overview",
        }
    }
}

const WEEKLY_SLIDES: &[Slide] = &[
    Slide::SpendingSummary,
    Slide::CategoryBreakdown,
    Slide::TopPurchase,
    Slide::ImpulseSpend,
    Slide::Subscription,
    Slide::GoalProgress,
    Slide::MoneyMood,
    Slide::StatsOverview,
];

const MONTHLY_SLIDES: &[Slide] = &[
    Slide::SpendingSummary,
    Slide::CategoryBreakdown,
    Slide::TopMerchants,
    Slide::ImpulseSpend,
    Slide::Subscription,
    Slide::Highlight,
    Slide::StatsOverview,
];

const YEARLY_SLIDES: &[Slide] = &[
    Slide::SpendingSummary,
    Slide::CategoryBreakdown,
    Slide::Subscription,
    Slide::FavoriteStore,
    Slide::ImpulseSpend,
    Slide::ImprovedHabit,
    Slide::MoneyMood,
    Slide::BuddyHighlight,
    Slide::StatsOverview,
];

fn base(analysis: &FinanceAnalysis, timeframe: Timeframe) -> WrappedBase {
    let palette = timeframe.palette();
    let categories = analysis
        .category_breakdown
        .iter()
        .enumerate()
        .map(|(i, c)| CategoryView {
            name: c.name.clone(),
            amount: c.amount,
            percentage: c.percentage,
            color: c
                .color
                .clone()
                .unwrap_or_else(|| palette[i % palette.len()].to_string()),
            emoji: c.emoji.clone(),
        })
        .collect();

    let subs = &analysis.subscriptions;
    WrappedBase {
        period: analysis.period.clone(),
        total: analysis.formatted_total.clone(),
        categories,
        subscriptions: SubscriptionsView {
            count: subs.count,
            total: subs.total,
            total_percentage: subs.total_percentage,
            top: subs
                .list
                .iter()
                .map(|s| SubscriptionLine {
                    name: s.name.clone(),
                    amount: s.amount,
                })
                .collect(),
        },
    }
}

/// Build the view model for `timeframe` from a validated analysis.
pub fn wrap(analysis: &FinanceAnalysis, timeframe: Timeframe) -> WrappedView {
    let base = base(analysis, timeframe);
    let savings = analysis.savings.unwrap_or(0.0);

    match timeframe {
        Timeframe::Weekly => WrappedView::Weekly(WeeklyView {
            base,
            top_purchase: analysis.top_purchase.as_ref().map(|p| TopPurchaseView {
                amount: format!("{}{}", analysis.currency, p.amount),
                merchant: p.merchant.clone(),
                emoji: p.emoji.clone(),
            }),
            impulse_count: 0,
            goal_progress: savings_goal_placeholder(),
            money_mood: MoneyMood {
                kind: "Balanced".into(),
                emoji: "⚖️".into(),
            },
        }),
        Timeframe::Monthly => WrappedView::Monthly(MonthlyView {
            base,
            top_merchants: analysis
                .top_merchants
                .iter()
                .map(|m| MerchantLine {
                    name: m.name.clone(),
                    amount: m.amount,
                    category: m.category.clone(),
                })
                .collect(),
            impulse_stats: ImpulseStats { paused: 0, saved: savings },
            savings,
            comparison: last_month_comparison(),
            score: 0,
            highlight: analysis
                .highlight
                .clone()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "No highlight available".into()),
        }),
        Timeframe::Yearly => WrappedView::Yearly(YearlyView {
            base,
            top_category: analysis.top_category.clone(),
            favorite_store: analysis.favorite_store.clone(),
            impulse_wins: ImpulseWins { count: 0, saved: savings },
            savings_growth: 0.0,
            money_persona: "The Balanced Spender".into(),
            improved_habit: ImprovedHabit {
                category: "Overall Spending".into(),
                reduction: 0.0,
            },
            buddy_highlight: finance_app_buddy(),
        }),
    }
}

fn savings_goal_placeholder() -> GoalProgress {
    GoalProgress {
        name: "Savings Goal".into(),
        progress: 0,
        emoji: "💰".into(),
    }
}

fn last_month_comparison() -> Comparison {
    Comparison {
        percentage: 0.0,
        text: "compared to last month".into(),
    }
}

fn finance_app_buddy() -> BuddyHighlight {
    BuddyHighlight {
        name: "Finance App".into(),
        count: 0,
    }
}

fn empty_base(period: &str) -> WrappedBase {
    WrappedBase {
        period: period.into(),
        total: "$0.00".into(),
        categories: Vec::new(),
        subscriptions: SubscriptionsView {
            count: 0,
            total: 0.0,
            total_percentage: None,
            top: Vec::new(),
        },
    }
}

impl WrappedView {
    /// What to show before any statement has been analysed.
    pub fn placeholder(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Weekly => WrappedView::Weekly(WeeklyView {
                base: empty_base("This Week"),
                top_purchase: Some(TopPurchaseView {
                    amount: "$0".into(),
                    merchant: "None".into(),
                    emoji: "💸".into(),
                }),
                impulse_count: 0,
                goal_progress: savings_goal_placeholder(),
                money_mood: MoneyMood {
                    kind: "Unknown".into(),
                    emoji: "❓".into(),
                },
            }),
            Timeframe::Monthly => WrappedView::Monthly(MonthlyView {
                base: empty_base("This Month"),
                top_merchants: Vec::new(),
                impulse_stats: ImpulseStats { paused: 0, saved: 0.0 },
                savings: 0.0,
                comparison: last_month_comparison(),
                score: 0,
                highlight: "Upload your bank statements to see insights".into(),
            }),
            Timeframe::Yearly => {
                let mut base = empty_base("This Year");
                base.subscriptions.total_percentage = Some(0.0);
                WrappedView::Yearly(YearlyView {
                    base,
                    top_category: Some(TopCategory {
                        name: "Unknown".into(),
                        amount: 0.0,
                        emoji: "❓".into(),
                    }),
                    favorite_store: Some(FavoriteStore {
                        name: "Unknown".into(),
                        visits: 0,
                        emoji: "❓".into(),
                    }),
                    impulse_wins: ImpulseWins { count: 0, saved: 0.0 },
                    savings_growth: 0.0,
                    money_persona: "Unknown".into(),
                    improved_habit: ImprovedHabit {
                        category: "Unknown".into(),
                        reduction: 0.0,
                    },
                    buddy_highlight: finance_app_buddy(),
                })
            }
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        match self {
            WrappedView::Weekly(_) => Timeframe::Weekly,
            WrappedView::Monthly(_) => Timeframe::Monthly,
            WrappedView::Yearly(_) => Timeframe::Yearly,
        }
    }

    pub fn base(&self) -> &WrappedBase {
        match self {
            WrappedView::Weekly(v) => &v.base,
            WrappedView::Monthly(v) => &v.base,
            WrappedView::Yearly(v) => &v.base,
        }
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &'static [Slide] {
        match self {
            WrappedView::Weekly(_) => WEEKLY_SLIDES,
            WrappedView::Monthly(_) => MONTHLY_SLIDES,
            WrappedView::Yearly(_) => YEARLY_SLIDES,
        }
    }

    pub fn deck(&self) -> SlideDeck {
        SlideDeck::new(self.slides())
    }
}

/// Cursor over a slide list. Navigation clamps at both ends.
#[derive(Debug, Clone)]
pub struct SlideDeck {
    slides: &'static [Slide],
    current: usize,
}

impl SlideDeck {
    pub fn new(slides: &'static [Slide]) -> Self {
        Self { slides, current: 0 }
    }

    pub fn current(&self) -> Option<Slide> {
        self.slides.get(self.current).copied()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Returns false when already on the last slide.
    pub fn next_slide(&mut self) -> bool {
        if self.current + 1 < self.slides.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Jump to `index`, clamped to the last slide.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.slides.len().saturating_sub(1));
    }

    /// Percent through the deck; 100 on the last slide.
    pub fn progress(&self) -> f64 {
        if self.slides.len() <= 1 {
            return 100.0;
        }
        self.current as f64 / (self.slides.len() - 1) as f64 * 100.0
    }
}
