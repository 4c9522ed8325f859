//! Spending "wrapped" recaps built from analysed bank statements.

mod analysis;
mod client;
mod view;

pub use analysis::{
    CategorySpend, FavoriteStore, FinanceAnalysis, Merchant, Subscription, Subscriptions,
    Timeframe, TopCategory, TopPurchase, Transaction,
};
pub use client::AnalysisClient;
pub use view::{
    wrap, BuddyHighlight, CategoryView, Comparison, GoalProgress, ImprovedHabit, ImpulseStats,
    ImpulseWins, MerchantLine, MoneyMood, MonthlyView, Slide, SlideDeck, SubscriptionLine,
    SubscriptionsView, TopPurchaseView, WeeklyView, WrappedBase, WrappedView, YearlyView,
};
