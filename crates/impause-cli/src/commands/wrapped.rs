use std::path::PathBuf;

use clap::Subcommand;
use impause_core::wrapped::{
    wrap, AnalysisClient, FinanceAnalysis, Slide, SlideDeck, Timeframe, WrappedView,
};
use impause_core::storage::ProfileConfig;
use impause_core::{Config, Database};

use super::{http_client, CmdResult};

const LAST_ANALYSIS_KEY: &str = "last_analysis";

#[derive(Subcommand)]
pub enum WrappedAction {
    /// Upload bank statements for analysis and show the recap
    Upload {
        /// Statement files (CSV or PDF)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "weekly")]
        timeframe: Timeframe,
        /// Only print slide N (1-based)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        slide: Option<u16>,
        /// Output the view model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the recap of the last uploaded statements
    Show {
        #[arg(long, default_value = "weekly")]
        timeframe: Timeframe,
        /// Only print slide N (1-based)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        slide: Option<u16>,
        /// Output the view model as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: WrappedAction) -> CmdResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    match action {
        WrappedAction::Upload {
            files,
            timeframe,
            slide,
            json,
        } => {
            let client = AnalysisClient::new(http_client(&config)?, config.endpoints.analysis_url);
            let analysis = client.upload(&files).await?;
            db.kv_set(LAST_ANALYSIS_KEY, &serde_json::to_string(&analysis)?)?;
            present(&wrap(&analysis, timeframe), slide, json, &config.profile)
        }
        WrappedAction::Show {
            timeframe,
            slide,
            json,
        } => {
            let view = match db.kv_get(LAST_ANALYSIS_KEY)? {
                Some(raw) => wrap(&FinanceAnalysis::from_json(&raw)?, timeframe),
                None => WrappedView::placeholder(timeframe),
            };
            present(&view, slide, json, &config.profile)
        }
    }
}

fn present(
    view: &WrappedView,
    slide: Option<u16>,
    json: bool,
    profile: &ProfileConfig,
) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    let mut deck = view.deck();
    if let Some(n) = slide {
        // Past the end shows the last slide.
        deck.go_to(usize::from(n) - 1);
        print_slide(view, &deck, profile);
        return Ok(());
    }
    loop {
        print_slide(view, &deck, profile);
        if !deck.next_slide() {
            break;
        }
    }
    Ok(())
}

fn print_slide(view: &WrappedView, deck: &SlideDeck, profile: &ProfileConfig) {
    let Some(slide) = deck.current() else { return };
    println!(
        "── {} ({}/{}, {:.0}%) ──",
        slide.title(),
        deck.index() + 1,
        deck.len(),
        deck.progress()
    );
    for line in render(view, slide, profile) {
        println!("  {line}");
    }
    println!();
}

fn render(view: &WrappedView, slide: Slide, profile: &ProfileConfig) -> Vec<String> {
    let base = view.base();
    match (slide, view) {
        (Slide::SpendingSummary, _) => vec![format!("{}: {} spent", base.period, base.total)],
        (Slide::CategoryBreakdown, _) => base
            .categories
            .iter()
            .map(|c| {
                format!(
                    "{} {:<20} {:>10} {:>5.1}%",
                    c.emoji,
                    c.name,
                    profile.money(c.amount),
                    c.percentage
                )
            })
            .collect(),
        (Slide::Subscription, _) => {
            let subs = &base.subscriptions;
            let mut lines = vec![format!(
                "{} active, {} total",
                subs.count,
                profile.money(subs.total)
            )];
            if let Some(pct) = subs.total_percentage {
                lines.push(format!("{pct}% of spending"));
            }
            lines.extend(
                subs.top
                    .iter()
                    .take(3)
                    .map(|s| format!("{:<20} {:>10}", s.name, profile.money(s.amount))),
            );
            lines
        }
        (Slide::TopPurchase, WrappedView::Weekly(v)) => match &v.top_purchase {
            Some(p) => vec![format!("{} {} at {}", p.emoji, p.amount, p.merchant)],
            None => vec!["No standout purchase".into()],
        },
        (Slide::ImpulseSpend, WrappedView::Weekly(v)) => {
            vec![format!("{} impulse purchases", v.impulse_count)]
        }
        (Slide::ImpulseSpend, WrappedView::Monthly(v)) => vec![format!(
            "{} paused, {} saved",
            v.impulse_stats.paused,
            profile.money(v.impulse_stats.saved)
        )],
        (Slide::ImpulseSpend, WrappedView::Yearly(v)) => vec![format!(
            "{} impulse wins, {} saved",
            v.impulse_wins.count,
            profile.money(v.impulse_wins.saved)
        )],
        (Slide::GoalProgress, WrappedView::Weekly(v)) => vec![format!(
            "{} {}: {}%",
            v.goal_progress.emoji, v.goal_progress.name, v.goal_progress.progress
        )],
        (Slide::MoneyMood, WrappedView::Weekly(v)) => {
            vec![format!("{} {}", v.money_mood.emoji, v.money_mood.kind)]
        }
        (Slide::MoneyMood, WrappedView::Yearly(v)) => vec![v.money_persona.clone()],
        (Slide::TopMerchants, WrappedView::Monthly(v)) => v
            .top_merchants
            .iter()
            .map(|m| format!("{:<20} {:>10}  {}", m.name, profile.money(m.amount), m.category))
            .collect(),
        (Slide::Highlight, WrappedView::Monthly(v)) => vec![v.highlight.clone()],
        (Slide::FavoriteStore, WrappedView::Yearly(v)) => match &v.favorite_store {
            Some(s) => vec![format!("{} {} ({} visits)", s.emoji, s.name, s.visits)],
            None => vec!["No favourite store yet".into()],
        },
        (Slide::ImprovedHabit, WrappedView::Yearly(v)) => vec![format!(
            "{}: down {}%",
            v.improved_habit.category, v.improved_habit.reduction
        )],
        (Slide::BuddyHighlight, WrappedView::Yearly(v)) => vec![format!(
            "{} kept you on track {} times",
            v.buddy_highlight.name, v.buddy_highlight.count
        )],
        (Slide::StatsOverview, WrappedView::Monthly(v)) => vec![
            format!("Total: {}", base.total),
            format!("Saved: {}", profile.money(v.savings)),
            format!("{}% {}", v.comparison.percentage, v.comparison.text),
            format!("Score: {}", v.score),
        ],
        (Slide::StatsOverview, _) => vec![
            format!("Total: {}", base.total),
            format!("{} categories", base.categories.len()),
            format!("{} subscriptions", base.subscriptions.count),
        ],
        _ => Vec::new(),
    }
}
