use clap::Args;
use impause_core::{Config, Database, Outcome};

use super::CmdResult;

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show the most recent N decisions
    #[arg(long)]
    limit: Option<usize>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs) -> CmdResult {
    let db = Database::open()?;
    let profile = Config::load_or_default().profile;
    let ledger = db.load_ledger()?;
    let limit = args.limit.unwrap_or(usize::MAX);

    if args.json {
        let entries: Vec<_> = ledger.iter().take(limit).collect();
        let out = serde_json::json!({
            "entries": entries,
            "summary": ledger.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if ledger.is_empty() {
        println!("No decisions yet. Try `impause-cli reflect`.");
        return Ok(());
    }

    for entry in ledger.iter().take(limit) {
        let mark = match entry.outcome {
            Outcome::Purchased => "bought ",
            Outcome::Declined => "skipped",
        };
        println!(
            "{}  {mark}  {:<24} {:>10}  {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.purchase.name(),
            profile.money(entry.purchase.price()),
            entry.purchase.category(),
        );
        if let Some(notes) = &entry.reflection_notes {
            println!("                    \"{notes}\"");
        }
    }

    let summary = ledger.summary();
    println!();
    println!(
        "{} skipped, {} bought; saved {}, spent {}",
        summary.declined,
        summary.purchased,
        profile.money(summary.amount_saved),
        profile.money(summary.amount_spent),
    );
    Ok(())
}
