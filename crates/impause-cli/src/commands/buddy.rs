use clap::Subcommand;
use impause_core::accountability::{BuddyList, BuddyStatus, NotificationFeed};
use impause_core::{Config, Database};
use uuid::Uuid;

use super::CmdResult;

#[derive(Subcommand)]
pub enum BuddyAction {
    /// Invite someone to be your accountability buddy
    Invite {
        email: String,
        /// Personal message (a friendly default is used otherwise)
        #[arg(long)]
        message: Option<String>,
    },
    /// List buddies
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an invitation as accepted
    Accept { email: String },
    /// Remove a buddy
    Remove { email: String },
    /// Show notifications
    Notifications {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark notifications as read
    Read {
        /// Notification id; omit to mark everything read
        id: Option<Uuid>,
    },
}

pub fn run(action: BuddyAction) -> CmdResult {
    let db = Database::open()?;
    match action {
        BuddyAction::Invite { email, message } => {
            let mut buddies = BuddyList::load(&db)?;
            let buddy = buddies.invite(&email, message.as_deref())?;
            println!("Invitation sent to {}", buddy.email);
            println!("  \"{}\"", buddy.invite_message);
            buddies.save(&db)?;
        }
        BuddyAction::List { json } => {
            let buddies = BuddyList::load(&db)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&buddies)?);
            } else if buddies.is_empty() {
                println!("No buddies yet. Invite one with `impause-cli buddy invite <email>`.");
            } else {
                for buddy in buddies.iter() {
                    let status = match buddy.status {
                        BuddyStatus::Active => "active",
                        BuddyStatus::Pending => "pending",
                    };
                    println!("{:<20} {:<32} {status}", buddy.name, buddy.email);
                }
            }
        }
        BuddyAction::Accept { email } => {
            let mut buddies = BuddyList::load(&db)?;
            let name = buddies.accept(&email)?.name.clone();
            buddies.save(&db)?;
            println!("{name} is now an active buddy");
        }
        BuddyAction::Remove { email } => {
            let mut buddies = BuddyList::load(&db)?;
            match buddies.remove(&email) {
                Some(buddy) => {
                    buddies.save(&db)?;
                    println!("Removed {}", buddy.email);
                }
                None => return Err(format!("no buddy with email {email}").into()),
            }
        }
        BuddyAction::Notifications { json } => {
            let feed = NotificationFeed::load(&db)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else if feed.is_empty() {
                println!("No notifications.");
            } else {
                let settings = Config::load_or_default().notifications;
                println!("{} unread", feed.unread_count());
                let mut hidden = 0;
                for n in feed.iter() {
                    if !settings.shows(n.kind) {
                        hidden += 1;
                        continue;
                    }
                    let dot = if n.read { " " } else { "*" };
                    println!(
                        "{dot} {}  {}  {}",
                        n.date.format("%b %e, %H:%M"),
                        n.message,
                        n.id
                    );
                }
                if hidden > 0 {
                    println!("({hidden} hidden by notification settings)");
                }
            }
        }
        BuddyAction::Read { id } => {
            let mut feed = NotificationFeed::load(&db)?;
            match id {
                Some(id) => {
                    if !feed.mark_read(id) {
                        return Err(format!("no notification with id {id}").into());
                    }
                }
                None => feed.mark_all_read(),
            }
            feed.save(&db)?;
            println!("ok");
        }
    }
    Ok(())
}
