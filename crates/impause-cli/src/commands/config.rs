use clap::Subcommand;
use impause_core::Config;

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot-path key, see `config keys`
        key: String,
    },
    /// Change one value and save
    ///
    /// Examples: `reflection.default_preset 1h`, `profile.hourly_wage 27.5`,
    /// `profile.currency eur`, `privacy.share_impulse_purchases false`.
    Set {
        key: String,
        /// "none" clears an optional value such as profile.hourly_wage
        value: String,
    },
    /// Print the whole configuration as JSON
    List,
    /// Print every valid key with its current value
    Keys,
    /// Restore defaults, for one section or everything
    Reset {
        /// reflection, endpoints, http, profile, notifications or privacy
        section: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> CmdResult {
    // Works even when the file on disk no longer parses.
    if matches!(action, ConfigAction::Reset { section: None }) {
        Config::default().save()?;
        println!("config reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => {
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key} (see `impause-cli config keys`)"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            if let Some(now) = config.get(&key) {
                println!("{key} = {now}");
            }
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Keys => {
            let keys = config.keys();
            let width = keys.iter().map(String::len).max().unwrap_or(0);
            for key in keys {
                let value = config.get(&key).unwrap_or_default();
                println!("{key:<width$}  {value}");
            }
        }
        ConfigAction::Reset { section } => {
            let section = section.unwrap_or_default();
            config.reset_section(&section)?;
            config.save()?;
            println!("{section} reset to defaults");
        }
    }
    Ok(())
}
