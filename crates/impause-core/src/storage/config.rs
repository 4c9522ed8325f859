//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default reflection duration (preset or custom minutes)
//! - Service endpoints (auth, statement analysis, prompt generator)
//! - HTTP client settings
//! - Profile: display name, saved hourly wage, display currency
//! - Which notifications to show and what buddies may see
//!
//! Configuration is stored at `~/.config/impause/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::accountability::NotificationKind;
use crate::error::ConfigError;
use crate::purchase::PurchaseDraft;
use crate::reflection::{DurationPreset, DurationSelection};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectionConfig {
    #[serde(default)]
    pub default_preset: DurationPreset,
    /// Overrides the preset when set.
    #[serde(default)]
    pub custom_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    #[serde(default = "default_analysis_url")]
    pub analysis_url: String,
    #[serde(default = "default_prompts_url")]
    pub prompts_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Used for hours-of-work when a purchase does not give its own wage.
    #[serde(default)]
    pub hourly_wage: Option<f64>,
    /// ISO 4217 code.
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Which notifications are shown. `email` is kept for the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default = "default_true")]
    pub weekly_report: bool,
    #[serde(default = "default_true")]
    pub goal_reminders: bool,
}

/// What accountability buddies get to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyConfig {
    #[serde(default = "default_true")]
    pub share_financial_summary: bool,
    #[serde(default = "default_true")]
    pub share_impulse_purchases: bool,
    #[serde(default = "default_true")]
    pub share_goal_progress: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/impause/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub privacy: PrivacyConfig,
}

// Default functions
fn default_auth_base_url() -> String {
    "https://auth.impause.tech".into()
}
fn default_analysis_url() -> String {
    "http://localhost:8787/api/gemini".into()
}
fn default_prompts_url() -> String {
    "http://localhost:8787/api/reflection-prompts".into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_display_name() -> String {
    "You".into()
}
fn default_currency() -> String {
    "USD".into()
}
fn default_true() -> bool {
    true
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            auth_base_url: default_auth_base_url(),
            analysis_url: default_analysis_url(),
            prompts_url: default_prompts_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            hourly_wage: None,
            currency: default_currency(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            weekly_report: true,
            goal_reminders: true,
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            share_financial_summary: true,
            share_impulse_purchases: true,
            share_goal_progress: true,
        }
    }
}

impl ProfileConfig {
    /// Fill in the saved wage when the draft has none.
    pub fn with_saved_wage(&self, mut draft: PurchaseDraft) -> PurchaseDraft {
        if draft.hourly_wage.is_none() {
            draft.hourly_wage = self.hourly_wage;
        }
        draft
    }

    /// Format an amount in the profile currency.
    pub fn money(&self, amount: f64) -> String {
        match self.currency.as_str() {
            "USD" => format!("${amount:.2}"),
            "EUR" => format!("€{amount:.2}"),
            "GBP" => format!("£{amount:.2}"),
            "JPY" => format!("¥{amount:.0}"),
            code => format!("{amount:.2} {code}"),
        }
    }
}

impl NotificationsConfig {
    pub fn shows(&self, kind: NotificationKind) -> bool {
        self.push
            && match kind {
                NotificationKind::GoalAchieved => self.goal_reminders,
                NotificationKind::WeeklySummary => self.weekly_report,
                NotificationKind::ImpulseBypass => true,
            }
    }
}

impl PrivacyConfig {
    pub fn shares(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::GoalAchieved => self.share_goal_progress,
            NotificationKind::ImpulseBypass => self.share_impulse_purchases,
            NotificationKind::WeeklySummary => self.share_financial_summary,
        }
    }
}

impl HttpConfig {
    /// Build the shared HTTP client for all service calls.
    pub fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                // "none" clears a set optional; required fields reject the null.
                serde_json::Value::Number(_) if value.eq_ignore_ascii_case("none") => {
                    serde_json::Value::Null
                }
                serde_json::Value::Number(n) => {
                    let parsed = if n.is_f64() {
                        parse_float(value)
                    } else {
                        value.parse::<u64>().ok().map(Into::into)
                    };
                    parsed
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                }
                // Unset optional: numbers stay numbers, "none" clears.
                serde_json::Value::Null => {
                    if value.eq_ignore_ascii_case("none") {
                        serde_json::Value::Null
                    } else if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Some(n) = parse_float(value) {
                        serde_json::Value::Number(n)
                    } else {
                        serde_json::Value::String(value.into())
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Range checks serde cannot express.
    fn check(&self, key: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if let Some(wage) = self.profile.hourly_wage {
            if !(wage.is_finite() && wage > 0.0) {
                return Err(invalid("hourly wage must be a positive number"));
            }
        }
        let currency = &self.profile.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid("currency must be a three-letter code such as USD"));
        }
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory. Call `save` to persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let value = if key == "profile.currency" {
            value.to_ascii_uppercase()
        } else {
            value.to_string()
        };
        Self::set_json_value_by_path(&mut json, key, &value)?;
        if key.starts_with("endpoints.") {
            url::Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        }
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.check(key)?;
        *self = updated;
        Ok(())
    }

    /// Every settable dot-path key, sorted.
    pub fn keys(&self) -> Vec<String> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<String>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (name, child) in map {
                        let path = if prefix.is_empty() {
                            name.clone()
                        } else {
                            format!("{prefix}.{name}")
                        };
                        walk(&path, child, out);
                    }
                }
                _ => out.push(prefix.to_string()),
            }
        }
        let mut keys = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut keys);
        }
        keys
    }

    /// Restore one top-level section (e.g. "privacy") to its defaults.
    pub fn reset_section(&mut self, section: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(section.to_string());
        let invalid = |e: serde_json::Error| ConfigError::InvalidValue {
            key: section.to_string(),
            message: e.to_string(),
        };
        let defaults = serde_json::to_value(Config::default()).map_err(invalid)?;
        let fresh = defaults.get(section).cloned().ok_or_else(unknown)?;
        let mut json = serde_json::to_value(&*self).map_err(invalid)?;
        json.as_object_mut()
            .ok_or_else(unknown)?
            .insert(section.to_string(), fresh);
        *self = serde_json::from_value(json).map_err(invalid)?;
        Ok(())
    }

    /// Duration selection a fresh timer starts with.
    pub fn duration_selection(&self) -> DurationSelection {
        DurationSelection {
            preset: self.reflection.default_preset,
            custom_minutes: self.reflection.custom_minutes,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default configuration");
            Self::default()
        })
    }
}

fn parse_float(value: &str) -> Option<serde_json::Number> {
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.endpoints.auth_base_url, "https://auth.impause.tech");
        assert_eq!(parsed.http.timeout_secs, 15);
        assert_eq!(parsed.reflection.default_preset, DurationPreset::FifteenMinutes);
    }

    #[test]
    fn empty_file_gets_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.profile.display_name, "You");
        assert_eq!(parsed.duration_selection().minutes(), 15);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("http.timeout_secs").as_deref(), Some("15"));
        assert_eq!(cfg.get("reflection.default_preset").as_deref(), Some("15m"));
        assert!(cfg.get("http.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("http.timeout_secs", "30").unwrap();
        cfg.set("reflection.default_preset", "1h").unwrap();
        cfg.set("profile.display_name", "Alex").unwrap();
        assert_eq!(cfg.http.timeout_secs, 30);
        assert_eq!(cfg.reflection.default_preset, DurationPreset::OneHour);
        assert_eq!(cfg.profile.display_name, "Alex");
    }

    #[test]
    fn set_custom_minutes_then_clear() {
        let mut cfg = Config::default();
        cfg.set("reflection.custom_minutes", "45").unwrap();
        assert_eq!(cfg.duration_selection().minutes(), 45);
        cfg.set("reflection.custom_minutes", "none").unwrap();
        assert_eq!(cfg.reflection.custom_minutes, None);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("http.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("http.timeout_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("reflection.default_preset", "45m").is_err());
        assert!(cfg.set("endpoints.auth_base_url", "not a url").is_err());
        cfg.set("endpoints.auth_base_url", "http://localhost:9000").unwrap();
        assert_eq!(cfg.endpoints.auth_base_url, "http://localhost:9000");
        assert_eq!(cfg.reflection.default_preset, DurationPreset::FifteenMinutes);
    }

    #[test]
    fn load_from_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.http.timeout_secs, 15);

        let mut cfg = cfg;
        cfg.set("http.timeout_secs", "5").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().http.timeout_secs, 5);
    }

    #[test]
    fn profile_and_privacy_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.profile.hourly_wage, None);
        assert_eq!(cfg.profile.currency, "USD");
        assert!(cfg.privacy.share_impulse_purchases);
        assert!(cfg.privacy.share_goal_progress);
        assert!(cfg.privacy.share_financial_summary);
        assert!(cfg.notifications.push && cfg.notifications.weekly_report);
        assert_eq!(cfg.get("privacy.share_impulse_purchases").as_deref(), Some("true"));
        assert_eq!(cfg.get("profile.hourly_wage").as_deref(), Some("null"));
    }

    #[test]
    fn set_hourly_wage_accepts_decimals_and_clears() {
        let mut cfg = Config::default();
        cfg.set("profile.hourly_wage", "27.5").unwrap();
        assert_eq!(cfg.profile.hourly_wage, Some(27.5));
        cfg.set("profile.hourly_wage", "30").unwrap();
        assert_eq!(cfg.profile.hourly_wage, Some(30.0));
        assert!(cfg.set("profile.hourly_wage", "-4").is_err());
        assert!(cfg.set("profile.hourly_wage", "lots").is_err());
        assert_eq!(cfg.profile.hourly_wage, Some(30.0));
        cfg.set("profile.hourly_wage", "none").unwrap();
        assert_eq!(cfg.profile.hourly_wage, None);
    }

    #[test]
    fn required_numbers_cannot_be_cleared() {
        let mut cfg = Config::default();
        assert!(cfg.set("http.timeout_secs", "none").is_err());
        assert_eq!(cfg.http.timeout_secs, 15);
    }

    #[test]
    fn currency_is_normalised_and_checked() {
        let mut cfg = Config::default();
        cfg.set("profile.currency", "eur").unwrap();
        assert_eq!(cfg.profile.currency, "EUR");
        assert_eq!(cfg.profile.money(12.5), "€12.50");
        assert!(cfg.set("profile.currency", "euro").is_err());
        cfg.set("profile.currency", "CHF").unwrap();
        assert_eq!(cfg.profile.money(3.0), "3.00 CHF");
        cfg.set("profile.currency", "USD").unwrap();
        assert_eq!(cfg.profile.money(189.99), "$189.99");
    }

    #[test]
    fn saved_wage_fills_missing_draft_wage_only() {
        let mut cfg = Config::default();
        cfg.set("profile.hourly_wage", "25").unwrap();

        let filled = cfg.profile.with_saved_wage(PurchaseDraft::default());
        assert_eq!(filled.hourly_wage, Some(25.0));

        let own = PurchaseDraft {
            hourly_wage: Some(40.0),
            ..Default::default()
        };
        assert_eq!(cfg.profile.with_saved_wage(own).hourly_wage, Some(40.0));

        let unset = Config::default();
        assert_eq!(unset.profile.with_saved_wage(PurchaseDraft::default()).hourly_wage, None);
    }

    #[test]
    fn privacy_and_notification_gates_follow_kind() {
        let mut cfg = Config::default();
        cfg.set("privacy.share_impulse_purchases", "false").unwrap();
        assert!(!cfg.privacy.shares(NotificationKind::ImpulseBypass));
        assert!(cfg.privacy.shares(NotificationKind::GoalAchieved));

        cfg.set("notifications.weekly_report", "false").unwrap();
        assert!(!cfg.notifications.shows(NotificationKind::WeeklySummary));
        assert!(cfg.notifications.shows(NotificationKind::GoalAchieved));
        cfg.set("notifications.push", "false").unwrap();
        assert!(!cfg.notifications.shows(NotificationKind::ImpulseBypass));
    }

    #[test]
    fn keys_list_every_leaf() {
        let keys = Config::default().keys();
        for key in [
            "reflection.default_preset",
            "reflection.custom_minutes",
            "endpoints.prompts_url",
            "profile.hourly_wage",
            "privacy.share_goal_progress",
            "notifications.goal_reminders",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
        assert!(!keys.iter().any(|k| k == "privacy"));
    }

    #[test]
    fn reset_section_leaves_other_sections() {
        let mut cfg = Config::default();
        cfg.set("privacy.share_impulse_purchases", "false").unwrap();
        cfg.set("http.timeout_secs", "40").unwrap();
        cfg.reset_section("privacy").unwrap();
        assert!(cfg.privacy.share_impulse_purchases);
        assert_eq!(cfg.http.timeout_secs, 40);
        assert!(matches!(
            cfg.reset_section("nope"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn older_files_without_new_sections_load() {
        let parsed: Config = toml::from_str("[profile]\ndisplay_name = \"Sam\"\n").unwrap();
        assert_eq!(parsed.profile.display_name, "Sam");
        assert_eq!(parsed.profile.currency, "USD");
        assert!(parsed.privacy.share_impulse_purchases);
    }
}
