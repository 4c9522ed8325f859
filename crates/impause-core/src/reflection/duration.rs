use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Preset reflection lengths offered before a timer starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationPreset {
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
}

impl DurationPreset {
    pub const ALL: [DurationPreset; 4] = [
        DurationPreset::FifteenMinutes,
        DurationPreset::ThirtyMinutes,
        DurationPreset::OneHour,
        DurationPreset::OneDay,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            DurationPreset::FifteenMinutes => 15,
            DurationPreset::ThirtyMinutes => 30,
            DurationPreset::OneHour => 60,
            DurationPreset::OneDay => 24 * 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationPreset::FifteenMinutes => "15 min",
            DurationPreset::ThirtyMinutes => "30 min",
            DurationPreset::OneHour => "1 hour",
            DurationPreset::OneDay => "24 hours",
        }
    }

    fn key(self) -> &'static str {
        match self {
            DurationPreset::FifteenMinutes => "15m",
            DurationPreset::ThirtyMinutes => "30m",
            DurationPreset::OneHour => "1h",
            DurationPreset::OneDay => "24h",
        }
    }
}

impl fmt::Display for DurationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DurationPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DurationPreset::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "preset".into(),
                message: format!("'{s}' is not one of 15m, 30m, 1h, 24h"),
            })
    }
}

/// Which duration the next `start` uses. A custom value wins over the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationSelection {
    pub preset: DurationPreset,
    #[serde(default)]
    pub custom_minutes: Option<u32>,
}

impl DurationSelection {
    pub fn minutes(&self) -> u32 {
        self.custom_minutes.unwrap_or_else(|| self.preset.minutes())
    }

    pub fn seconds(&self) -> u64 {
        u64::from(self.minutes()) * 60
    }
}

/// `m:ss`, minutes uncapped (a 24 hour timer shows `1440:00`).
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_overrides_preset() {
        let mut sel = DurationSelection::default();
        assert_eq!(sel.minutes(), 15);
        sel.preset = DurationPreset::OneDay;
        assert_eq!(sel.minutes(), 1440);
        sel.custom_minutes = Some(7);
        assert_eq!(sel.minutes(), 7);
        assert_eq!(sel.seconds(), 420);
    }

    #[test]
    fn preset_parses_short_keys() {
        assert_eq!("1H".parse::<DurationPreset>().unwrap(), DurationPreset::OneHour);
        assert!("45m".parse::<DurationPreset>().is_err());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(900), "15:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(86_400), "1440:00");
    }
}
