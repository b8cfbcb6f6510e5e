//! Per-call scoring options.
//!
//! Every field is optional; absent values fall back to the defaults baked
//! into the scorer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Competitive level of the athlete, used to pick scoring targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerLevel {
    Youth,
    #[default]
    HighSchool,
    College,
    Pro,
}

impl PlayerLevel {
    pub const ALL: &'static [PlayerLevel] = &[
        PlayerLevel::Youth,
        PlayerLevel::HighSchool,
        PlayerLevel::College,
        PlayerLevel::Pro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerLevel::Youth => "youth",
            PlayerLevel::HighSchool => "high_school",
            PlayerLevel::College => "college",
            PlayerLevel::Pro => "pro",
        }
    }
}

impl fmt::Display for PlayerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlayerLevel {
    type Err = PlayerLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youth" => Ok(PlayerLevel::Youth),
            "high_school" | "highschool" | "hs" => Ok(PlayerLevel::HighSchool),
            "college" => Ok(PlayerLevel::College),
            "pro" | "professional" => Ok(PlayerLevel::Pro),
            _ => Err(PlayerLevelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown player level: {0}")]
pub struct PlayerLevelParseError(String);

/// Call-time configuration for scoring a swing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOptions {
    /// Athlete height, converts normalized hand speed into mph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 36.0, max = 96.0))]
    pub player_height_inches: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_level: Option<PlayerLevel>,

    /// Contact frame chosen by a reviewer; trusted over detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_contact_frame_index: Option<usize>,
}

impl ScoringOptions {
    pub fn with_height(mut self, inches: f64) -> Self {
        self.player_height_inches = Some(inches);
        self
    }

    pub fn with_level(mut self, level: PlayerLevel) -> Self {
        self.player_level = Some(level);
        self
    }

    pub fn with_manual_contact(mut self, frame: usize) -> Self {
        self.manual_contact_frame_index = Some(frame);
        self
    }

    /// Level to score against.
    pub fn level(&self) -> PlayerLevel {
        self.player_level.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("pro".parse::<PlayerLevel>().unwrap(), PlayerLevel::Pro);
        assert_eq!("HS".parse::<PlayerLevel>().unwrap(), PlayerLevel::HighSchool);
        assert!("rookie".parse::<PlayerLevel>().is_err());
    }

    #[test]
    fn test_options_validation() {
        assert!(ScoringOptions::default().validate().is_ok());
        assert!(ScoringOptions::default().with_height(72.0).validate().is_ok());
        assert!(ScoringOptions::default().with_height(12.0).validate().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let opts: ScoringOptions = serde_json::from_str(
            r#"{"playerHeightInches": 70.5, "playerLevel": "college", "manualContactFrameIndex": 60}"#,
        )
        .unwrap();
        assert_eq!(opts.player_height_inches, Some(70.5));
        assert_eq!(opts.level(), PlayerLevel::College);
        assert_eq!(opts.manual_contact_frame_index, Some(60));
    }
}
