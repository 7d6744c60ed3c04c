// src/models/opening.rs

//! Opening and event key data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used wherever a time or name cannot be determined.
pub const TBD: &str = "TBD";

/// How an opening is registered for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OpeningKind {
    /// Single session with its own start time and capacity counter
    DropIn,
    /// Recurring program with an estimated time and aggregate registrants
    Pickup,
}

impl OpeningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpeningKind::DropIn => "drop-in",
            OpeningKind::Pickup => "pickup",
        }
    }
}

impl fmt::Display for OpeningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start time exactly as the upstream reported it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawStartTime {
    /// ISO-8601 instant of a drop-in game
    Instant(Option<String>),
    /// Date plus estimated local time-of-day of a pickup session
    Estimated {
        event_start_date: Option<String>,
        start_time_estimate: Option<String>,
    },
}

impl fmt::Display for RawStartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawStartTime::Instant(instant) => f.write_str(instant.as_deref().unwrap_or("null")),
            RawStartTime::Estimated {
                event_start_date,
                start_time_estimate,
            } => write!(
                f,
                "{} {}",
                event_start_date.as_deref().unwrap_or("null"),
                start_time_estimate.as_deref().unwrap_or("null")
            ),
        }
    }
}

/// One detected registration slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Opening {
    pub kind: OpeningKind,

    /// Display name, falling back to the plain program name
    pub program_name: Option<String>,

    /// Short venue label
    pub venue_name: Option<String>,

    /// Rendered local time, or [`TBD`]
    pub when_local: String,

    pub raw_start_time: RawStartTime,

    /// Always positive
    pub available_spots: i64,

    /// Present only for drop-ins
    pub game_id: Option<String>,

    pub league_id: String,
}

impl Opening {
    /// Program name or placeholder.
    pub fn program_label(&self) -> &str {
        self.program_name.as_deref().unwrap_or(TBD)
    }

    /// Venue name or placeholder.
    pub fn venue_label(&self) -> &str {
        self.venue_name.as_deref().unwrap_or(TBD)
    }
}

/// Stable dedup identity of an opening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(String);

impl EventKey {
    /// Derive the key for an opening.
    ///
    /// Drop-ins are keyed by game id. Pickup sessions have no per-instance id,
    /// so the league id is combined with the rendered local time; this makes
    /// the key depend on `when_local` formatting.
    pub fn derive(opening: &Opening) -> Self {
        match &opening.game_id {
            Some(game_id) => Self(format!("GAME#{}", game_id)),
            None => Self(format!(
                "LEAGUE#{}#{}",
                opening.league_id, opening.when_local
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for EventKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EventKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_in(game_id: &str) -> Opening {
        Opening {
            kind: OpeningKind::DropIn,
            program_name: Some("Open Play".to_string()),
            venue_name: Some("SoBo".to_string()),
            when_local: "March 5 7PM".to_string(),
            raw_start_time: RawStartTime::Instant(Some("2024-03-06T02:00:00Z".to_string())),
            available_spots: 3,
            game_id: Some(game_id.to_string()),
            league_id: "league-1".to_string(),
        }
    }

    fn pickup(when: &str) -> Opening {
        Opening {
            kind: OpeningKind::Pickup,
            program_name: Some("Pickup Night".to_string()),
            venue_name: Some("DU".to_string()),
            when_local: when.to_string(),
            raw_start_time: RawStartTime::Estimated {
                event_start_date: Some("2024-03-05".to_string()),
                start_time_estimate: Some("19:00".to_string()),
            },
            available_spots: 2,
            game_id: None,
            league_id: "league-9".to_string(),
        }
    }

    #[test]
    fn test_game_key() {
        assert_eq!(EventKey::derive(&drop_in("A")).as_str(), "GAME#A");
    }

    #[test]
    fn test_game_key_ignores_formatting_jitter() {
        let mut other = drop_in("A");
        other.when_local = TBD.to_string();
        other.available_spots = 9;
        other.program_name = None;
        assert_eq!(EventKey::derive(&drop_in("A")), EventKey::derive(&other));
        assert_ne!(EventKey::derive(&drop_in("A")), EventKey::derive(&drop_in("B")));
    }

    #[test]
    fn test_league_key_embeds_time() {
        let early = EventKey::derive(&pickup("March 5 7PM"));
        let late = EventKey::derive(&pickup("March 6 7PM"));
        assert_eq!(early.as_str(), "LEAGUE#league-9#March 5 7PM");
        assert_ne!(early, late);
        assert_eq!(early, EventKey::derive(&pickup("March 5 7PM")));
    }

    #[test]
    fn test_kind_serializes_kebab() {
        assert_eq!(
            serde_json::to_string(&OpeningKind::DropIn).unwrap(),
            "\"drop-in\""
        );
        assert_eq!(OpeningKind::Pickup.to_string(), "pickup");
    }

    #[test]
    fn test_raw_start_time_shapes() {
        let value = serde_json::to_value(&pickup(TBD).raw_start_time).unwrap();
        assert_eq!(value["event_start_date"], "2024-03-05");
        assert_eq!(value["start_time_estimate"], "19:00");

        let value = serde_json::to_value(&drop_in("A").raw_start_time).unwrap();
        assert_eq!(value, "2024-03-06T02:00:00Z");
    }
}
