// src/models/discover.rs

//! Wire shapes of the `DiscoverDaily` GraphQL response.
//!
//! Every nested field is optional because the upstream schema is not under
//! our control; deciding what is required happens in the finder.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a display-only field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope {
    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub errors: Option<Value>,
}

/// `data` member of a `DiscoverDaily` response.
///
/// Rows are kept as raw JSON so that one malformed row cannot fail the
/// decoding of its siblings.
#[derive(Debug, Deserialize, Default)]
pub struct DiscoverData {
    #[serde(default)]
    pub discover_daily: Vec<Value>,
}

/// One `discover_daily` row as sent by the upstream.
#[derive(Debug, Deserialize, Default)]
pub struct DiscoverRow {
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub game: Option<GameRow>,
    #[serde(default)]
    pub league_id: Option<String>,
    #[serde(default)]
    pub league: Option<LeagueRow>,
    #[serde(default, deserialize_with = "lenient")]
    pub event_start_date: Option<String>,
}

/// A row decoded into exactly one of its two shapes.
#[derive(Debug)]
pub enum DiscoverEntry {
    /// Drop-in game
    Game {
        game_id: Option<String>,
        game: GameRow,
    },
    /// Pickup league session
    League {
        league_id: Option<String>,
        league: LeagueRow,
        event_start_date: Option<String>,
    },
}

impl DiscoverRow {
    /// Resolve the row into its variant; rows carrying neither are dropped.
    pub fn into_entry(self) -> Option<DiscoverEntry> {
        if let Some(game) = self.game.filter(|g| !g.is_empty()) {
            return Some(DiscoverEntry::Game {
                game_id: self.game_id,
                game,
            });
        }
        self.league
            .filter(|l| !l.is_empty())
            .map(|league| DiscoverEntry::League {
                league_id: self.league_id,
                league,
                event_start_date: self.event_start_date,
            })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct GameRow {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_time: Option<String>,
    #[serde(rename = "venueByVenue", default, deserialize_with = "lenient")]
    pub venue: Option<VenueRow>,
    #[serde(default)]
    pub drop_in_capacity: Option<CapacityRow>,
    #[serde(rename = "leagueByLeague", default)]
    pub league: Option<ProgramRow>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeagueRow {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub program_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_time_estimate: Option<String>,
    #[serde(rename = "venueByVenue", default, deserialize_with = "lenient")]
    pub venue: Option<VenueRow>,
    #[serde(default)]
    pub registrants_aggregate: Option<AggregateRow>,
    #[serde(rename = "registrationByRegistration", default)]
    pub registration: Option<RegistrationRow>,
}

impl GameRow {
    /// `{}` is sent for rows that are not drop-ins.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.start_time.is_none()
            && self.venue.is_none()
            && self.drop_in_capacity.is_none()
            && self.league.is_none()
    }
}

impl LeagueRow {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.display_name.is_none()
            && self.program_type.is_none()
            && self.start_date.is_none()
            && self.start_time_estimate.is_none()
            && self.venue.is_none()
            && self.registrants_aggregate.is_none()
            && self.registration.is_none()
    }

    /// Current registrant count, if reported.
    pub fn registrant_count(&self) -> Option<i64> {
        self.registrants_aggregate
            .as_ref()?
            .aggregate
            .as_ref()?
            .count
    }

    /// Registration capacity, if reported.
    pub fn capacity(&self) -> Option<i64> {
        self.registration.as_ref()?.max_registration_size
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ProgramRow {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub program_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct VenueRow {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub shorthand_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CapacityRow {
    #[serde(default)]
    pub total_available_spots: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AggregateRow {
    #[serde(default)]
    pub aggregate: Option<CountRow>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CountRow {
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegistrationRow {
    #[serde(default)]
    pub max_registration_size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_row_takes_precedence() {
        let row: DiscoverRow = serde_json::from_value(serde_json::json!({
            "game_id": "g1",
            "game": { "_id": "g1" },
            "league_id": null,
            "league": null,
            "event_start_date": "2024-03-05"
        }))
        .unwrap();

        assert!(matches!(row.into_entry(), Some(DiscoverEntry::Game { .. })));
    }

    #[test]
    fn empty_game_object_falls_through_to_league() {
        let row: DiscoverRow = serde_json::from_value(serde_json::json!({
            "game_id": null,
            "game": {},
            "league_id": "l1",
            "league": { "_id": "l1" },
            "event_start_date": "2024-03-05"
        }))
        .unwrap();

        assert!(matches!(row.into_entry(), Some(DiscoverEntry::League { .. })));
    }

    #[test]
    fn display_fields_of_wrong_type_decode_as_none() {
        let game: GameRow = serde_json::from_value(serde_json::json!({
            "_id": "g1",
            "start_time": 1709665200,
            "venueByVenue": "SoBo",
            "leagueByLeague": { "_id": "l1", "name": "Drop-in", "display_name": 42 }
        }))
        .unwrap();

        assert_eq!(game.id.as_deref(), Some("g1"));
        assert_eq!(game.start_time, None);
        assert!(game.venue.is_none());
        let program = game.league.unwrap();
        assert_eq!(program.display_name, None);
        assert_eq!(program.name.as_deref(), Some("Drop-in"));
    }

    #[test]
    fn empty_row_has_no_entry() {
        let row: DiscoverRow = serde_json::from_value(serde_json::json!({
            "game": null,
            "league": null
        }))
        .unwrap();

        assert!(row.into_entry().is_none());
    }

    #[test]
    fn league_helpers_walk_nested_counts() {
        let league: LeagueRow = serde_json::from_value(serde_json::json!({
            "registrants_aggregate": { "aggregate": { "count": 7 } },
            "registrationByRegistration": { "max_registration_size": 12 }
        }))
        .unwrap();

        assert_eq!(league.registrant_count(), Some(7));
        assert_eq!(league.capacity(), Some(12));
        assert_eq!(LeagueRow::default().capacity(), None);
    }
}
