// src/services/query.rs

//! GraphQL documents and the `where` filter sent to `discover_daily`.

use serde_json::{Value, json};

use crate::models::FinderConfig;
use crate::utils::http::GraphQlRequest;

/// Full projection used to build openings.
pub const DISCOVER_QUERY: &str = r#"query DiscoverDaily($where: discover_daily_bool_exp!, $limit: Int = 100) {
  discover_daily(where: $where, limit: $limit) {
    game_id
    game {
      _id
      start_time
      venueByVenue { _id shorthand_name }
      drop_in_capacity { total_available_spots }
      leagueByLeague { _id name display_name program_type }
    }
    league_id
    league {
      _id
      name
      display_name
      program_type
      start_date
      start_time_estimate
      venueByVenue { _id shorthand_name }
      registrants_aggregate { aggregate { count } }
      registrationByRegistration { max_registration_size }
    }
    event_start_date
  }
}"#;

/// Slim projection sent by the probe in discover mode.
pub const PROBE_DISCOVER_QUERY: &str = r#"query DiscoverDaily($where: discover_daily_bool_exp!, $limit: Int = 10) {
  discover_daily(where: $where, limit: $limit) {
    game_id
    league_id
    event_start_date
  }
}"#;

/// Smallest valid query.
pub const PROBE_MINIMAL_QUERY: &str = "query Probe { __typename }";

pub const DISCOVER_OPERATION: &str = "DiscoverDaily";
pub const PROBE_OPERATION: &str = "Probe";

/// Filter matching open pickup leagues and drop-in games at the watched venues.
pub fn build_where(finder: &FinderConfig) -> Value {
    let venue_ids = finder.venue_ids();
    let program = json!({
        "organizationByOrganization": { "name": { "_eq": finder.organization } },
        "sportBySport": { "name": { "_in": finder.sports } },
        "program_type": { "_in": finder.program_types },
    });

    let mut league = program.clone();
    if let Value::Object(map) = &mut league {
        map.insert("status".into(), json!({ "_eq": "registration_open" }));
        map.insert(
            "registrationByRegistration".into(),
            json!({ "available_spots": { "_gte": 1 } }),
        );
        map.insert("venueByVenue".into(), json!({ "_id": { "_in": venue_ids } }));
    }

    json!({
        "_or": [
            {
                "league_id": { "_is_null": false },
                "league": league,
            },
            {
                "game_id": { "_is_null": false },
                "game": {
                    "leagueByLeague": program,
                    "venueByVenue": { "_id": { "_in": venue_ids } },
                    "drop_in_capacity": { "total_available_spots": { "_gte": 1 } },
                },
            },
        ]
    })
}

/// Request issued by the opening finder.
pub fn discover_request(finder: &FinderConfig) -> GraphQlRequest {
    GraphQlRequest::new(
        DISCOVER_OPERATION,
        DISCOVER_QUERY,
        json!({ "where": build_where(finder), "limit": finder.limit }),
    )
}

/// Discover-shaped request issued by the probe.
pub fn probe_discover_request(finder: &FinderConfig, limit: u32) -> GraphQlRequest {
    GraphQlRequest::new(
        DISCOVER_OPERATION,
        PROBE_DISCOVER_QUERY,
        json!({ "where": build_where(finder), "limit": limit }),
    )
}

/// Minimal request issued by the probe.
pub fn probe_minimal_request() -> GraphQlRequest {
    GraphQlRequest::new(PROBE_OPERATION, PROBE_MINIMAL_QUERY, json!({}))
}
