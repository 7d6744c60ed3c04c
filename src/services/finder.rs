// src/services/finder.rs

//! Opening finder service.
//!
//! Queries `discover_daily` and turns each game or league row into an
//! [`Opening`] with a positive availability count and a rendered local time.

use std::sync::Arc;

use chrono_tz::Tz;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::discover::{
    DiscoverData, DiscoverEntry, DiscoverRow, GameRow, GraphQlEnvelope, LeagueRow,
};
use crate::models::{Config, FinderConfig, Opening, OpeningKind, RawStartTime};
use crate::services::query;
use crate::utils::http::GraphQlTransport;
use crate::utils::time::{format_estimated, format_game_start, resolve_timezone};

/// Service for finding open registration slots.
pub struct OpeningFinder {
    transport: Arc<dyn GraphQlTransport>,
    finder: FinderConfig,
    tz: Tz,
}

impl OpeningFinder {
    /// Create a finder for the given configuration.
    pub fn new(transport: Arc<dyn GraphQlTransport>, config: &Config) -> Self {
        Self {
            transport,
            finder: config.finder.clone(),
            tz: resolve_timezone(&config.display.timezone),
        }
    }

    /// Display timezone in use.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Fetch every current opening, in upstream order.
    ///
    /// Transport failures, non-2xx statuses and GraphQL error payloads fail the
    /// whole call; malformed individual rows are skipped.
    pub async fn find_openings(&self) -> Result<Vec<Opening>> {
        let request = query::discover_request(&self.finder);
        let response = self.transport.post(&request).await?;

        if !response.is_success() {
            return Err(AppError::upstream(response.status, response.body));
        }

        let data = parse_discover_body(&response.body)?;
        let openings = extract_openings(&data, &self.tz);

        log::info!(
            "Found {} openings in {} rows from {}",
            openings.len(),
            data.discover_daily.len(),
            self.transport.endpoint()
        );

        Ok(openings)
    }
}

/// Decode a 2xx body, rejecting GraphQL error payloads.
pub fn parse_discover_body(body: &str) -> Result<DiscoverData> {
    let envelope: GraphQlEnvelope = serde_json::from_str(body)?;

    if let Some(errors) = envelope.errors.filter(|e| !e.is_null()) {
        return Err(AppError::graphql(errors));
    }

    let data = envelope
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::graphql("response carried no data"))?;

    Ok(serde_json::from_value(data)?)
}

/// Build openings from decoded rows, keeping input order.
pub fn extract_openings(data: &DiscoverData, tz: &Tz) -> Vec<Opening> {
    data.discover_daily
        .iter()
        .enumerate()
        .filter_map(|(index, row)| opening_from_row(index, row, tz))
        .collect()
}

fn opening_from_row(index: usize, row: &Value, tz: &Tz) -> Option<Opening> {
    let row: DiscoverRow = match serde_json::from_value(row.clone()) {
        Ok(row) => row,
        Err(e) => {
            log::warn!("Skipping row {}: malformed entry: {}", index, e);
            return None;
        }
    };

    match row.into_entry() {
        Some(DiscoverEntry::Game { game_id, game }) => drop_in_opening(index, game_id, game, tz),
        Some(DiscoverEntry::League {
            league_id,
            league,
            event_start_date,
        }) => pickup_opening(index, league_id, league, event_start_date, tz),
        None => {
            log::debug!("Skipping row {}: neither game nor league", index);
            None
        }
    }
}

fn drop_in_opening(
    index: usize,
    row_game_id: Option<String>,
    game: GameRow,
    tz: &Tz,
) -> Option<Opening> {
    let Some(spots) = game
        .drop_in_capacity
        .as_ref()
        .and_then(|c| c.total_available_spots)
    else {
        log::warn!("Skipping row {}: drop-in without available spots", index);
        return None;
    };
    if spots <= 0 {
        return None;
    }

    let Some(game_id) = game.id.clone().or(row_game_id) else {
        log::warn!("Skipping row {}: drop-in without game id", index);
        return None;
    };

    let program = game.league.unwrap_or_default();
    let Some(league_id) = program.id else {
        log::warn!("Skipping row {}: game {} without league id", index, game_id);
        return None;
    };

    Some(Opening {
        kind: OpeningKind::DropIn,
        program_name: coalesce(program.display_name, program.name),
        venue_name: game.venue.and_then(|v| v.shorthand_name),
        when_local: format_game_start(game.start_time.as_deref(), tz),
        raw_start_time: RawStartTime::Instant(game.start_time),
        available_spots: spots,
        game_id: Some(game_id),
        league_id,
    })
}

fn pickup_opening(
    index: usize,
    row_league_id: Option<String>,
    league: LeagueRow,
    event_start_date: Option<String>,
    tz: &Tz,
) -> Option<Opening> {
    let (Some(capacity), Some(registrants)) = (league.capacity(), league.registrant_count())
    else {
        log::warn!("Skipping row {}: league without capacity or registrant count", index);
        return None;
    };
    let available = capacity - registrants;
    if available <= 0 {
        return None;
    }

    let Some(league_id) = league.id.clone().or(row_league_id) else {
        log::warn!("Skipping row {}: pickup without league id", index);
        return None;
    };

    let when_local = format_estimated(
        event_start_date.as_deref(),
        league.start_time_estimate.as_deref(),
        tz,
    );

    Some(Opening {
        kind: OpeningKind::Pickup,
        program_name: coalesce(league.display_name, league.name),
        venue_name: league.venue.and_then(|v| v.shorthand_name),
        when_local,
        raw_start_time: RawStartTime::Estimated {
            event_start_date,
            start_time_estimate: league.start_time_estimate,
        },
        available_spots: available,
        game_id: None,
        league_id,
    })
}

/// Preferred value unless absent or blank.
fn coalesce(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred
        .filter(|s| !s.trim().is_empty())
        .or_else(|| fallback.filter(|s| !s.trim().is_empty()))
}
