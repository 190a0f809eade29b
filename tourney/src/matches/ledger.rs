//! Match event ledger: goals, cards and substitutions recorded while a match is live.
//!
//! The ledger is append-only. A mistaken entry is corrected by recording a
//! compensating event, never by editing or deleting the original.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    manager::match_from_row,
    models::{Match, MatchEvent, MatchId, MatchStatus, NewMatchEvent},
};
use crate::{
    access::{Action, Actor, Resource, authorize},
    errors::{CoreError, CoreResult},
};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::sync::Arc;

const EVENT_COLUMNS: &str =
    "id, match_id, team_id, player_id, event_type, minute, additional_time, description, created_at";

/// Check that an event may be recorded against a match right now
pub fn check_event(m: &Match, event: &NewMatchEvent) -> CoreResult<()> {
    event.validate()?;

    if m.status != MatchStatus::InProgress {
        return Err(CoreError::MatchNotInStatus {
            match_id: m.id,
            status: m.status,
            expected: MatchStatus::InProgress,
        });
    }
    if !m.involves(event.team_id) {
        return Err(CoreError::TeamNotInMatch {
            match_id: m.id,
            team_id: event.team_id,
        });
    }
    Ok(())
}

/// Event ledger
#[derive(Clone)]
pub struct EventLedger {
    pool: Arc<PgPool>,
}

impl EventLedger {
    /// Create a new event ledger
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Record an event. Admin or the match's referee, while the match is in progress.
    pub async fn add_event(
        &self,
        actor: &Actor,
        match_id: MatchId,
        event: NewMatchEvent,
    ) -> CoreResult<MatchEvent> {
        let mut tx = self.pool.begin().await?;
        let m = share_match(&mut tx, match_id).await?;

        authorize(
            actor,
            &Resource::Match {
                referee_id: m.referee_id,
            },
            Action::OfficiateMatch,
        )?;
        check_event(&m, &event)?;

        if let Some(player_id) = event.player_id {
            sqlx::query("SELECT 1 FROM players WHERE id = $1")
                .bind(player_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::PlayerNotFound(player_id))?;
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO match_events (match_id, team_id, player_id, event_type, minute, additional_time, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(match_id)
        .bind(event.team_id)
        .bind(event.player_id)
        .bind(event.event_type.as_str())
        .bind(event.minute)
        .bind(event.additional_time)
        .bind(&event.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let recorded = event_from_row(&row)?;
        log::debug!(
            "Recorded {} at {} in match {}",
            recorded.event_type,
            recorded.formatted_time(),
            match_id
        );
        Ok(recorded)
    }

    /// A match's events in clock order
    pub async fn list_events(&self, match_id: MatchId) -> CoreResult<Vec<MatchEvent>> {
        sqlx::query("SELECT 1 FROM matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::MatchNotFound(match_id))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM match_events
            WHERE match_id = $1
            ORDER BY minute, additional_time, id
            "#
        ))
        .bind(match_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}

/// Shared lock on a match so its status cannot change while an event is written
async fn share_match(conn: &mut PgConnection, match_id: MatchId) -> CoreResult<Match> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM matches WHERE id = $1 FOR SHARE",
        super::manager::MATCH_COLUMNS
    ))
    .bind(match_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CoreError::MatchNotFound(match_id))?;

    match_from_row(&row)
}

pub(crate) fn event_from_row(row: &PgRow) -> CoreResult<MatchEvent> {
    Ok(MatchEvent {
        id: row.get("id"),
        match_id: row.get("match_id"),
        team_id: row.get("team_id"),
        player_id: row.get("player_id"),
        event_type: row.get::<String, _>("event_type").parse()?,
        minute: row.get("minute"),
        additional_time: row.get("additional_time"),
        description: row.get("description"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::ErrorKind, matches::EventType};
    use chrono::Utc;

    fn live_match() -> Match {
        Match {
            id: 8,
            tournament_id: 1,
            home_team_id: 10,
            away_team_id: 20,
            referee_id: Some(3),
            round: Some("Matchday 1".to_string()),
            match_date: Utc::now(),
            venue: None,
            status: MatchStatus::InProgress,
            home_score: None,
            away_score: None,
            extra_time: None,
            penalties: None,
            winner_team_id: None,
            notes: None,
        }
    }

    fn goal(team_id: i64) -> NewMatchEvent {
        NewMatchEvent {
            team_id,
            player_id: Some(100),
            event_type: EventType::Goal,
            minute: 67,
            additional_time: 0,
            description: None,
        }
    }

    #[test]
    fn test_event_for_live_match() {
        assert!(check_event(&live_match(), &goal(20)).is_ok());
    }

    #[test]
    fn test_event_for_unstarted_match() {
        let mut m = live_match();
        m.status = MatchStatus::Scheduled;

        let err = check_event(&m, &goal(10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_event_for_outside_team() {
        let err = check_event(&live_match(), &goal(30)).unwrap_err();
        assert!(matches!(err, CoreError::TeamNotInMatch { team_id: 30, .. }));
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_event_minute_out_of_range() {
        let mut event = goal(10);
        event.minute = 130;
        assert_eq!(
            check_event(&live_match(), &event).unwrap_err().kind(),
            ErrorKind::ValidationFailed
        );
    }
}
