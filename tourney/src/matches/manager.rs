//! Match manager: scheduling, status changes and result recording.
#![allow(clippy::needless_raw_string_hashes)]

use super::models::{Match, MatchId, MatchResult, MatchStatus, NewMatch, Score};
use crate::{
    access::{Action, Actor, Resource, authorize},
    errors::{CoreError, CoreResult},
    standings::manager::apply_match_result,
    tournament::{TournamentId, manager::share_tournament},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::sync::Arc;

pub(crate) const MATCH_COLUMNS: &str = "id, tournament_id, home_team_id, away_team_id, referee_id, \
     round, match_date, venue, status, home_score, away_score, extra_time_home, extra_time_away, \
     penalty_home, penalty_away, winner_team_id, notes";

/// Match manager
#[derive(Clone)]
pub struct MatchManager {
    pool: Arc<PgPool>,
}

impl MatchManager {
    /// Create a new match manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Schedule a fixture between two approved entrants
    ///
    /// # Errors
    ///
    /// * `CoreError::Validation` - Home and away are the same team, or the referee is not a referee
    /// * `CoreError::TeamNotEntered` - A team is not an approved entrant
    /// * `CoreError::TournamentLocked` - The tournament is finished
    pub async fn schedule_match(&self, actor: &Actor, input: NewMatch) -> CoreResult<Match> {
        authorize(
            actor,
            &Resource::Match { referee_id: None },
            Action::ScheduleMatch,
        )?;
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let tournament = share_tournament(&mut tx, input.tournament_id).await?;

        if tournament.status.is_terminal() {
            return Err(CoreError::TournamentLocked {
                tournament_id: tournament.id,
                status: tournament.status,
            });
        }

        for team_id in [input.home_team_id, input.away_team_id] {
            let entered = sqlx::query(
                r#"
                SELECT 1 FROM tournament_registrations
                WHERE tournament_id = $1 AND team_id = $2 AND status = 'approved'
                "#,
            )
            .bind(input.tournament_id)
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?;

            if entered.is_none() {
                return Err(CoreError::TeamNotEntered {
                    tournament_id: input.tournament_id,
                    team_id,
                });
            }
        }

        if let Some(referee_id) = input.referee_id {
            let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
                .bind(referee_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::UserNotFound(referee_id))?;

            if role != "referee" {
                return Err(CoreError::validation(format!(
                    "user {referee_id} is not a referee"
                )));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO matches (tournament_id, home_team_id, away_team_id, referee_id, round, match_date, venue)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MATCH_COLUMNS}
            "#
        ))
        .bind(input.tournament_id)
        .bind(input.home_team_id)
        .bind(input.away_team_id)
        .bind(input.referee_id)
        .bind(&input.round)
        .bind(input.match_date.naive_utc())
        .bind(&input.venue)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        let scheduled = match_from_row(&row)?;
        log::info!(
            "Scheduled match {} ({} vs {}) in tournament {}",
            scheduled.id,
            scheduled.home_team_id,
            scheduled.away_team_id,
            scheduled.tournament_id
        );
        Ok(scheduled)
    }

    /// Get a match by ID
    pub async fn get_match(&self, match_id: MatchId) -> CoreResult<Match> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(match_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::MatchNotFound(match_id))?;

        match_from_row(&row)
    }

    /// A tournament's matches in kick-off order
    pub async fn list_matches(
        &self,
        tournament_id: TournamentId,
        status: Option<MatchStatus>,
    ) -> CoreResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MATCH_COLUMNS} FROM matches
            WHERE tournament_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY match_date, id
            "#
        ))
        .bind(tournament_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Kick off: `scheduled -> in_progress`. Admin or the assigned referee.
    pub async fn start_match(&self, actor: &Actor, match_id: MatchId) -> CoreResult<Match> {
        self.transition(actor, match_id, MatchStatus::InProgress, Action::OfficiateMatch, None)
            .await
    }

    /// `scheduled -> postponed`
    pub async fn postpone_match(&self, actor: &Actor, match_id: MatchId) -> CoreResult<Match> {
        self.transition(actor, match_id, MatchStatus::Postponed, Action::ScheduleMatch, None)
            .await
    }

    /// `postponed -> scheduled` with a new kick-off time
    pub async fn reschedule_match(
        &self,
        actor: &Actor,
        match_id: MatchId,
        match_date: DateTime<Utc>,
    ) -> CoreResult<Match> {
        self.transition(
            actor,
            match_id,
            MatchStatus::Scheduled,
            Action::ScheduleMatch,
            Some(match_date),
        )
        .await
    }

    /// Call a match off. Completed matches cannot be cancelled.
    pub async fn cancel_match(&self, actor: &Actor, match_id: MatchId) -> CoreResult<Match> {
        self.transition(actor, match_id, MatchStatus::Cancelled, Action::ScheduleMatch, None)
            .await
    }

    /// Record the final result and update the standings.
    ///
    /// The match row is locked, checked, marked completed and folded into the
    /// table in one transaction. A match can be completed once; a second
    /// attempt fails without touching the table.
    ///
    /// # Errors
    ///
    /// * `CoreError::MatchAlreadyCompleted` - The match already has a final result
    /// * `CoreError::InvalidTransition` - The match is postponed or cancelled
    /// * `CoreError::Validation` - A score is negative or above `MAX_SCORE`
    pub async fn complete_match(
        &self,
        actor: &Actor,
        match_id: MatchId,
        result: MatchResult,
        notes: Option<String>,
    ) -> CoreResult<Match> {
        result.validate()?;

        let mut tx = self.pool.begin().await?;
        let current = lock_match(&mut tx, match_id).await?;

        authorize(
            actor,
            &Resource::Match {
                referee_id: current.referee_id,
            },
            Action::OfficiateMatch,
        )?;

        if current.status == MatchStatus::Completed {
            return Err(CoreError::MatchAlreadyCompleted(match_id));
        }
        if !current.status.can_transition_to(MatchStatus::Completed) {
            return Err(CoreError::InvalidTransition {
                entity: "match",
                from: current.status.to_string(),
                to: MatchStatus::Completed.to_string(),
            });
        }

        let tournament = share_tournament(&mut tx, current.tournament_id).await?;
        if tournament.status.is_terminal() {
            return Err(CoreError::TournamentLocked {
                tournament_id: tournament.id,
                status: tournament.status,
            });
        }

        let winner = result.winning_side().map(|side| current.team_on(side));

        let row = sqlx::query(&format!(
            r#"
            UPDATE matches
            SET status = 'completed',
                home_score = $2, away_score = $3,
                extra_time_home = $4, extra_time_away = $5,
                penalty_home = $6, penalty_away = $7,
                winner_team_id = $8,
                notes = COALESCE($9, notes),
                completed_at = NOW() AT TIME ZONE 'utc'
            WHERE id = $1 AND status <> 'completed'
            RETURNING {MATCH_COLUMNS}
            "#
        ))
        .bind(match_id)
        .bind(result.regulation.home)
        .bind(result.regulation.away)
        .bind(result.extra_time.map(|s| s.home))
        .bind(result.extra_time.map(|s| s.away))
        .bind(result.penalties.map(|s| s.home))
        .bind(result.penalties.map(|s| s.away))
        .bind(winner)
        .bind(notes)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::MatchAlreadyCompleted(match_id))?;

        let completed = match_from_row(&row)?;
        apply_match_result(&mut tx, &completed).await?;
        tx.commit().await?;

        log::info!(
            "Match {} completed {}-{} (winner: {:?})",
            match_id,
            result.regulation.home,
            result.regulation.away,
            winner
        );
        Ok(completed)
    }

    async fn transition(
        &self,
        actor: &Actor,
        match_id: MatchId,
        next: MatchStatus,
        action: Action,
        match_date: Option<DateTime<Utc>>,
    ) -> CoreResult<Match> {
        let mut tx = self.pool.begin().await?;
        let current = lock_match(&mut tx, match_id).await?;

        authorize(
            actor,
            &Resource::Match {
                referee_id: current.referee_id,
            },
            action,
        )?;

        if !current.status.can_transition_to(next) || next == MatchStatus::Completed {
            return Err(CoreError::InvalidTransition {
                entity: "match",
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE matches
            SET status = $2, match_date = COALESCE($3, match_date)
            WHERE id = $1
            RETURNING {MATCH_COLUMNS}
            "#
        ))
        .bind(match_id)
        .bind(next.as_str())
        .bind(match_date.map(|d| d.naive_utc()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!("Match {} moved from {} to {}", match_id, current.status, next);
        match_from_row(&row)
    }
}

/// Lock a match row for writing
pub(crate) async fn lock_match(conn: &mut PgConnection, match_id: MatchId) -> CoreResult<Match> {
    let row = sqlx::query(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE"
    ))
    .bind(match_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CoreError::MatchNotFound(match_id))?;

    match_from_row(&row)
}

/// Completed matches of a tournament, in the order they are replayed
pub(crate) async fn fetch_completed_matches(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> CoreResult<Vec<Match>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {MATCH_COLUMNS} FROM matches
        WHERE tournament_id = $1 AND status = 'completed'
        ORDER BY match_date, id
        "#
    ))
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(match_from_row).collect()
}

fn score_pair(row: &PgRow, home: &str, away: &str) -> Option<Score> {
    match (row.get::<Option<i32>, _>(home), row.get::<Option<i32>, _>(away)) {
        (Some(home), Some(away)) => Some(Score::new(home, away)),
        _ => None,
    }
}

pub(crate) fn match_from_row(row: &PgRow) -> CoreResult<Match> {
    Ok(Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        home_team_id: row.get("home_team_id"),
        away_team_id: row.get("away_team_id"),
        referee_id: row.get("referee_id"),
        round: row.get("round"),
        match_date: row.get::<NaiveDateTime, _>("match_date").and_utc(),
        venue: row.get("venue"),
        status: row.get::<String, _>("status").parse()?,
        home_score: row.get("home_score"),
        away_score: row.get("away_score"),
        extra_time: score_pair(row, "extra_time_home", "extra_time_away"),
        penalties: score_pair(row, "penalty_home", "penalty_away"),
        winner_team_id: row.get("winner_team_id"),
        notes: row.get("notes"),
    })
}
