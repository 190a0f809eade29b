//! Statistics manager: loads history and hands it to the calculator.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    calculator::{player_statistics, rank_scorers, team_statistics},
    models::{
        GoalRecord, PlayerEventRecord, PlayerStatistics, ScorerLine, TeamFixture,
        TeamStatistics, TournamentCounts,
    },
};
use crate::{
    errors::{CoreError, CoreResult},
    matches::{ledger::event_from_row, manager::match_from_row},
    roster::{PlayerId, TeamId},
    tournament::TournamentId,
};
use chrono::NaiveDateTime;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::sync::Arc;

/// Statistics manager. Read-only.
#[derive(Clone)]
pub struct StatisticsManager {
    pool: Arc<PgPool>,
}

impl StatisticsManager {
    /// Create a new statistics manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Statistics for a team over all of its completed matches
    ///
    /// # Errors
    ///
    /// * `CoreError::TeamNotFound` - No such team
    pub async fn team_statistics(&self, team_id: TeamId) -> CoreResult<TeamStatistics> {
        sqlx::query("SELECT 1 FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::TeamNotFound(team_id))?;

        let rows = sqlx::query(
            r#"
            SELECT m.id, m.tournament_id, m.home_team_id, m.away_team_id, m.referee_id,
                   m.round, m.match_date, m.venue, m.status, m.home_score, m.away_score,
                   m.extra_time_home, m.extra_time_away, m.penalty_home, m.penalty_away,
                   m.winner_team_id, m.notes, t.name AS tournament_name
            FROM matches m
            LEFT JOIN tournaments t ON t.id = m.tournament_id
            WHERE (m.home_team_id = $1 OR m.away_team_id = $1) AND m.status = 'completed'
            ORDER BY m.match_date DESC, m.id DESC
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let fixtures = rows
            .iter()
            .map(|row| {
                Ok(TeamFixture {
                    fixture: match_from_row(row)?,
                    tournament_name: row.get("tournament_name"),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let goals = sqlx::query(
            r#"
            SELECT e.player_id, u.name AS player_name, e.team_id, tm.name AS team_name
            FROM match_events e
            JOIN matches m ON m.id = e.match_id
            LEFT JOIN players p ON p.id = e.player_id
            LEFT JOIN users u ON u.id = p.user_id
            LEFT JOIN teams tm ON tm.id = e.team_id
            WHERE e.team_id = $1
              AND e.event_type = 'goal'
              AND e.player_id IS NOT NULL
              AND m.status = 'completed'
            "#,
        )
        .bind(team_id)
        .fetch_all(self.pool.as_ref())
        .await?
        .iter()
        .map(goal_from_row)
        .collect::<Vec<_>>();

        let counts = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE t.status IN ('registration_open', 'in_progress')) AS active
            FROM tournament_registrations r
            JOIN tournaments t ON t.id = r.tournament_id
            WHERE r.team_id = $1
            "#,
        )
        .bind(team_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let tournaments = TournamentCounts {
            total: counts.get::<i64, _>("total") as u32,
            active: counts.get::<i64, _>("active") as u32,
        };

        Ok(team_statistics(team_id, &fixtures, &goals, tournaments))
    }

    /// Statistics for a player from every event attributed to them
    ///
    /// # Errors
    ///
    /// * `CoreError::PlayerNotFound` - No such player
    pub async fn player_statistics(&self, player_id: PlayerId) -> CoreResult<PlayerStatistics> {
        sqlx::query("SELECT 1 FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::PlayerNotFound(player_id))?;

        let rows = sqlx::query(
            r#"
            SELECT e.id, e.match_id, e.team_id, e.player_id, e.event_type, e.minute,
                   e.additional_time, e.description, e.created_at,
                   m.match_date, t.name AS tournament_name
            FROM match_events e
            JOIN matches m ON m.id = e.match_id
            LEFT JOIN tournaments t ON t.id = m.tournament_id
            WHERE e.player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                Ok(PlayerEventRecord {
                    event: event_from_row(row)?,
                    match_date: row.get::<NaiveDateTime, _>("match_date").and_utc(),
                    tournament_name: row.get("tournament_name"),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(player_statistics(player_id, &records))
    }

    /// Scoring chart for a tournament
    pub async fn tournament_top_scorers(
        &self,
        tournament_id: TournamentId,
        limit: usize,
    ) -> CoreResult<Vec<ScorerLine>> {
        sqlx::query("SELECT 1 FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::TournamentNotFound(tournament_id))?;

        let goals = sqlx::query(
            r#"
            SELECT e.player_id, u.name AS player_name, e.team_id, tm.name AS team_name
            FROM match_events e
            JOIN matches m ON m.id = e.match_id
            LEFT JOIN players p ON p.id = e.player_id
            LEFT JOIN users u ON u.id = p.user_id
            LEFT JOIN teams tm ON tm.id = e.team_id
            WHERE m.tournament_id = $1
              AND e.event_type = 'goal'
              AND e.player_id IS NOT NULL
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool.as_ref())
        .await?
        .iter()
        .map(goal_from_row)
        .collect::<Vec<_>>();

        Ok(rank_scorers(&goals, limit))
    }
}

fn goal_from_row(row: &PgRow) -> GoalRecord {
    GoalRecord {
        player_id: row.get("player_id"),
        player_name: row.get("player_name"),
        team_id: row.get("team_id"),
        team_name: row.get("team_name"),
    }
}
