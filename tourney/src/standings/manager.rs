//! Standings manager: incremental updates, full recomputes and table reads.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    models::{Standing, StandingDelta},
    table::{StandingsTable, rank},
};
use crate::{
    access::{Action, Actor, Resource, authorize},
    errors::{CoreError, CoreResult},
    matches::{Match, manager::fetch_completed_matches},
    roster::TeamId,
    tournament::{TournamentId, manager::lock_tournament},
};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::sync::Arc;

const STANDING_COLUMNS: &str = "tournament_id, team_id, group_name, played, won, drawn, lost, \
     goals_for, goals_against, goal_difference, points, position";

/// Standings manager
#[derive(Clone)]
pub struct StandingsManager {
    pool: Arc<PgPool>,
}

impl StandingsManager {
    /// Create a new standings manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Fold a completed match into its tournament's table in a transaction of
    /// its own. Match completion uses [`apply_match_result`] inside its own
    /// transaction instead.
    pub async fn apply_match_result(&self, m: &Match) -> CoreResult<()> {
        let mut tx = self.pool.begin().await?;
        apply_match_result(&mut tx, m).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Rebuild a tournament's table from its approved entrants and completed matches
    ///
    /// Running it twice without intervening writes yields the same table.
    pub async fn recompute(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
    ) -> CoreResult<Vec<Standing>> {
        authorize(actor, &Resource::Standings, Action::Recompute)?;

        let mut tx = self.pool.begin().await?;
        // Completions and approvals wait on this lock until the rebuilt rows commit.
        lock_tournament(&mut tx, tournament_id).await?;
        let ranked = rebuild_standings(&mut tx, tournament_id).await?;
        tx.commit().await?;

        Ok(ranked)
    }

    /// The ranked table, optionally for one group
    ///
    /// Positions are assigned on read, within whatever subset is returned.
    pub async fn list_standings(
        &self,
        tournament_id: TournamentId,
        group_name: Option<&str>,
    ) -> CoreResult<Vec<Standing>> {
        sqlx::query("SELECT 1 FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(CoreError::TournamentNotFound(tournament_id))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {STANDING_COLUMNS} FROM standings
            WHERE tournament_id = $1 AND ($2::TEXT IS NULL OR group_name = $2)
            "#
        ))
        .bind(tournament_id)
        .bind(group_name)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rank(rows.iter().map(standing_from_row).collect()))
    }
}

/// Replace a tournament's stored rows with a replay of its approved entrants
/// and completed matches. The caller must hold the tournament lock and owns
/// the transaction, so the rebuild commits or rolls back with its write.
pub(crate) async fn rebuild_standings(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> CoreResult<Vec<Standing>> {
    let entrants: Vec<(TeamId, Option<String>)> = sqlx::query(
        r#"
        SELECT team_id, group_name FROM tournament_registrations
        WHERE tournament_id = $1 AND status = 'approved'
        "#,
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(|row| (row.get("team_id"), row.get("group_name")))
    .collect();

    let matches = fetch_completed_matches(conn, tournament_id).await?;
    let ranked = StandingsTable::replay(tournament_id, entrants, &matches)?.into_ranked();

    sqlx::query("DELETE FROM standings WHERE tournament_id = $1")
        .bind(tournament_id)
        .execute(&mut *conn)
        .await?;

    for row in &ranked {
        sqlx::query(
            r#"
            INSERT INTO standings (tournament_id, team_id, group_name, played, won, drawn, lost,
                                   goals_for, goals_against, goal_difference, points, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.tournament_id)
        .bind(row.team_id)
        .bind(&row.group_name)
        .bind(row.played)
        .bind(row.won)
        .bind(row.drawn)
        .bind(row.lost)
        .bind(row.goals_for)
        .bind(row.goals_against)
        .bind(row.goal_difference)
        .bind(row.points)
        .bind(row.position.map(|p| p as i32))
        .execute(&mut *conn)
        .await?;
    }

    log::info!(
        "Rebuilt standings for tournament {} ({} teams, {} matches)",
        tournament_id,
        ranked.len(),
        matches.len()
    );
    Ok(ranked)
}

/// Add one completed match to both teams' rows, creating rows on first
/// appearance. Runs on the caller's connection so it commits or rolls back
/// together with the match update.
pub(crate) async fn apply_match_result(conn: &mut PgConnection, m: &Match) -> CoreResult<()> {
    for delta in StandingDelta::for_match(m)? {
        upsert_delta(conn, m.tournament_id, &delta).await?;
    }

    log::debug!(
        "Applied match {} to standings of tournament {}",
        m.id,
        m.tournament_id
    );
    Ok(())
}

async fn upsert_delta(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
    delta: &StandingDelta,
) -> CoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO standings (tournament_id, team_id, group_name, played, won, drawn, lost,
                               goals_for, goals_against, goal_difference, points)
        VALUES (
            $1, $2,
            (SELECT group_name FROM tournament_registrations WHERE tournament_id = $1 AND team_id = $2),
            1, $3, $4, $5, $6, $7, $8, $9
        )
        ON CONFLICT (tournament_id, team_id) DO UPDATE SET
            played = standings.played + 1,
            won = standings.won + EXCLUDED.won,
            drawn = standings.drawn + EXCLUDED.drawn,
            lost = standings.lost + EXCLUDED.lost,
            goals_for = standings.goals_for + EXCLUDED.goals_for,
            goals_against = standings.goals_against + EXCLUDED.goals_against,
            goal_difference = standings.goal_difference + EXCLUDED.goal_difference,
            points = standings.points + EXCLUDED.points,
            position = NULL,
            updated_at = NOW() AT TIME ZONE 'utc'
        "#,
    )
    .bind(tournament_id)
    .bind(delta.team_id)
    .bind(delta.won)
    .bind(delta.drawn)
    .bind(delta.lost)
    .bind(delta.goals_for)
    .bind(delta.goals_against)
    .bind(delta.goals_for - delta.goals_against)
    .bind(delta.points())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn standing_from_row(row: &PgRow) -> Standing {
    Standing {
        tournament_id: row.get("tournament_id"),
        team_id: row.get("team_id"),
        group_name: row.get("group_name"),
        played: row.get("played"),
        won: row.get("won"),
        drawn: row.get("drawn"),
        lost: row.get("lost"),
        goals_for: row.get("goals_for"),
        goals_against: row.get("goals_against"),
        goal_difference: row.get("goal_difference"),
        points: row.get("points"),
        position: row.get::<Option<i32>, _>("position").map(|p| p as u32),
    }
}
