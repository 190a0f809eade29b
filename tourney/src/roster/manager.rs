//! Roster manager: teams, players and memberships.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    models::{
        AddPlayerOutcome, AddPlayerRequest, MembershipStatus, NewPlayer, NewTeam, Player,
        PlayerId, Team, TeamId, TeamPlayer,
    },
    rules::{check_jersey_change, plan_addition},
};
use crate::{
    access::{Action, Actor, Resource, Role, authorize},
    db::unique_violation,
    errors::{CoreError, CoreResult},
};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::sync::Arc;

const MEMBERSHIP_COLUMNS: &str =
    "id, team_id, player_id, jersey_number, position, is_captain, is_active, joined_date, left_date";

/// Roster manager
#[derive(Clone)]
pub struct RosterManager {
    pool: Arc<PgPool>,
}

impl RosterManager {
    /// Create a new roster manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a team. A team manager creating a team becomes its manager.
    pub async fn create_team(&self, actor: &Actor, input: NewTeam) -> CoreResult<Team> {
        input.validate()?;
        authorize(
            actor,
            &Resource::Team {
                manager_id: input.manager_id,
            },
            Action::Create,
        )?;

        let manager_id = match (input.manager_id, actor.role) {
            (None, Role::TeamManager) => Some(actor.user_id),
            (manager_id, _) => manager_id,
        };

        let row = sqlx::query(
            r#"
            INSERT INTO teams (name, short_name, manager_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, short_name, manager_id, is_active, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.short_name)
        .bind(manager_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        log::info!("Created team {} by user {}", row.get::<i64, _>("id"), actor.user_id);
        Ok(team_from_row(&row))
    }

    /// Get a team by ID
    pub async fn get_team(&self, team_id: TeamId) -> CoreResult<Team> {
        let row = sqlx::query(
            "SELECT id, name, short_name, manager_id, is_active, created_at FROM teams WHERE id = $1",
        )
        .bind(team_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CoreError::TeamNotFound(team_id))?;

        Ok(team_from_row(&row))
    }

    /// Create the player profile for a user account
    pub async fn create_player(&self, actor: &Actor, input: NewPlayer) -> CoreResult<Player> {
        input.validate()?;
        authorize(
            actor,
            &Resource::Player {
                user_id: input.user_id,
            },
            Action::Create,
        )?;

        let mut tx = self.pool.begin().await?;

        let name: String = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(input.user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::UserNotFound(input.user_id))?;

        let row = sqlx::query(
            r#"
            INSERT INTO players (user_id, position, nationality, height_cm, weight_kg, preferred_foot)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, position, nationality, height_cm, weight_kg, preferred_foot
            "#,
        )
        .bind(input.user_id)
        .bind(&input.position)
        .bind(&input.nationality)
        .bind(input.height_cm)
        .bind(input.weight_kg)
        .bind(&input.preferred_foot)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => CoreError::validation(format!(
                "user {} already has a player profile",
                input.user_id
            )),
            None => CoreError::Database(e),
        })?;

        tx.commit().await?;
        Ok(player_from_row(&row, name))
    }

    /// Get a player by ID
    pub async fn get_player(&self, player_id: PlayerId) -> CoreResult<Player> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.user_id, p.position, p.nationality, p.height_cm, p.weight_kg,
                   p.preferred_foot, u.name
            FROM players p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(player_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CoreError::PlayerNotFound(player_id))?;

        let name = row.get("name");
        Ok(player_from_row(&row, name))
    }

    /// Put a player on a team
    ///
    /// Locks the team row and then the player row. Two teams adding the same
    /// player are serialised on the player, so the second sees the first
    /// membership. The partial unique indexes on `team_players` catch
    /// anything that still slips through and are reported as the matching
    /// conflict.
    ///
    /// # Errors
    ///
    /// * `CoreError::AlreadyOnTeam` - Player already active on this team
    /// * `CoreError::PlayerAlreadyRostered` - Player active on another team (non-admins)
    /// * `CoreError::JerseyNumberTaken` - Number in use and no reassignment was authorized
    /// * `CoreError::CaptainAlreadyAssigned` - Team has a captain and no override was given
    pub async fn add_player_to_team(
        &self,
        actor: &Actor,
        request: AddPlayerRequest,
    ) -> CoreResult<AddPlayerOutcome> {
        let mut tx = self.pool.begin().await?;

        let manager_id = lock_team(&mut tx, request.team_id).await?;
        authorize(actor, &Resource::Team { manager_id }, Action::ManageRoster)?;

        sqlx::query("SELECT id FROM players WHERE id = $1 FOR UPDATE")
            .bind(request.player_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::PlayerNotFound(request.player_id))?;

        let roster = active_roster(&mut tx, request.team_id).await?;

        let active_elsewhere: Option<TeamId> = sqlx::query_scalar(
            r#"
            SELECT team_id FROM team_players
            WHERE player_id = $1 AND is_active AND team_id <> $2
            LIMIT 1
            "#,
        )
        .bind(request.player_id)
        .bind(request.team_id)
        .fetch_optional(&mut *tx)
        .await?;

        let plan = plan_addition(actor, &request, &roster, active_elsewhere)?;

        if let Some(reassign) = &plan.reassign {
            sqlx::query(
                r#"
                UPDATE team_players SET jersey_number = $3
                WHERE team_id = $1 AND player_id = $2 AND is_active
                "#,
            )
            .bind(request.team_id)
            .bind(reassign.player_id)
            .bind(reassign.to)
            .execute(&mut *tx)
            .await?;

            log::warn!(
                "Admin {} moved player {} on team {} from #{} to #{}",
                actor.user_id,
                reassign.player_id,
                request.team_id,
                reassign.from,
                reassign.to
            );
        }

        if let Some(captain) = plan.demote_captain {
            sqlx::query(
                r#"
                UPDATE team_players SET is_captain = FALSE
                WHERE team_id = $1 AND player_id = $2 AND is_active
                "#,
            )
            .bind(request.team_id)
            .bind(captain)
            .execute(&mut *tx)
            .await?;

            log::warn!(
                "Admin {} demoted captain {} on team {}",
                actor.user_id,
                captain,
                request.team_id
            );
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO team_players (team_id, player_id, jersey_number, position, is_captain, joined_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(request.team_id)
        .bind(request.player_id)
        .bind(request.jersey_number)
        .bind(&request.position)
        .bind(request.is_captain)
        .bind(request.joined_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| roster_conflict(e, &request))?;

        tx.commit().await?;

        log::info!(
            "Player {} joined team {} wearing #{}",
            request.player_id,
            request.team_id,
            request.jersey_number
        );

        Ok(AddPlayerOutcome {
            membership: membership_from_row(&row)?,
            reassigned: plan.reassign,
            demoted_captain: plan.demote_captain,
        })
    }

    /// Close a player's active membership. History is kept.
    pub async fn remove_player_from_team(
        &self,
        actor: &Actor,
        team_id: TeamId,
        player_id: PlayerId,
    ) -> CoreResult<TeamPlayer> {
        let mut tx = self.pool.begin().await?;

        let manager_id = lock_team(&mut tx, team_id).await?;
        authorize(actor, &Resource::Team { manager_id }, Action::ManageRoster)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE team_players
            SET is_active = FALSE, left_date = NOW() AT TIME ZONE 'utc'
            WHERE team_id = $1 AND player_id = $2 AND is_active
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(team_id)
        .bind(player_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::MembershipNotFound { team_id, player_id })?;

        tx.commit().await?;
        log::info!("Player {} left team {}", player_id, team_id);
        membership_from_row(&row)
    }

    /// Give an active member a different jersey number
    pub async fn reassign_jersey(
        &self,
        actor: &Actor,
        team_id: TeamId,
        player_id: PlayerId,
        jersey_number: i32,
    ) -> CoreResult<TeamPlayer> {
        let mut tx = self.pool.begin().await?;

        let manager_id = lock_team(&mut tx, team_id).await?;
        authorize(actor, &Resource::Team { manager_id }, Action::ManageRoster)?;

        let roster = active_roster(&mut tx, team_id).await?;
        check_jersey_change(team_id, player_id, jersey_number, &roster)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE team_players SET jersey_number = $3
            WHERE team_id = $1 AND player_id = $2 AND is_active
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(team_id)
        .bind(player_id)
        .bind(jersey_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => CoreError::JerseyNumberTaken {
                team_id,
                jersey_number,
            },
            None => CoreError::Database(e),
        })?;

        tx.commit().await?;
        membership_from_row(&row)
    }

    /// Active members of a team, by jersey number
    pub async fn list_roster(&self, team_id: TeamId) -> CoreResult<Vec<TeamPlayer>> {
        self.get_team(team_id).await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS} FROM team_players
            WHERE team_id = $1 AND is_active
            ORDER BY jersey_number
            "#
        ))
        .bind(team_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(membership_from_row).collect()
    }

    /// Every membership a player has held, newest first
    pub async fn player_memberships(&self, player_id: PlayerId) -> CoreResult<Vec<TeamPlayer>> {
        self.get_player(player_id).await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS} FROM team_players
            WHERE player_id = $1
            ORDER BY joined_date DESC, id DESC
            "#
        ))
        .bind(player_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(membership_from_row).collect()
    }

    /// Players without an active membership on any team, by name
    pub async fn available_players(&self) -> CoreResult<Vec<Player>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.user_id, p.position, p.nationality, p.height_cm, p.weight_kg,
                   p.preferred_foot, u.name
            FROM players p
            JOIN users u ON u.id = p.user_id
            WHERE NOT EXISTS (
                SELECT 1 FROM team_players tp WHERE tp.player_id = p.id AND tp.is_active
            )
            ORDER BY u.name, p.id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .iter()
            .map(|row| player_from_row(row, row.get("name")))
            .collect())
    }

    /// Players a team could sign; the team must exist
    pub async fn available_players_for_team(&self, team_id: TeamId) -> CoreResult<Vec<Player>> {
        self.get_team(team_id).await?;
        self.available_players().await
    }
}

/// Lock a team row and return its manager
async fn lock_team(conn: &mut PgConnection, team_id: TeamId) -> CoreResult<Option<i64>> {
    let row = sqlx::query("SELECT manager_id FROM teams WHERE id = $1 FOR UPDATE")
        .bind(team_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(CoreError::TeamNotFound(team_id))?;

    Ok(row.get("manager_id"))
}

async fn active_roster(conn: &mut PgConnection, team_id: TeamId) -> CoreResult<Vec<TeamPlayer>> {
    let rows = sqlx::query(&format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM team_players WHERE team_id = $1 AND is_active"
    ))
    .bind(team_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(membership_from_row).collect()
}

/// Translate a unique index violation on `team_players` into the roster conflict it represents
fn roster_conflict(err: sqlx::Error, request: &AddPlayerRequest) -> CoreError {
    match unique_violation(&err).as_deref() {
        Some("team_players_active_jersey_idx") => CoreError::JerseyNumberTaken {
            team_id: request.team_id,
            jersey_number: request.jersey_number,
        },
        Some("team_players_active_captain_idx") => {
            CoreError::CaptainAlreadyAssigned(request.team_id)
        }
        Some(_) => CoreError::AlreadyOnTeam {
            team_id: request.team_id,
            player_id: request.player_id,
        },
        None => CoreError::Database(err),
    }
}

fn team_from_row(row: &PgRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
        short_name: row.get("short_name"),
        manager_id: row.get("manager_id"),
        is_active: row.get("is_active"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn player_from_row(row: &PgRow, name: String) -> Player {
    Player {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name,
        position: row.get("position"),
        nationality: row.get("nationality"),
        height_cm: row.get("height_cm"),
        weight_kg: row.get("weight_kg"),
        preferred_foot: row.get("preferred_foot"),
    }
}

fn membership_from_row(row: &PgRow) -> CoreResult<TeamPlayer> {
    let left_date = row
        .get::<Option<NaiveDateTime>, _>("left_date")
        .map(|t| t.and_utc());

    Ok(TeamPlayer {
        id: row.get("id"),
        team_id: row.get("team_id"),
        player_id: row.get("player_id"),
        jersey_number: row.get("jersey_number"),
        position: row.get("position"),
        is_captain: row.get("is_captain"),
        joined_date: row.get("joined_date"),
        status: MembershipStatus::from_columns(row.get("is_active"), left_date)?,
    })
}
