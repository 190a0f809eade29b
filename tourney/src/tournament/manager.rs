//! Tournament manager: lifecycle, details and team registrations.
#![allow(clippy::needless_raw_string_hashes)]

use super::{
    models::{
        NewTournament, RegistrationDecision, RegistrationStatus, Tournament, TournamentId,
        TournamentRegistration, TournamentStatus, TournamentUpdate,
    },
    registration::RegistrationContext,
};
use crate::{
    access::{Action, Actor, Resource, authorize},
    db::unique_violation,
    errors::{CoreError, CoreResult},
    roster::TeamId,
    standings::manager::rebuild_standings,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::sync::Arc;

const TOURNAMENT_COLUMNS: &str = "id, name, description, tournament_type, status, max_teams, \
     registration_start, registration_end, starts_at, ends_at, created_by, created_at";

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    pool: Arc<PgPool>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a tournament in `draft`
    ///
    /// # Errors
    ///
    /// * `CoreError::Unauthorized` - Only admins create tournaments
    /// * `CoreError::Validation` - Name, capacity or dates are invalid
    pub async fn create_tournament(
        &self,
        actor: &Actor,
        input: NewTournament,
    ) -> CoreResult<Tournament> {
        authorize(
            actor,
            &Resource::Tournament { created_by: None },
            Action::Create,
        )?;
        input.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tournaments (name, description, tournament_type, status, max_teams,
                                     registration_start, registration_end, starts_at, ends_at, created_by)
            VALUES ($1, $2, $3, 'draft', $4, $5, $6, $7, $8, $9)
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.tournament_type.as_str())
        .bind(input.max_teams as i32)
        .bind(input.registration.start.naive_utc())
        .bind(input.registration.end.naive_utc())
        .bind(input.starts_at.naive_utc())
        .bind(input.ends_at.map(|t| t.naive_utc()))
        .bind(actor.user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let tournament = tournament_from_row(&row)?;
        log::info!(
            "Created tournament {} ({}) by user {}",
            tournament.id,
            tournament.name,
            actor.user_id
        );
        Ok(tournament)
    }

    /// Get a tournament by ID
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> CoreResult<Tournament> {
        let row = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
        ))
        .bind(tournament_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CoreError::TournamentNotFound(tournament_id))?;

        tournament_from_row(&row)
    }

    /// List tournaments, newest first, optionally filtered by status
    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> CoreResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TOURNAMENT_COLUMNS}
            FROM tournaments
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY starts_at DESC, id DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(tournament_from_row).collect()
    }

    /// Edit name, description, capacity or registration window
    ///
    /// # Errors
    ///
    /// * `CoreError::TournamentLocked` - The tournament is in progress or finished
    /// * `CoreError::Validation` - Capacity would drop below the approved entrants
    pub async fn update_details(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        update: TournamentUpdate,
    ) -> CoreResult<Tournament> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        authorize(
            actor,
            &Resource::Tournament {
                created_by: tournament.created_by,
            },
            Action::Update,
        )?;

        if !tournament.status.accepts_edits() {
            return Err(CoreError::TournamentLocked {
                tournament_id,
                status: tournament.status,
            });
        }

        if let Some(max_teams) = update.max_teams {
            let approved = count_approved(&mut tx, tournament_id).await?;
            if max_teams < approved {
                return Err(CoreError::validation(format!(
                    "max_teams {max_teams} is below the {approved} approved entrants"
                )));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE tournaments
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                max_teams = COALESCE($4, max_teams),
                registration_start = COALESCE($5, registration_start),
                registration_end = COALESCE($6, registration_end),
                updated_at = NOW() AT TIME ZONE 'utc'
            WHERE id = $1
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        ))
        .bind(tournament_id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.max_teams.map(|m| m as i32))
        .bind(update.registration.map(|w| w.start.naive_utc()))
        .bind(update.registration.map(|w| w.end.naive_utc()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tournament_from_row(&row)
    }

    /// Move a tournament along its lifecycle
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidTransition` - The move is backwards or out of a terminal state
    pub async fn update_status(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        next: TournamentStatus,
    ) -> CoreResult<Tournament> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        authorize(
            actor,
            &Resource::Tournament {
                created_by: tournament.created_by,
            },
            Action::Update,
        )?;

        if !tournament.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "tournament",
                from: tournament.status.to_string(),
                to: next.to_string(),
            });
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE tournaments
            SET status = $2, updated_at = NOW() AT TIME ZONE 'utc'
            WHERE id = $1
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        ))
        .bind(tournament_id)
        .bind(next.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!(
            "Tournament {} moved from {} to {}",
            tournament_id,
            tournament.status,
            next
        );
        tournament_from_row(&row)
    }

    /// Enter a team into a tournament
    ///
    /// The tournament row is locked for the duration so that concurrent
    /// registrations cannot both pass the capacity check. An approved entry
    /// gets its zero row in the standings before the transaction commits.
    ///
    /// # Errors
    ///
    /// * `CoreError::RegistrationClosed` - Outside the window (non-admins)
    /// * `CoreError::TournamentFull` - Approved entrants reached `max_teams` (non-admins)
    /// * `CoreError::EmptyRoster` - Team has no active players (non-admins)
    /// * `CoreError::AlreadyRegistered` - Team already has an entry
    pub async fn register_team(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> CoreResult<TournamentRegistration> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        let team = sqlx::query("SELECT manager_id FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::TeamNotFound(team_id))?;

        authorize(
            actor,
            &Resource::Team {
                manager_id: team.get("manager_id"),
            },
            Action::RegisterTeam,
        )?;

        let already_registered = sqlx::query(
            "SELECT 1 FROM tournament_registrations WHERE tournament_id = $1 AND team_id = $2",
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

        let active_players: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_players WHERE team_id = $1 AND is_active",
        )
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;

        let context = RegistrationContext {
            tournament: &tournament,
            team_id,
            already_registered,
            approved_count: count_approved(&mut tx, tournament_id).await?,
            active_players: active_players as u32,
            now: Utc::now(),
        };
        let status = context.evaluate(actor)?;

        let row = sqlx::query(
            r#"
            INSERT INTO tournament_registrations (tournament_id, team_id, status)
            VALUES ($1, $2, $3)
            RETURNING tournament_id, team_id, status, registration_date, group_name, seed
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => CoreError::AlreadyRegistered {
                tournament_id,
                team_id,
            },
            None => CoreError::Database(e),
        })?;

        if status == RegistrationStatus::Approved {
            rebuild_standings(&mut tx, tournament_id).await?;
        }

        tx.commit().await?;
        log::info!(
            "Team {} registered for tournament {} ({})",
            team_id,
            tournament_id,
            status
        );
        registration_from_row(&row)
    }

    /// Approve or reject a pending registration
    ///
    /// Approval re-checks capacity and rebuilds the standings in the same
    /// transaction, under the tournament lock.
    pub async fn decide_registration(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        team_id: TeamId,
        decision: RegistrationDecision,
    ) -> CoreResult<TournamentRegistration> {
        authorize(
            actor,
            &Resource::Tournament { created_by: None },
            Action::DecideRegistration,
        )?;

        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        if tournament.status.is_terminal() {
            return Err(CoreError::TournamentLocked {
                tournament_id,
                status: tournament.status,
            });
        }

        let current: String = sqlx::query_scalar(
            r#"
            SELECT status FROM tournament_registrations
            WHERE tournament_id = $1 AND team_id = $2
            FOR UPDATE
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::RegistrationNotFound {
            tournament_id,
            team_id,
        })?;
        let current: RegistrationStatus = current.parse()?;
        let next = decision.status();

        if current != RegistrationStatus::Pending {
            return Err(CoreError::InvalidTransition {
                entity: "registration",
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        if next == RegistrationStatus::Approved && !actor.skips_checks() {
            let approved = count_approved(&mut tx, tournament_id).await?;
            if approved >= tournament.max_teams {
                return Err(CoreError::TournamentFull {
                    tournament_id,
                    max_teams: tournament.max_teams,
                });
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE tournament_registrations
            SET status = $3,
                group_name = COALESCE($4, group_name),
                seed = COALESCE($5, seed)
            WHERE tournament_id = $1 AND team_id = $2
            RETURNING tournament_id, team_id, status, registration_date, group_name, seed
            "#,
        )
        .bind(tournament_id)
        .bind(team_id)
        .bind(next.as_str())
        .bind(&decision.group_name)
        .bind(decision.seed)
        .fetch_one(&mut *tx)
        .await?;

        if next == RegistrationStatus::Approved {
            rebuild_standings(&mut tx, tournament_id).await?;
        }

        tx.commit().await?;
        log::info!(
            "Registration of team {} in tournament {} is now {}",
            team_id,
            tournament_id,
            next
        );
        registration_from_row(&row)
    }

    /// List a tournament's registrations, optionally by status
    pub async fn list_registrations(
        &self,
        tournament_id: TournamentId,
        status: Option<RegistrationStatus>,
    ) -> CoreResult<Vec<TournamentRegistration>> {
        self.get_tournament(tournament_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT tournament_id, team_id, status, registration_date, group_name, seed
            FROM tournament_registrations
            WHERE tournament_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY group_name NULLS LAST, seed NULLS LAST, registration_date, team_id
            "#,
        )
        .bind(tournament_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(registration_from_row).collect()
    }
}

/// Lock a tournament row for writing within a transaction
pub(crate) async fn lock_tournament(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> CoreResult<Tournament> {
    let row = sqlx::query(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 FOR UPDATE"
    ))
    .bind(tournament_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CoreError::TournamentNotFound(tournament_id))?;

    tournament_from_row(&row)
}

/// Take a shared lock so the tournament status cannot change underneath us
pub(crate) async fn share_tournament(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> CoreResult<Tournament> {
    let row = sqlx::query(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 FOR SHARE"
    ))
    .bind(tournament_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(CoreError::TournamentNotFound(tournament_id))?;

    tournament_from_row(&row)
}

async fn count_approved(conn: &mut PgConnection, tournament_id: TournamentId) -> CoreResult<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tournament_registrations WHERE tournament_id = $1 AND status = 'approved'",
    )
    .bind(tournament_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count as u32)
}

fn utc(row: &PgRow, column: &str) -> DateTime<Utc> {
    row.get::<NaiveDateTime, _>(column).and_utc()
}

pub(crate) fn tournament_from_row(row: &PgRow) -> CoreResult<Tournament> {
    Ok(Tournament {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        tournament_type: row.get::<String, _>("tournament_type").parse()?,
        status: row.get::<String, _>("status").parse()?,
        max_teams: row.get::<i32, _>("max_teams") as u32,
        registration: super::models::DateWindow {
            start: utc(row, "registration_start"),
            end: utc(row, "registration_end"),
        },
        starts_at: utc(row, "starts_at"),
        ends_at: row
            .get::<Option<NaiveDateTime>, _>("ends_at")
            .map(|t| t.and_utc()),
        created_by: row.get("created_by"),
        created_at: utc(row, "created_at"),
    })
}

fn registration_from_row(row: &PgRow) -> CoreResult<TournamentRegistration> {
    Ok(TournamentRegistration {
        tournament_id: row.get("tournament_id"),
        team_id: row.get("team_id"),
        status: row.get::<String, _>("status").parse()?,
        registration_date: utc(row, "registration_date"),
        group_name: row.get("group_name"),
        seed: row.get("seed"),
    })
}
