//! Error types shared by every manager in the crate.
//!
//! Each variant belongs to exactly one [`ErrorKind`], which is what the HTTP
//! layer maps onto status codes. Database errors never leak to clients; use
//! [`CoreError::client_message`] when rendering an error for a caller.

use crate::{
    access::UserId,
    matches::{MatchId, MatchStatus},
    roster::{PlayerId, TeamId},
    tournament::{TournamentId, TournamentStatus},
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    ConflictViolation,
    ValidationFailed,
    Unauthorized,
    Timeout,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::ConflictViolation => "conflict_violation",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{name}")
    }
}

/// Competition errors
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Player {player_id} has no active membership on team {team_id}")]
    MembershipNotFound { team_id: TeamId, player_id: PlayerId },

    #[error("Team {team_id} has no registration for tournament {tournament_id}")]
    RegistrationNotFound {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Tournament {tournament_id} is {status} and can no longer be edited")]
    TournamentLocked {
        tournament_id: TournamentId,
        status: TournamentStatus,
    },

    #[error("Match {0} is already completed")]
    MatchAlreadyCompleted(MatchId),

    #[error("Match {match_id} is {status}, expected {expected}")]
    MatchNotInStatus {
        match_id: MatchId,
        status: MatchStatus,
        expected: MatchStatus,
    },

    #[error("Registration is closed for tournament {0}")]
    RegistrationClosed(TournamentId),

    #[error("Tournament {tournament_id} is full ({max_teams} teams)")]
    TournamentFull {
        tournament_id: TournamentId,
        max_teams: u32,
    },

    #[error("Team {0} has no active players")]
    EmptyRoster(TeamId),

    #[error("Team {team_id} is not playing in match {match_id}")]
    TeamNotInMatch { match_id: MatchId, team_id: TeamId },

    #[error("Team {team_id} is not an approved entrant of tournament {tournament_id}")]
    TeamNotEntered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    #[error("Player {player_id} is already on team {team_id}")]
    AlreadyOnTeam { team_id: TeamId, player_id: PlayerId },

    #[error("Player {player_id} is already active on team {team_id}")]
    PlayerAlreadyRostered { player_id: PlayerId, team_id: TeamId },

    #[error("Jersey number {jersey_number} is already taken on team {team_id}")]
    JerseyNumberTaken { team_id: TeamId, jersey_number: i32 },

    #[error("Team {0} already has a captain")]
    CaptainAlreadyAssigned(TeamId),

    #[error("Team {0} has no free jersey number")]
    NoFreeJerseyNumber(TeamId),

    #[error("Team {team_id} is already registered for tournament {tournament_id}")]
    AlreadyRegistered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected value {value:?} in column {column}")]
    CorruptValue { column: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl CoreError {
    /// The kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use CoreError::*;

        match self {
            TournamentNotFound(_)
            | TeamNotFound(_)
            | PlayerNotFound(_)
            | UserNotFound(_)
            | MatchNotFound(_)
            | MembershipNotFound { .. }
            | RegistrationNotFound { .. } => ErrorKind::NotFound,

            InvalidTransition { .. }
            | TournamentLocked { .. }
            | MatchAlreadyCompleted(_)
            | MatchNotInStatus { .. }
            | RegistrationClosed(_)
            | TournamentFull { .. }
            | EmptyRoster(_) => ErrorKind::InvalidState,

            AlreadyOnTeam { .. }
            | PlayerAlreadyRostered { .. }
            | JerseyNumberTaken { .. }
            | CaptainAlreadyAssigned(_)
            | NoFreeJerseyNumber(_)
            | AlreadyRegistered { .. } => ErrorKind::ConflictViolation,

            Validation(_) | TeamNotInMatch { .. } | TeamNotEntered { .. } => {
                ErrorKind::ValidationFailed
            }

            Unauthorized(_) | InvalidToken(_) => ErrorKind::Unauthorized,
            Timeout(_) => ErrorKind::Timeout,
            CorruptValue { .. } | Database(_) | Migration(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak internals
    pub fn client_message(&self) -> String {
        match self {
            CoreError::Database(_) | CoreError::Migration(_) | CoreError::CorruptValue { .. } => {
                "Internal server error".to_string()
            }
            CoreError::InvalidToken(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}

/// Result type for competition operations
pub type CoreResult<T> = Result<T, CoreError>;
