//! Access control data models.

use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User ID type
pub type UserId = i64;

/// Role held by a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    TeamManager,
    Player,
    Referee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::TeamManager => "team_manager",
            Role::Player => "player",
            Role::Referee => "referee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "team_manager" => Ok(Role::TeamManager),
            "player" => Ok(Role::Player),
            "referee" => Ok(Role::Referee),
            other => Err(CoreError::CorruptValue {
                column: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// The authenticated caller of an operation.
///
/// `admin_override` asks the engine to skip the checks an admin is allowed to
/// skip (jersey displacement, captain replacement). It has no effect for any
/// other role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub admin_override: bool,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            admin_override: false,
        }
    }

    /// Request the admin override for this call
    pub fn with_override(mut self, admin_override: bool) -> Self {
        self.admin_override = admin_override;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True only for an admin that explicitly asked for the override.
    pub fn skips_checks(&self) -> bool {
        self.is_admin() && self.admin_override
    }
}

/// The thing an action is performed on, carrying the ownership facts the
/// policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tournament { created_by: Option<UserId> },
    Team { manager_id: Option<UserId> },
    Player { user_id: UserId },
    Match { referee_id: Option<UserId> },
    Standings,
}

/// What the actor wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    ManageRoster,
    RegisterTeam,
    DecideRegistration,
    ScheduleMatch,
    OfficiateMatch,
    Recompute,
}

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl From<&AccessTokenClaims> for Actor {
    fn from(claims: &AccessTokenClaims) -> Self {
        Actor::new(claims.sub, claims.role)
    }
}
