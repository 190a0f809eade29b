//! Tournament data models.

use crate::{access::UserId, errors::CoreError, roster::TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tournament ID type
pub type TournamentId = i64;

/// Smallest and largest field a tournament may have
pub const MIN_TEAMS: u32 = 2;
pub const MAX_TEAMS: u32 = 64;

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    League,
    Knockout,
    GroupKnockout,
}

impl TournamentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentType::League => "league",
            TournamentType::Knockout => "knockout",
            TournamentType::GroupKnockout => "group_knockout",
        }
    }
}

impl FromStr for TournamentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "league" => Ok(TournamentType::League),
            "knockout" => Ok(TournamentType::Knockout),
            "group_knockout" => Ok(TournamentType::GroupKnockout),
            other => Err(CoreError::CorruptValue {
                column: "tournament_type",
                value: other.to_string(),
            }),
        }
    }
}

/// Tournament lifecycle state
///
/// Moves forward only: `draft -> registration_open -> in_progress -> completed`.
/// Any non-terminal state may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Draft,
    RegistrationOpen,
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::RegistrationOpen => "registration_open",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }

    /// Details (name, capacity, dates) may only change before play starts.
    pub fn accepts_edits(&self) -> bool {
        matches!(
            self,
            TournamentStatus::Draft | TournamentStatus::RegistrationOpen
        )
    }

    /// Whether the lifecycle permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;

        match (self, next) {
            (Draft, RegistrationOpen) => true,
            (RegistrationOpen, InProgress) => true,
            (InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TournamentStatus::Draft),
            "registration_open" => Ok(TournamentStatus::RegistrationOpen),
            "in_progress" => Ok(TournamentStatus::InProgress),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(CoreError::CorruptValue {
                column: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Half-open time window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::validation(
                "window start must be before its end",
            ));
        }
        Ok(Self { start, end })
    }

    /// `start <= now < end`
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub tournament_type: TournamentType,
    pub status: TournamentStatus,
    pub max_teams: u32,
    pub registration: DateWindow,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Status is `registration_open` and `now` falls inside the window.
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        self.status == TournamentStatus::RegistrationOpen && self.registration.contains(now)
    }
}

/// Input for creating a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub description: Option<String>,
    pub tournament_type: TournamentType,
    pub max_teams: u32,
    pub registration: DateWindow,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl NewTournament {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("tournament name must not be empty"));
        }
        validate_capacity(self.max_teams)?;
        if self.registration.start >= self.registration.end {
            return Err(CoreError::validation(
                "registration start must be before its end",
            ));
        }
        if self.starts_at < self.registration.end {
            return Err(CoreError::validation(
                "tournament must start after registration closes",
            ));
        }
        if let Some(ends_at) = self.ends_at
            && ends_at <= self.starts_at
        {
            return Err(CoreError::validation(
                "tournament must end after it starts",
            ));
        }
        Ok(())
    }
}

/// Partial update of tournament details; `None` fields are left as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_teams: Option<u32>,
    pub registration: Option<DateWindow>,
}

impl TournamentUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(CoreError::validation("tournament name must not be empty"));
        }
        if let Some(max_teams) = self.max_teams {
            validate_capacity(max_teams)?;
        }
        if let Some(window) = self.registration {
            DateWindow::new(window.start, window.end)?;
        }
        Ok(())
    }
}

fn validate_capacity(max_teams: u32) -> Result<(), CoreError> {
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&max_teams) {
        return Err(CoreError::validation(format!(
            "max_teams must be between {MIN_TEAMS} and {MAX_TEAMS}"
        )));
    }
    Ok(())
}

/// Registration state of a team in a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            other => Err(CoreError::CorruptValue {
                column: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// A team's entry into a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRegistration {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub status: RegistrationStatus,
    pub registration_date: DateTime<Utc>,
    pub group_name: Option<String>,
    pub seed: Option<i32>,
}

/// Admin decision on a pending registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationDecision {
    pub approve: bool,
    pub group_name: Option<String>,
    pub seed: Option<i32>,
}

impl RegistrationDecision {
    pub fn status(&self) -> RegistrationStatus {
        if self.approve {
            RegistrationStatus::Approved
        } else {
            RegistrationStatus::Rejected
        }
    }
}
