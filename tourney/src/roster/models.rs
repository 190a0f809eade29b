//! Team, player and roster membership models.

use crate::{access::UserId, errors::CoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Team ID type
pub type TeamId = i64;

/// Player ID type
pub type PlayerId = i64;

/// Roster membership ID type
pub type MembershipId = i64;

/// Lowest and highest jersey numbers
pub const MIN_JERSEY_NUMBER: i32 = 1;
pub const MAX_JERSEY_NUMBER: i32 = 99;

/// Team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: Option<String>,
    pub manager_id: Option<UserId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub short_name: Option<String>,
    /// Defaults to the creating user when they are a team manager
    pub manager_id: Option<UserId>,
}

impl NewTeam {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("team name must not be empty"));
        }
        if let Some(short) = &self.short_name
            && short.chars().count() > 10
        {
            return Err(CoreError::validation(
                "short name must be at most 10 characters",
            ));
        }
        Ok(())
    }
}

/// Player profile, linked to exactly one user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: UserId,
    pub name: String,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub preferred_foot: Option<String>,
}

/// Input for creating a player profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlayer {
    pub user_id: UserId,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub preferred_foot: Option<String>,
}

impl NewPlayer {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(height) = self.height_cm
            && !(100.0..=250.0).contains(&height)
        {
            return Err(CoreError::validation("height must be between 100 and 250 cm"));
        }
        if let Some(weight) = self.weight_kg
            && !(30.0..=200.0).contains(&weight)
        {
            return Err(CoreError::validation("weight must be between 30 and 200 kg"));
        }
        if let Some(foot) = &self.preferred_foot
            && !matches!(foot.as_str(), "left" | "right" | "both")
        {
            return Err(CoreError::validation(
                "preferred foot must be left, right or both",
            ));
        }
        Ok(())
    }
}

/// Whether a membership is current
///
/// Closing sets the departure time; there is no way back to active, a
/// returning player gets a fresh membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Closed { left_date: DateTime<Utc> },
}

impl MembershipStatus {
    /// Rebuild from the stored `is_active` / `left_date` pair
    pub fn from_columns(
        is_active: bool,
        left_date: Option<DateTime<Utc>>,
    ) -> Result<Self, CoreError> {
        match (is_active, left_date) {
            (true, None) => Ok(MembershipStatus::Active),
            (false, Some(left_date)) => Ok(MembershipStatus::Closed { left_date }),
            (is_active, left_date) => Err(CoreError::CorruptValue {
                column: "team_players.left_date",
                value: format!("is_active={is_active}, left_date={left_date:?}"),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MembershipStatus::Active)
    }

    pub fn left_date(&self) -> Option<DateTime<Utc>> {
        match self {
            MembershipStatus::Active => None,
            MembershipStatus::Closed { left_date } => Some(*left_date),
        }
    }
}

/// Roster membership of a player in a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPlayer {
    pub id: MembershipId,
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub jersey_number: i32,
    pub position: Option<String>,
    pub is_captain: bool,
    pub joined_date: NaiveDate,
    pub status: MembershipStatus,
}

impl TeamPlayer {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Request to put a player on a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPlayerRequest {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub jersey_number: i32,
    #[serde(default)]
    pub is_captain: bool,
    pub joined_date: NaiveDate,
    pub position: Option<String>,
    /// With the admin override, move whoever holds the requested number to
    /// the lowest free one instead of failing
    #[serde(default)]
    pub reassign_conflicting_jersey: bool,
}

/// A jersey number moved off one player to make room for another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JerseyReassignment {
    pub player_id: PlayerId,
    pub from: i32,
    pub to: i32,
}

/// Result of adding a player, including side effects on teammates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPlayerOutcome {
    pub membership: TeamPlayer,
    pub reassigned: Option<JerseyReassignment>,
    pub demoted_captain: Option<PlayerId>,
}

pub fn validate_jersey_number(jersey_number: i32) -> Result<(), CoreError> {
    if !(MIN_JERSEY_NUMBER..=MAX_JERSEY_NUMBER).contains(&jersey_number) {
        return Err(CoreError::validation(format!(
            "jersey number must be between {MIN_JERSEY_NUMBER} and {MAX_JERSEY_NUMBER}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_membership_status_from_columns() {
        let left = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(
            MembershipStatus::from_columns(true, None).unwrap(),
            MembershipStatus::Active
        );
        assert_eq!(
            MembershipStatus::from_columns(false, Some(left)).unwrap(),
            MembershipStatus::Closed { left_date: left }
        );
        assert!(MembershipStatus::from_columns(true, Some(left)).is_err());
        assert!(MembershipStatus::from_columns(false, None).is_err());
    }

    #[test]
    fn test_jersey_bounds() {
        assert!(validate_jersey_number(1).is_ok());
        assert!(validate_jersey_number(99).is_ok());
        assert!(validate_jersey_number(0).is_err());
        assert!(validate_jersey_number(100).is_err());
    }

    #[test]
    fn test_new_player_validation() {
        let mut player = NewPlayer {
            user_id: 1,
            height_cm: Some(182.0),
            preferred_foot: Some("left".to_string()),
            ..Default::default()
        };
        assert!(player.validate().is_ok());

        player.preferred_foot = Some("hand".to_string());
        assert!(player.validate().is_err());
    }
}
