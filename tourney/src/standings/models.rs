//! League table row models.

use crate::{
    errors::{CoreError, CoreResult},
    matches::{Match, Side},
    roster::TeamId,
    tournament::TournamentId,
};
use serde::{Deserialize, Serialize};

/// Points for a win
pub const POINTS_PER_WIN: i32 = 3;

/// Points for a draw
pub const POINTS_PER_DRAW: i32 = 1;

/// One team's row in a tournament table
///
/// `goal_difference` and `points` are kept in step with the counters by
/// [`Standing::absorb`]; `position` is only filled in when a table is ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub group_name: Option<String>,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    pub position: Option<u32>,
}

impl Standing {
    /// A row with every counter at zero
    pub fn zeroed(tournament_id: TournamentId, team_id: TeamId, group_name: Option<String>) -> Self {
        Self {
            tournament_id,
            team_id,
            group_name,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            position: None,
        }
    }

    /// Add one match's contribution
    pub fn absorb(&mut self, delta: &StandingDelta) {
        self.played += 1;
        self.won += delta.won;
        self.drawn += delta.drawn;
        self.lost += delta.lost;
        self.goals_for += delta.goals_for;
        self.goals_against += delta.goals_against;
        self.goal_difference = self.goals_for - self.goals_against;
        self.points = self.won * POINTS_PER_WIN + self.drawn * POINTS_PER_DRAW;
    }

    /// Whether the derived columns agree with the counters
    pub fn is_consistent(&self) -> bool {
        self.played == self.won + self.drawn + self.lost
            && self.goal_difference == self.goals_for - self.goals_against
            && self.points == self.won * POINTS_PER_WIN + self.drawn * POINTS_PER_DRAW
    }
}

/// What one completed match adds to one team's row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingDelta {
    pub team_id: TeamId,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
}

impl StandingDelta {
    /// Contribution from `own` goals scored and `opponent` goals conceded
    pub fn from_goals(team_id: TeamId, own: i32, opponent: i32) -> Self {
        Self {
            team_id,
            won: (own > opponent) as i32,
            drawn: (own == opponent) as i32,
            lost: (own < opponent) as i32,
            goals_for: own,
            goals_against: opponent,
        }
    }

    pub fn points(&self) -> i32 {
        self.won * POINTS_PER_WIN + self.drawn * POINTS_PER_DRAW
    }

    /// Both sides' contributions from a completed match
    ///
    /// The table uses the regulation score; extra time and penalties only
    /// decide the match winner.
    ///
    /// # Errors
    ///
    /// * `CoreError::Validation` - The match is not completed or has no score
    pub fn for_match(m: &Match) -> CoreResult<[StandingDelta; 2]> {
        if !m.is_completed() {
            return Err(CoreError::validation(format!(
                "match {} is {} and has no final result",
                m.id, m.status
            )));
        }
        let result = m.result().ok_or_else(|| {
            CoreError::validation(format!("completed match {} has no score", m.id))
        })?;

        Ok([Side::Home, Side::Away].map(|side| {
            let (own, opponent) = result.regulation.for_side(side);
            StandingDelta::from_goals(m.team_on(side), own, opponent)
        }))
    }
}
