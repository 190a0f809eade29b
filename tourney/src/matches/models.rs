//! Match, result and event models.

use crate::{
    access::UserId,
    errors::CoreError,
    roster::{PlayerId, TeamId},
    tournament::TournamentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Match ID type
pub type MatchId = i64;

/// Match event ID type
pub type EventId = i64;

/// Latest minute an event may be recorded at (end of extra time)
pub const MAX_EVENT_MINUTE: i32 = 120;

/// Most stoppage time an event may carry
pub const MAX_ADDITIONAL_TIME: i32 = 30;

/// Highest goal count accepted for any part of a result
pub const MAX_SCORE: i32 = 999;

/// Match lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// A postponed match goes back to `scheduled` once it has a new date.
    /// Completion is only reachable through recording a result.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        use MatchStatus::*;

        match (self, next) {
            (Scheduled, InProgress | Postponed) => true,
            (Postponed, Scheduled) => true,
            (Scheduled | InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            "postponed" => Ok(MatchStatus::Postponed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(CoreError::CorruptValue {
                column: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Which side of a fixture a team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// A pair of home and away goal counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub home: i32,
    pub away: i32,
}

impl Score {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    /// `(own, opponent)` goals seen from one side
    pub fn for_side(&self, side: Side) -> (i32, i32) {
        match side {
            Side::Home => (self.home, self.away),
            Side::Away => (self.away, self.home),
        }
    }

    fn is_valid(&self) -> bool {
        (0..=MAX_SCORE).contains(&self.home) && (0..=MAX_SCORE).contains(&self.away)
    }
}

impl std::ops::Add for Score {
    type Output = Score;

    fn add(self, other: Score) -> Score {
        Score::new(
            self.home.saturating_add(other.home),
            self.away.saturating_add(other.away),
        )
    }
}

/// Final result of a match
///
/// `regulation` is what counts in the league table. Extra time and penalties
/// only decide the winner of a fixture that must have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub regulation: Score,
    pub extra_time: Option<Score>,
    pub penalties: Option<Score>,
}

impl MatchResult {
    pub fn new(home: i32, away: i32) -> Self {
        Self {
            regulation: Score::new(home, away),
            extra_time: None,
            penalties: None,
        }
    }

    pub fn with_extra_time(mut self, home: i32, away: i32) -> Self {
        self.extra_time = Some(Score::new(home, away));
        self
    }

    pub fn with_penalties(mut self, home: i32, away: i32) -> Self {
        self.penalties = Some(Score::new(home, away));
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let all = [Some(self.regulation), self.extra_time, self.penalties];
        if all.iter().flatten().any(|s| !s.is_valid()) {
            return Err(CoreError::validation(format!(
                "scores must be between 0 and {MAX_SCORE}"
            )));
        }
        Ok(())
    }

    /// Regulation plus extra time plus penalties
    pub fn aggregate(&self) -> Score {
        self.regulation
            + self.extra_time.unwrap_or_default()
            + self.penalties.unwrap_or_default()
    }

    /// The side with more aggregate goals, or `None` on a draw
    pub fn winning_side(&self) -> Option<Side> {
        let total = self.aggregate();
        match total.home.cmp(&total.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub referee_id: Option<UserId>,
    pub round: Option<String>,
    pub match_date: DateTime<Utc>,
    pub venue: Option<String>,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub extra_time: Option<Score>,
    pub penalties: Option<Score>,
    pub winner_team_id: Option<TeamId>,
    pub notes: Option<String>,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if self.home_team_id == team_id {
            Some(Side::Home)
        } else if self.away_team_id == team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn team_on(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }

    /// Regulation score with missing values read as zero
    pub fn regulation_score(&self) -> Score {
        Score::new(self.home_score.unwrap_or(0), self.away_score.unwrap_or(0))
    }

    /// `(own, opponent)` regulation goals for a participating team
    pub fn goals_for(&self, team_id: TeamId) -> Option<(i32, i32)> {
        self.side_of(team_id)
            .map(|side| self.regulation_score().for_side(side))
    }

    /// The recorded result, if the match has one
    pub fn result(&self) -> Option<MatchResult> {
        Some(MatchResult {
            regulation: Score::new(self.home_score?, self.away_score?),
            extra_time: self.extra_time,
            penalties: self.penalties,
        })
    }
}

/// Input for scheduling a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub referee_id: Option<UserId>,
    pub round: Option<String>,
    pub match_date: DateTime<Utc>,
    pub venue: Option<String>,
}

impl NewMatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.home_team_id == self.away_team_id {
            return Err(CoreError::validation(
                "home and away team must be different",
            ));
        }
        Ok(())
    }
}

/// Kind of in-match event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    OwnGoal,
    Assist,
    YellowCard,
    RedCard,
    SubstitutionIn,
    SubstitutionOut,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Goal => "goal",
            EventType::OwnGoal => "own_goal",
            EventType::Assist => "assist",
            EventType::YellowCard => "yellow_card",
            EventType::RedCard => "red_card",
            EventType::SubstitutionIn => "substitution_in",
            EventType::SubstitutionOut => "substitution_out",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(EventType::Goal),
            "own_goal" => Ok(EventType::OwnGoal),
            "assist" => Ok(EventType::Assist),
            "yellow_card" => Ok(EventType::YellowCard),
            "red_card" => Ok(EventType::RedCard),
            "substitution_in" => Ok(EventType::SubstitutionIn),
            "substitution_out" => Ok(EventType::SubstitutionOut),
            other => Err(CoreError::CorruptValue {
                column: "event_type",
                value: other.to_string(),
            }),
        }
    }
}

/// Something that happened during a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub match_id: MatchId,
    pub team_id: TeamId,
    pub player_id: Option<PlayerId>,
    pub event_type: EventType,
    pub minute: i32,
    pub additional_time: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MatchEvent {
    /// Clock display such as `45+2'`
    pub fn formatted_time(&self) -> String {
        if self.additional_time > 0 {
            format!("{}+{}'", self.minute, self.additional_time)
        } else {
            format!("{}'", self.minute)
        }
    }
}

/// Input for recording an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatchEvent {
    pub team_id: TeamId,
    pub player_id: Option<PlayerId>,
    pub event_type: EventType,
    pub minute: i32,
    #[serde(default)]
    pub additional_time: i32,
    pub description: Option<String>,
}

impl NewMatchEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=MAX_EVENT_MINUTE).contains(&self.minute) {
            return Err(CoreError::validation(format!(
                "minute must be between 0 and {MAX_EVENT_MINUTE}"
            )));
        }
        if !(0..=MAX_ADDITIONAL_TIME).contains(&self.additional_time) {
            return Err(CoreError::validation(format!(
                "additional time must be between 0 and {MAX_ADDITIONAL_TIME}"
            )));
        }
        if let Some(description) = &self.description
            && description.chars().count() > 255
        {
            return Err(CoreError::validation(
                "description must be at most 255 characters",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regulation_winner() {
        assert_eq!(MatchResult::new(2, 1).winning_side(), Some(Side::Home));
        assert_eq!(MatchResult::new(0, 3).winning_side(), Some(Side::Away));
        assert_eq!(MatchResult::new(1, 1).winning_side(), None);
    }

    #[test]
    fn test_extra_time_and_penalties_decide_winner() {
        let result = MatchResult::new(1, 1).with_extra_time(0, 0).with_penalties(4, 5);
        assert_eq!(result.aggregate(), Score::new(5, 6));
        assert_eq!(result.winning_side(), Some(Side::Away));

        let result = MatchResult::new(1, 1).with_extra_time(1, 0);
        assert_eq!(result.winning_side(), Some(Side::Home));
    }

    #[test]
    fn test_negative_scores_rejected() {
        assert!(MatchResult::new(-1, 0).validate().is_err());
        assert!(MatchResult::new(1, 1).with_penalties(3, -2).validate().is_err());
        assert!(MatchResult::new(0, 0).validate().is_ok());
    }

    #[test]
    fn test_oversized_scores_rejected() {
        let huge = MatchResult::new(i32::MAX, 0).with_extra_time(1, 0);
        let err = huge.validate().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::ValidationFailed);
        assert!(MatchResult::new(MAX_SCORE, 0).validate().is_ok());
        assert!(MatchResult::new(0, 0).with_penalties(0, MAX_SCORE + 1).validate().is_err());
    }

    #[test]
    fn test_aggregate_saturates_instead_of_overflowing() {
        let huge = MatchResult::new(i32::MAX, 0).with_extra_time(1, 0);
        assert_eq!(huge.aggregate(), Score::new(i32::MAX, 0));
        assert_eq!(huge.winning_side(), Some(Side::Home));
    }

    #[test]
    fn test_completion_reachable_from_scheduled_or_live_only() {
        use MatchStatus::*;

        assert!(Scheduled.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!Postponed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(Postponed.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_side_helpers() {
        let m = Match {
            id: 1,
            tournament_id: 1,
            home_team_id: 10,
            away_team_id: 20,
            referee_id: None,
            round: None,
            match_date: Utc::now(),
            venue: None,
            status: MatchStatus::Completed,
            home_score: Some(3),
            away_score: None,
            extra_time: None,
            penalties: None,
            winner_team_id: None,
            notes: None,
        };

        assert_eq!(m.side_of(20), Some(Side::Away));
        assert_eq!(m.side_of(30), None);
        assert_eq!(m.goals_for(20), Some((0, 3)));
        assert!(m.result().is_none());
    }

    #[test]
    fn test_event_bounds() {
        let mut event = NewMatchEvent {
            team_id: 1,
            player_id: Some(4),
            event_type: EventType::Goal,
            minute: 120,
            additional_time: 30,
            description: None,
        };
        assert!(event.validate().is_ok());

        event.minute = 121;
        assert!(event.validate().is_err());
        event.minute = 90;
        event.additional_time = 31;
        assert!(event.validate().is_err());
        event.additional_time = -1;
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_formatted_time() {
        let mut event = MatchEvent {
            id: 1,
            match_id: 1,
            team_id: 1,
            player_id: None,
            event_type: EventType::YellowCard,
            minute: 45,
            additional_time: 2,
            description: None,
            created_at: Utc::now(),
        };
        assert_eq!(event.formatted_time(), "45+2'");
        event.additional_time = 0;
        assert_eq!(event.formatted_time(), "45'");
    }
}
