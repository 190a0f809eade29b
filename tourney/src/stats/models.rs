//! Statistics projections and the records they are computed from.

use crate::{
    matches::{Match, MatchEvent},
    roster::{PlayerId, TeamId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label used when a match's tournament cannot be resolved
pub const UNKNOWN_TOURNAMENT: &str = "Unknown Tournament";

/// How many results `recent_form` holds
pub const RECENT_FORM_LEN: usize = 5;

/// How many players a team's `top_scorers` holds
pub const TEAM_TOP_SCORERS: usize = 5;

/// Default size of a tournament scoring chart
pub const DEFAULT_TOURNAMENT_TOP_SCORERS: usize = 10;

/// How many events `recent_events` holds
pub const RECENT_EVENTS_LEN: usize = 10;

/// A completed match together with its tournament's name
#[derive(Debug, Clone)]
pub struct TeamFixture {
    pub fixture: Match,
    pub tournament_name: Option<String>,
}

/// One goal event, with names resolved where possible
#[derive(Debug, Clone)]
pub struct GoalRecord {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    pub team_id: TeamId,
    pub team_name: Option<String>,
}

/// A player's event with the context of the match it happened in
#[derive(Debug, Clone)]
pub struct PlayerEventRecord {
    pub event: MatchEvent,
    pub match_date: DateTime<Utc>,
    pub tournament_name: Option<String>,
}

/// Result from one team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn from_goals(own: i32, opponent: i32) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => FormResult::Win,
            std::cmp::Ordering::Equal => FormResult::Draw,
            std::cmp::Ordering::Less => FormResult::Loss,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// Won/drawn/lost and goals over some set of matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLine {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: i32,
    pub goals_against: i32,
}

impl RecordLine {
    pub fn add(&mut self, own: i32, opponent: i32) {
        self.played += 1;
        match FormResult::from_goals(own, opponent) {
            FormResult::Win => self.won += 1,
            FormResult::Draw => self.drawn += 1,
            FormResult::Loss => self.lost += 1,
        }
        self.goals_for += own;
        self.goals_against += opponent;
    }
}

/// Headline numbers across every completed match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallRecord {
    pub total_matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub clean_sheets: u32,
    /// Percentage, one decimal place
    pub win_rate: f64,
    /// Two decimal places
    pub goals_per_match: f64,
    /// Two decimal places
    pub goals_conceded_per_match: f64,
}

/// A line in a scoring chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerLine {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    pub team_id: TeamId,
    pub team_name: Option<String>,
    pub goals: u32,
}

/// Team statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team_id: TeamId,
    pub overall: OverallRecord,
    pub by_tournament: BTreeMap<String, RecordLine>,
    pub home: RecordLine,
    pub away: RecordLine,
    pub recent_form: Vec<FormResult>,
    pub top_scorers: Vec<ScorerLine>,
    pub total_tournaments: u32,
    pub active_tournaments: u32,
}

/// Player statistics
///
/// `total_matches` counts matches in which the player has at least one
/// event, so appearances without a goal, card or substitution are missed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub player_id: PlayerId,
    pub total_matches: u32,
    pub goals: u32,
    pub own_goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub substitutions: u32,
    pub goals_by_tournament: BTreeMap<String, u32>,
    pub recent_events: Vec<MatchEvent>,
}

/// Registration counts feeding `total_tournaments` / `active_tournaments`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TournamentCounts {
    pub total: u32,
    pub active: u32,
}
