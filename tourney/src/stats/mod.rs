//! Read-only team and player statistics.
//!
//! Everything here is derived from completed matches and the event ledger;
//! nothing is stored. Missing related data never fails a query: a match
//! whose tournament cannot be resolved is grouped under
//! [`UNKNOWN_TOURNAMENT`], and a team with no matches gets zeroed rates.

pub mod calculator;
pub mod manager;
pub mod models;

pub use calculator::{player_statistics, rank_scorers, round_to, team_statistics};
pub use manager::StatisticsManager;
pub use models::{
    DEFAULT_TOURNAMENT_TOP_SCORERS, FormResult, GoalRecord, OverallRecord, PlayerEventRecord,
    PlayerStatistics, RecordLine, ScorerLine, TeamFixture, TeamStatistics, TournamentCounts,
    UNKNOWN_TOURNAMENT,
};
