//! Tournament standings.
//!
//! A table has one row per team. Completing a match adds its regulation
//! score to both rows in the same transaction as the status change, so a
//! result is counted exactly once. A recompute throws the rows away and
//! replays every completed match, which must land on the same numbers.
//!
//! Rows are ranked by points, goal difference and goals scored (all
//! descending), with team id as the last tie-break.
//!
//! ## Example
//!
//! ```
//! use tourney::matches::Match;
//! use tourney::standings::StandingsTable;
//!
//! let no_matches: Vec<Match> = Vec::new();
//! let table = StandingsTable::replay(1, [(10, None), (20, None)], &no_matches).unwrap();
//! let ranked = table.into_ranked();
//!
//! assert_eq!(ranked[0].team_id, 10);
//! assert_eq!(ranked[0].position, Some(1));
//! ```

pub mod manager;
pub mod models;
pub mod table;

pub use manager::StandingsManager;
pub use models::{POINTS_PER_DRAW, POINTS_PER_WIN, Standing, StandingDelta};
pub use table::{StandingsTable, compare, rank};
