//! # Tourney
//!
//! Standings, statistics and roster engine for sports tournaments.
//!
//! Teams register into tournaments, play matches, and every completed match
//! feeds a league table. Rosters, registrations and results are guarded by
//! role and ownership checks, and by invariants that hold under concurrent
//! writes (one captain per team, unique jersey numbers, one completion per
//! match).
//!
//! ## Core Modules
//!
//! - [`tournament`]: Tournament lifecycle and team registration
//! - [`roster`]: Teams, players and memberships
//! - [`matches`]: Match lifecycle, results and the event ledger
//! - [`standings`]: League tables, incremental and rebuilt
//! - [`stats`]: Team and player statistics
//! - [`access`]: Roles and the capability check
//! - [`service`]: One facade over all of the above
//!
//! ## Example
//!
//! ```
//! use tourney::matches::{MatchResult, Side};
//!
//! // Level after extra time, decided on penalties
//! let result = MatchResult::new(2, 2).with_extra_time(0, 0).with_penalties(3, 4);
//! assert_eq!(result.winning_side(), Some(Side::Away));
//! ```

pub mod access;
pub mod db;
pub mod errors;
pub mod matches;
pub mod roster;
pub mod service;
pub mod standings;
pub mod stats;
pub mod tournament;

pub use access::{Actor, Role};
pub use errors::{CoreError, CoreResult, ErrorKind};
pub use service::CompetitionService;
