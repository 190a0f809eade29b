//! Matches, results and the in-match event ledger.
//!
//! A match moves `scheduled -> in_progress -> completed`, may be postponed
//! and rescheduled, and may be cancelled until it is completed. Recording a
//! result completes the match and updates the tournament table atomically.
//!
//! ## Example
//!
//! ```no_run
//! use tourney::access::{Actor, Role};
//! use tourney::db::Database;
//! use tourney::matches::{MatchManager, MatchResult};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let matches = MatchManager::new(Arc::new(db.pool().clone()));
//!
//!     let referee = Actor::new(3, Role::Referee);
//!     let result = MatchResult::new(1, 1).with_penalties(4, 3);
//!     let completed = matches.complete_match(&referee, 12, result, None).await?;
//!     println!("Winner: {:?}", completed.winner_team_id);
//!
//!     Ok(())
//! }
//! ```

pub mod ledger;
pub mod manager;
pub mod models;

pub use ledger::{EventLedger, check_event};
pub use manager::MatchManager;
pub use models::{
    EventId, EventType, MAX_ADDITIONAL_TIME, MAX_EVENT_MINUTE, MAX_SCORE, Match, MatchEvent,
    MatchId, MatchResult, MatchStatus, NewMatch, NewMatchEvent, Score, Side,
};
