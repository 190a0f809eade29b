//! Tournament lifecycle and team registration.
//!
//! This module provides:
//! - Tournament creation and detail edits (locked once play starts)
//! - A forward-only status lifecycle with cancellation
//! - Team registration with window, capacity and roster checks
//! - Admin approval or rejection of pending registrations
//!
//! ## Example
//!
//! ```no_run
//! use tourney::access::{Actor, Role};
//! use tourney::db::Database;
//! use tourney::tournament::TournamentManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let tournaments = TournamentManager::new(Arc::new(db.pool().clone()));
//!
//!     let manager = Actor::new(7, Role::TeamManager);
//!     let registration = tournaments.register_team(&manager, 1, 3).await?;
//!     println!("Registration is {}", registration.status);
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;
pub mod registration;

pub use manager::TournamentManager;
pub use models::{
    DateWindow, NewTournament, RegistrationDecision, RegistrationStatus, Tournament,
    TournamentId, TournamentRegistration, TournamentStatus, TournamentType, TournamentUpdate,
};
pub use registration::RegistrationContext;
