//! Access control for competition operations.
//!
//! Every mutating operation receives an [`Actor`] (user id, role and an
//! optional admin override) and checks it against the [`Resource`] it touches
//! before doing any work.
//!
//! ## Example
//!
//! ```
//! use tourney::access::{Action, Actor, Resource, Role, authorize};
//!
//! let manager = Actor::new(7, Role::TeamManager);
//! let team = Resource::Team { manager_id: Some(7) };
//!
//! assert!(authorize(&manager, &team, Action::ManageRoster).is_ok());
//! assert!(authorize(&manager, &team, Action::DecideRegistration).is_err());
//! ```

pub mod models;
pub mod policy;
pub mod token;

pub use models::{AccessTokenClaims, Action, Actor, Resource, Role, UserId};
pub use policy::{authorize, is_allowed};
pub use token::TokenKeys;
