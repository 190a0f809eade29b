//! Teams, players and roster memberships.
//!
//! Memberships carry a jersey number and a captain flag. Within a team, only
//! one active member may wear a given number and only one may be captain;
//! a player is active on at most one team unless an admin says otherwise.
//! Removing a player closes the membership and keeps it for history.

pub mod manager;
pub mod models;
pub mod rules;

pub use manager::RosterManager;
pub use models::{
    AddPlayerOutcome, AddPlayerRequest, JerseyReassignment, MAX_JERSEY_NUMBER, MIN_JERSEY_NUMBER,
    MembershipId, MembershipStatus, NewPlayer, NewTeam, Player, PlayerId, Team, TeamId,
    TeamPlayer,
};
pub use rules::{AdditionPlan, next_free_jersey, plan_addition};
