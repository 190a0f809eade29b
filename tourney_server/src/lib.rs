//! HTTP front end for the `tourney` competition engine.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
