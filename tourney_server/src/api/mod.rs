//! REST API for the competition engine.
//!
//! # Modules
//!
//! - [`tournaments`]: tournaments, registrations, standings and scorers
//! - [`matches`]: fixture lifecycle, results and events
//! - [`teams`]: teams, rosters and team statistics
//! - [`players`]: player profiles and statistics
//! - [`middleware`]: bearer-token authentication for mutations
//! - [`error`]: mapping of engine errors onto status codes
//!
//! Reads are public. Every mutation requires `Authorization: Bearer <jwt>`;
//! the token's role and user id become the [`tourney::Actor`] the engine
//! authorizes against.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::api::{create_router, AppState};
//! use std::sync::Arc;
//! use tourney::{CompetitionService, access::TokenKeys};
//! # use sqlx::PgPool;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool: PgPool = unimplemented!();
//! let pool = Arc::new(pool);
//! let state = AppState {
//!     service: Arc::new(CompetitionService::new(pool.clone())),
//!     tokens: Arc::new(TokenKeys::new("a-secret-of-at-least-32-characters!", chrono::Duration::minutes(15))),
//!     pool,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod matches;
pub mod middleware;
pub mod players;
pub mod request_id;
pub mod teams;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tourney::{CompetitionService, access::TokenKeys};
use tower_http::cors::CorsLayer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CompetitionService>,
    pub tokens: Arc<TokenKeys>,
    /// Used directly only by the health check
    pub pool: Arc<PgPool>,
}

/// Create the complete API router.
///
/// ```text
/// GET    /health
///
/// GET    /api/v1/tournaments                              ?status=
/// POST   /api/v1/tournaments                              (auth)
/// GET    /api/v1/tournaments/{id}
/// PUT    /api/v1/tournaments/{id}                         (auth)
/// PUT    /api/v1/tournaments/{id}/status                  (auth)
/// GET    /api/v1/tournaments/{id}/registrations           ?status=
/// POST   /api/v1/tournaments/{id}/registrations           (auth)
/// POST   /api/v1/tournaments/{id}/registrations/{team}/approve  (auth)
/// POST   /api/v1/tournaments/{id}/registrations/{team}/reject   (auth)
/// GET    /api/v1/tournaments/{id}/standings               ?group=
/// POST   /api/v1/tournaments/{id}/standings/recompute     (auth)
/// GET    /api/v1/tournaments/{id}/top-scorers             ?limit=
/// GET    /api/v1/tournaments/{id}/matches                 ?status=
///
/// POST   /api/v1/matches                                  (auth)
/// GET    /api/v1/matches/{id}
/// POST   /api/v1/matches/{id}/start|postpone|cancel       (auth)
/// PUT    /api/v1/matches/{id}/schedule                    (auth)
/// POST   /api/v1/matches/{id}/complete                    (auth)
/// GET    /api/v1/matches/{id}/events
/// POST   /api/v1/matches/{id}/events                      (auth)
///
/// POST   /api/v1/teams                                    (auth)
/// GET    /api/v1/teams/{id}
/// GET    /api/v1/teams/{id}/players
/// POST   /api/v1/teams/{id}/players                       (auth)
/// DELETE /api/v1/teams/{id}/players/{player}              (auth)
/// PUT    /api/v1/teams/{id}/players/{player}/jersey       (auth)
/// GET    /api/v1/teams/{id}/statistics
/// GET    /api/v1/teams/{id}/available-players
///
/// POST   /api/v1/players                                  (auth)
/// GET    /api/v1/players/available
/// GET    /api/v1/players/{id}
/// GET    /api/v1/players/{id}/team-history
/// GET    /api/v1/players/{id}/statistics
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{id}/registrations",
            get(tournaments::list_registrations),
        )
        .route("/tournaments/{id}/standings", get(tournaments::get_standings))
        .route("/tournaments/{id}/top-scorers", get(tournaments::top_scorers))
        .route("/tournaments/{id}/matches", get(tournaments::list_matches))
        .route("/matches/{id}", get(matches::get_match))
        .route("/matches/{id}/events", get(matches::list_events))
        .route("/teams/{id}", get(teams::get_team))
        .route("/teams/{id}/players", get(teams::list_roster))
        .route("/teams/{id}/statistics", get(teams::team_statistics))
        .route(
            "/teams/{id}/available-players",
            get(teams::available_players),
        )
        .route("/players/available", get(players::available_players))
        .route("/players/{id}", get(players::get_player))
        .route("/players/{id}/team-history", get(players::team_history))
        .route("/players/{id}/statistics", get(players::player_statistics));

    let protected_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/{id}", put(tournaments::update_tournament))
        .route("/tournaments/{id}/status", put(tournaments::set_status))
        .route(
            "/tournaments/{id}/registrations",
            post(tournaments::register_team),
        )
        .route(
            "/tournaments/{id}/registrations/{team_id}/approve",
            post(tournaments::approve_registration),
        )
        .route(
            "/tournaments/{id}/registrations/{team_id}/reject",
            post(tournaments::reject_registration),
        )
        .route(
            "/tournaments/{id}/standings/recompute",
            post(tournaments::recompute_standings),
        )
        .route("/matches", post(matches::schedule_match))
        .route("/matches/{id}/start", post(matches::start_match))
        .route("/matches/{id}/postpone", post(matches::postpone_match))
        .route("/matches/{id}/schedule", put(matches::reschedule_match))
        .route("/matches/{id}/cancel", post(matches::cancel_match))
        .route("/matches/{id}/complete", post(matches::complete_match))
        .route("/matches/{id}/events", post(matches::add_event))
        .route("/teams", post(teams::create_team))
        .route("/teams/{id}/players", post(teams::add_player))
        .route(
            "/teams/{id}/players/{player_id}",
            delete(teams::remove_player),
        )
        .route(
            "/teams/{id}/players/{player_id}/jersey",
            put(teams::change_jersey),
        )
        .route("/players", post(players::create_player))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","database":true,"timestamp":"2026-03-02T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
