//! Tournament, registration and standings endpoints.
//!
//! ```bash
//! curl http://localhost:8080/api/v1/tournaments/1/standings?group=A
//!
//! curl -X POST http://localhost:8080/api/v1/tournaments/1/registrations \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"team_id": 4}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use tourney::{
    Actor,
    matches::{Match, MatchStatus},
    standings::Standing,
    stats::ScorerLine,
    tournament::{
        NewTournament, RegistrationDecision, RegistrationStatus, Tournament, TournamentId,
        TournamentRegistration, TournamentStatus, TournamentUpdate,
    },
};

use super::{AppState, error::ApiResult};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<TournamentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StandingsQuery {
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopScorersQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: TournamentStatus,
}

#[derive(Debug, Deserialize)]
pub struct RegisterTeamRequest {
    pub team_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApprovalRequest {
    pub group_name: Option<String>,
    pub seed: Option<i32>,
}

/// List tournaments, optionally by status (public)
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Vec<Tournament>> {
    Ok(Json(state.service.list_tournaments(filter.status).await?))
}

/// Get a tournament (public)
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Tournament> {
    Ok(Json(state.service.get_tournament(tournament_id).await?))
}

/// Create a tournament in `draft` (admin)
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewTournament>,
) -> ApiResult<Tournament> {
    Ok(Json(state.service.create_tournament(input, &actor).await?))
}

/// Edit name, description, capacity or registration window
pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(tournament_id): Path<TournamentId>,
    Json(update): Json<TournamentUpdate>,
) -> ApiResult<Tournament> {
    Ok(Json(
        state
            .service
            .update_tournament(tournament_id, update, &actor)
            .await?,
    ))
}

/// Move a tournament along its lifecycle
pub async fn set_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(tournament_id): Path<TournamentId>,
    Json(change): Json<StatusChange>,
) -> ApiResult<Tournament> {
    Ok(Json(
        state
            .service
            .set_tournament_status(tournament_id, change.status, &actor)
            .await?,
    ))
}

/// Enter a team. Managers land in `pending`; admins are approved directly.
pub async fn register_team(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<RegisterTeamRequest>,
) -> ApiResult<TournamentRegistration> {
    let registration = state
        .service
        .register_team_for_tournament(tournament_id, request.team_id, &actor)
        .await?;
    metrics::registrations_total(registration.status.as_str());
    Ok(Json(registration))
}

/// List registrations (public)
pub async fn list_registrations(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(filter): Query<RegistrationFilter>,
) -> ApiResult<Vec<TournamentRegistration>> {
    Ok(Json(
        state
            .service
            .list_registrations(tournament_id, filter.status)
            .await?,
    ))
}

/// Approve a pending registration, optionally placing the team in a group
pub async fn approve_registration(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((tournament_id, team_id)): Path<(TournamentId, i64)>,
    Json(request): Json<ApprovalRequest>,
) -> ApiResult<TournamentRegistration> {
    decide(
        &state,
        &actor,
        tournament_id,
        team_id,
        RegistrationDecision {
            approve: true,
            group_name: request.group_name,
            seed: request.seed,
        },
    )
    .await
}

/// Reject a pending registration
pub async fn reject_registration(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((tournament_id, team_id)): Path<(TournamentId, i64)>,
) -> ApiResult<TournamentRegistration> {
    decide(
        &state,
        &actor,
        tournament_id,
        team_id,
        RegistrationDecision {
            approve: false,
            group_name: None,
            seed: None,
        },
    )
    .await
}

async fn decide(
    state: &AppState,
    actor: &Actor,
    tournament_id: TournamentId,
    team_id: i64,
    decision: RegistrationDecision,
) -> ApiResult<TournamentRegistration> {
    let registration = state
        .service
        .decide_registration(tournament_id, team_id, decision, actor)
        .await?;
    metrics::registrations_total(registration.status.as_str());
    Ok(Json(registration))
}

/// Ranked table, optionally one group (public)
pub async fn get_standings(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<StandingsQuery>,
) -> ApiResult<Vec<Standing>> {
    Ok(Json(
        state
            .service
            .get_standings(tournament_id, query.group.as_deref())
            .await?,
    ))
}

/// Rebuild the table from match history (admin)
pub async fn recompute_standings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Vec<Standing>> {
    let table = state
        .service
        .recompute_standings(tournament_id, &actor)
        .await?;
    metrics::standings_recomputed_total();
    Ok(Json(table))
}

/// Scoring chart (public). Defaults to ten lines.
pub async fn top_scorers(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(query): Query<TopScorersQuery>,
) -> ApiResult<Vec<ScorerLine>> {
    Ok(Json(
        state
            .service
            .tournament_top_scorers(tournament_id, query.limit)
            .await?,
    ))
}

/// Fixtures of a tournament in kickoff order (public)
pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(filter): Query<MatchFilter>,
) -> ApiResult<Vec<Match>> {
    Ok(Json(
        state
            .service
            .list_matches(tournament_id, filter.status)
            .await?,
    ))
}
