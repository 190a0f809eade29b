//! Player profile endpoints.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use tourney::{
    Actor,
    roster::{NewPlayer, Player, PlayerId, TeamPlayer},
    stats::PlayerStatistics,
};

use super::{AppState, error::ApiResult};

/// Create the profile for a user account. Players may only create their own.
pub async fn create_player(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewPlayer>,
) -> ApiResult<Player> {
    Ok(Json(state.service.create_player(input, &actor).await?))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Player> {
    Ok(Json(state.service.get_player(player_id).await?))
}

/// Event counts and recent events across all teams (public)
pub async fn player_statistics(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<PlayerStatistics> {
    Ok(Json(state.service.get_player_statistics(player_id).await?))
}

/// Every membership the player has held, newest first (public)
pub async fn team_history(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Vec<TeamPlayer>> {
    Ok(Json(state.service.player_team_history(player_id).await?))
}

/// Players not currently on any team (public)
pub async fn available_players(State(state): State<AppState>) -> ApiResult<Vec<Player>> {
    Ok(Json(state.service.available_players().await?))
}
