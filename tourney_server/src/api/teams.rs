//! Team and roster endpoints.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tourney::{
    Actor,
    roster::{
        AddPlayerOutcome, AddPlayerRequest, NewTeam, Player, PlayerId, Team, TeamId, TeamPlayer,
    },
    stats::TeamStatistics,
};

use super::{AppState, error::ApiResult};
use crate::metrics;

/// Body of `POST /teams/{id}/players`
#[derive(Debug, Deserialize)]
pub struct AddPlayerBody {
    pub player_id: PlayerId,
    pub jersey_number: i32,
    #[serde(default)]
    pub is_captain: bool,
    /// Defaults to today
    pub joined_date: Option<NaiveDate>,
    pub position: Option<String>,
    #[serde(default)]
    pub reassign_conflicting_jersey: bool,
}

impl AddPlayerBody {
    fn into_request(self, team_id: TeamId) -> AddPlayerRequest {
        AddPlayerRequest {
            team_id,
            player_id: self.player_id,
            jersey_number: self.jersey_number,
            is_captain: self.is_captain,
            joined_date: self
                .joined_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            position: self.position,
            reassign_conflicting_jersey: self.reassign_conflicting_jersey,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JerseyChange {
    pub jersey_number: i32,
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewTeam>,
) -> ApiResult<Team> {
    Ok(Json(state.service.create_team(input, &actor).await?))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> ApiResult<Team> {
    Ok(Json(state.service.get_team(team_id).await?))
}

/// Active roster ordered by jersey number (public)
pub async fn list_roster(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> ApiResult<Vec<TeamPlayer>> {
    Ok(Json(state.service.list_roster(team_id).await?))
}

/// Players the team could sign (public)
pub async fn available_players(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> ApiResult<Vec<Player>> {
    Ok(Json(state.service.available_players_for_team(team_id).await?))
}

/// Add a player. The response reports any jersey moved or captain demoted
/// to make room.
pub async fn add_player(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(team_id): Path<TeamId>,
    Json(body): Json<AddPlayerBody>,
) -> ApiResult<AddPlayerOutcome> {
    let outcome = state
        .service
        .add_player_to_team(body.into_request(team_id), &actor)
        .await?;
    metrics::roster_changes_total("added");
    if outcome.reassigned.is_some() {
        metrics::roster_changes_total("jersey");
    }
    Ok(Json(outcome))
}

pub async fn remove_player(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((team_id, player_id)): Path<(TeamId, PlayerId)>,
) -> ApiResult<TeamPlayer> {
    let membership = state
        .service
        .remove_player_from_team(team_id, player_id, &actor)
        .await?;
    metrics::roster_changes_total("removed");
    Ok(Json(membership))
}

pub async fn change_jersey(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((team_id, player_id)): Path<(TeamId, PlayerId)>,
    Json(change): Json<JerseyChange>,
) -> ApiResult<TeamPlayer> {
    let membership = state
        .service
        .reassign_jersey(team_id, player_id, change.jersey_number, &actor)
        .await?;
    metrics::roster_changes_total("jersey");
    Ok(Json(membership))
}

/// Derived team statistics (public)
pub async fn team_statistics(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> ApiResult<TeamStatistics> {
    Ok(Json(state.service.get_team_statistics(team_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_player_body_defaults() {
        let body: AddPlayerBody =
            serde_json::from_str(r#"{"player_id": 7, "jersey_number": 10}"#).unwrap();
        let request = body.into_request(3);

        assert_eq!(request.team_id, 3);
        assert_eq!(request.player_id, 7);
        assert!(!request.is_captain);
        assert!(!request.reassign_conflicting_jersey);
        assert_eq!(request.joined_date, Utc::now().date_naive());
    }

    #[test]
    fn test_add_player_body_keeps_joined_date() {
        let body: AddPlayerBody = serde_json::from_str(
            r#"{"player_id": 7, "jersey_number": 10, "joined_date": "2024-08-01", "is_captain": true}"#,
        )
        .unwrap();
        let request = body.into_request(3);

        assert!(request.is_captain);
        assert_eq!(
            request.joined_date,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
        );
    }
}
