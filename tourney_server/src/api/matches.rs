//! Match lifecycle, results and event endpoints.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tourney::{
    Actor,
    matches::{Match, MatchEvent, MatchId, MatchResult, NewMatch, NewMatchEvent, Score},
};

use super::{AppState, error::ApiResult};
use crate::metrics;

/// Body of `POST /matches/{id}/complete`
#[derive(Debug, Deserialize)]
pub struct CompleteMatchRequest {
    pub home_score: i32,
    pub away_score: i32,
    pub extra_time: Option<Score>,
    pub penalties: Option<Score>,
    pub notes: Option<String>,
}

impl CompleteMatchRequest {
    fn result(&self) -> MatchResult {
        MatchResult {
            regulation: Score::new(self.home_score, self.away_score),
            extra_time: self.extra_time,
            penalties: self.penalties,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub match_date: DateTime<Utc>,
}

/// Put a fixture between two approved entrants on the calendar
pub async fn schedule_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewMatch>,
) -> ApiResult<Match> {
    Ok(Json(state.service.schedule_match(input, &actor).await?))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Match> {
    Ok(Json(state.service.get_match(match_id).await?))
}

pub async fn start_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Match> {
    Ok(Json(state.service.start_match(match_id, &actor).await?))
}

pub async fn postpone_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Match> {
    Ok(Json(state.service.postpone_match(match_id, &actor).await?))
}

pub async fn reschedule_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<Match> {
    Ok(Json(
        state
            .service
            .reschedule_match(match_id, request.match_date, &actor)
            .await?,
    ))
}

pub async fn cancel_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Match> {
    Ok(Json(state.service.cancel_match(match_id, &actor).await?))
}

/// Record the final score. The standings move in the same transaction and a
/// second completion of the same match is refused with `409`.
pub async fn complete_match(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<CompleteMatchRequest>,
) -> ApiResult<Match> {
    let result = request.result();
    let completed = state
        .service
        .complete_match(match_id, result, request.notes, &actor)
        .await?;
    metrics::matches_completed_total();
    Ok(Json(completed))
}

/// Events of a match in timeline order (public)
pub async fn list_events(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Vec<MatchEvent>> {
    Ok(Json(state.service.list_events(match_id).await?))
}

pub async fn add_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(match_id): Path<MatchId>,
    Json(event): Json<NewMatchEvent>,
) -> ApiResult<MatchEvent> {
    Ok(Json(state.service.add_event(match_id, event, &actor).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney::matches::Side;

    #[test]
    fn test_complete_request_builds_result() {
        let request: CompleteMatchRequest = serde_json::from_str(
            r#"{"home_score": 1, "away_score": 1,
                "extra_time": {"home": 0, "away": 0},
                "penalties": {"home": 5, "away": 4}}"#,
        )
        .unwrap();

        let result = request.result();
        assert_eq!(result.regulation, Score::new(1, 1));
        assert_eq!(result.winning_side(), Some(Side::Home));
        assert!(request.notes.is_none());
    }
}
