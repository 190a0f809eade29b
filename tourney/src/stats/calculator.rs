//! Pure statistics over match and event history.

use super::models::{
    FormResult, GoalRecord, OverallRecord, PlayerEventRecord, PlayerStatistics,
    RECENT_EVENTS_LEN, RECENT_FORM_LEN, RecordLine, ScorerLine, TEAM_TOP_SCORERS, TeamFixture,
    TeamStatistics, TournamentCounts, UNKNOWN_TOURNAMENT,
};
use crate::{
    matches::{EventType, Side},
    roster::{PlayerId, TeamId},
};
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
};

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `numerator / denominator`, or 0 when there is nothing to divide by
fn ratio(numerator: f64, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / f64::from(denominator)
    }
}

fn tournament_label(name: &Option<String>) -> String {
    name.clone()
        .unwrap_or_else(|| UNKNOWN_TOURNAMENT.to_string())
}

/// Team statistics from the team's completed matches.
///
/// Matches that are not completed or do not involve the team are ignored.
/// Missing scores count as zero.
pub fn team_statistics(
    team_id: TeamId,
    fixtures: &[TeamFixture],
    goals: &[GoalRecord],
    tournaments: TournamentCounts,
) -> TeamStatistics {
    let mut played: Vec<&TeamFixture> = fixtures
        .iter()
        .filter(|f| f.fixture.is_completed() && f.fixture.involves(team_id))
        .collect();
    played.sort_by_key(|f| Reverse((f.fixture.match_date, f.fixture.id)));

    let mut overall = RecordLine::default();
    let mut clean_sheets = 0;
    let mut home = RecordLine::default();
    let mut away = RecordLine::default();
    let mut by_tournament: BTreeMap<String, RecordLine> = BTreeMap::new();
    let mut recent_form = Vec::with_capacity(RECENT_FORM_LEN);

    for f in &played {
        let m = &f.fixture;
        let Some(side) = m.side_of(team_id) else {
            continue;
        };
        let (own, opponent) = m.regulation_score().for_side(side);

        overall.add(own, opponent);
        if opponent == 0 {
            clean_sheets += 1;
        }
        match side {
            Side::Home => home.add(own, opponent),
            Side::Away => away.add(own, opponent),
        }
        by_tournament
            .entry(tournament_label(&f.tournament_name))
            .or_default()
            .add(own, opponent);

        if recent_form.len() < RECENT_FORM_LEN {
            recent_form.push(FormResult::from_goals(own, opponent));
        }
    }

    let team_goals: Vec<GoalRecord> = goals
        .iter()
        .filter(|g| g.team_id == team_id)
        .cloned()
        .collect();

    TeamStatistics {
        team_id,
        overall: OverallRecord {
            total_matches: overall.played,
            wins: overall.won,
            draws: overall.drawn,
            losses: overall.lost,
            goals_for: overall.goals_for,
            goals_against: overall.goals_against,
            goal_difference: overall.goals_for - overall.goals_against,
            clean_sheets,
            win_rate: round_to(ratio(f64::from(overall.won), overall.played) * 100.0, 1),
            goals_per_match: round_to(ratio(f64::from(overall.goals_for), overall.played), 2),
            goals_conceded_per_match: round_to(
                ratio(f64::from(overall.goals_against), overall.played),
                2,
            ),
        },
        by_tournament,
        home,
        away,
        recent_form,
        top_scorers: rank_scorers(&team_goals, TEAM_TOP_SCORERS),
        total_tournaments: tournaments.total,
        active_tournaments: tournaments.active,
    }
}

/// Count goals per (player, team) and keep the top `limit`.
///
/// Ordered by goals descending, then player id ascending.
pub fn rank_scorers(goals: &[GoalRecord], limit: usize) -> Vec<ScorerLine> {
    let mut lines: BTreeMap<(PlayerId, TeamId), ScorerLine> = BTreeMap::new();

    for goal in goals {
        lines
            .entry((goal.player_id, goal.team_id))
            .or_insert_with(|| ScorerLine {
                player_id: goal.player_id,
                player_name: goal.player_name.clone(),
                team_id: goal.team_id,
                team_name: goal.team_name.clone(),
                goals: 0,
            })
            .goals += 1;
    }

    let mut chart: Vec<ScorerLine> = lines.into_values().collect();
    chart.sort_by(|a, b| b.goals.cmp(&a.goals).then(a.player_id.cmp(&b.player_id)));
    chart.truncate(limit);
    chart
}

/// Player statistics from every event attributed to the player
pub fn player_statistics(player_id: PlayerId, records: &[PlayerEventRecord]) -> PlayerStatistics {
    let mine: Vec<&PlayerEventRecord> = records
        .iter()
        .filter(|r| r.event.player_id == Some(player_id))
        .collect();

    let mut stats = PlayerStatistics {
        player_id,
        total_matches: 0,
        goals: 0,
        own_goals: 0,
        assists: 0,
        yellow_cards: 0,
        red_cards: 0,
        substitutions: 0,
        goals_by_tournament: BTreeMap::new(),
        recent_events: Vec::new(),
    };

    let mut matches = BTreeSet::new();
    for record in &mine {
        matches.insert(record.event.match_id);

        match record.event.event_type {
            EventType::Goal => {
                stats.goals += 1;
                *stats
                    .goals_by_tournament
                    .entry(tournament_label(&record.tournament_name))
                    .or_default() += 1;
            }
            EventType::OwnGoal => stats.own_goals += 1,
            EventType::Assist => stats.assists += 1,
            EventType::YellowCard => stats.yellow_cards += 1,
            EventType::RedCard => stats.red_cards += 1,
            EventType::SubstitutionIn | EventType::SubstitutionOut => stats.substitutions += 1,
        }
    }
    stats.total_matches = matches.len() as u32;

    let mut recent = mine;
    recent.sort_by_key(|r| {
        Reverse((
            r.match_date,
            r.event.minute,
            r.event.additional_time,
            r.event.id,
        ))
    });
    stats.recent_events = recent
        .into_iter()
        .take(RECENT_EVENTS_LEN)
        .map(|r| r.event.clone())
        .collect();

    stats
}
