//! Team and player statistics from match history.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tourney::{
    matches::{EventType, Match, MatchEvent, MatchStatus},
    stats::{
        FormResult, GoalRecord, PlayerEventRecord, TeamFixture, TournamentCounts,
        UNKNOWN_TOURNAMENT, player_statistics, team_statistics,
    },
};

const TEAM: i64 = 1;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 4, 15, 0, 0).unwrap() + Duration::days(n)
}

fn fixture(
    id: i64,
    home: i64,
    away: i64,
    score: (i32, i32),
    on: i64,
    tournament: Option<&str>,
) -> TeamFixture {
    TeamFixture {
        fixture: Match {
            id,
            tournament_id: 1,
            home_team_id: home,
            away_team_id: away,
            referee_id: None,
            round: None,
            match_date: day(on),
            venue: None,
            status: MatchStatus::Completed,
            home_score: Some(score.0),
            away_score: Some(score.1),
            extra_time: None,
            penalties: None,
            winner_team_id: None,
            notes: None,
        },
        tournament_name: tournament.map(str::to_string),
    }
}

fn goal(player_id: i64, team_id: i64) -> GoalRecord {
    GoalRecord {
        player_id,
        player_name: Some(format!("Player {player_id}")),
        team_id,
        team_name: Some(format!("Team {team_id}")),
    }
}

#[test]
fn test_team_without_matches_reports_zeroes() {
    let stats = team_statistics(TEAM, &[], &[], TournamentCounts::default());

    assert_eq!(stats.overall.total_matches, 0);
    assert_eq!(stats.overall.win_rate, 0.0);
    assert_eq!(stats.overall.goals_per_match, 0.0);
    assert_eq!(stats.overall.goals_conceded_per_match, 0.0);
    assert!(stats.recent_form.is_empty());
    assert!(stats.top_scorers.is_empty());
    assert!(stats.by_tournament.is_empty());
}

#[test]
fn test_overall_record_and_rounding() {
    let fixtures = vec![
        fixture(1, TEAM, 2, (2, 0), 0, Some("Winter League")),
        fixture(2, 3, TEAM, (1, 1), 7, Some("Winter League")),
        fixture(3, TEAM, 4, (0, 3), 14, None),
    ];
    let counts = TournamentCounts { total: 3, active: 1 };
    let stats = team_statistics(TEAM, &fixtures, &[], counts);
    let overall = stats.overall;

    assert_eq!(overall.total_matches, 3);
    assert_eq!((overall.wins, overall.draws, overall.losses), (1, 1, 1));
    assert_eq!((overall.goals_for, overall.goals_against), (3, 4));
    assert_eq!(overall.goal_difference, -1);
    assert_eq!(overall.clean_sheets, 1);
    assert_eq!(overall.win_rate, 33.3);
    assert_eq!(overall.goals_per_match, 1.0);
    assert_eq!(overall.goals_conceded_per_match, 1.33);

    assert_eq!(stats.total_tournaments, 3);
    assert_eq!(stats.active_tournaments, 1);
}

#[test]
fn test_home_away_and_tournament_splits() {
    let fixtures = vec![
        fixture(1, TEAM, 2, (2, 0), 0, Some("Winter League")),
        fixture(2, 3, TEAM, (1, 1), 7, Some("Winter League")),
        fixture(3, TEAM, 4, (0, 3), 14, None),
    ];
    let stats = team_statistics(TEAM, &fixtures, &[], TournamentCounts::default());

    assert_eq!((stats.home.played, stats.home.won, stats.home.lost), (2, 1, 1));
    assert_eq!((stats.away.played, stats.away.drawn), (1, 1));
    assert_eq!((stats.away.goals_for, stats.away.goals_against), (1, 1));

    let league = &stats.by_tournament["Winter League"];
    assert_eq!((league.played, league.won, league.drawn), (2, 1, 1));
    let unknown = &stats.by_tournament[UNKNOWN_TOURNAMENT];
    assert_eq!((unknown.played, unknown.lost), (1, 1));
}

#[test]
fn test_recent_form_is_newest_first_and_capped() {
    let fixtures: Vec<TeamFixture> = (0..7)
        .map(|n| {
            // Wins on even days, losses on odd days
            let score = if n % 2 == 0 { (1, 0) } else { (0, 1) };
            fixture(n + 1, TEAM, 9, score, n, Some("Cup"))
        })
        .collect();
    let stats = team_statistics(TEAM, &fixtures, &[], TournamentCounts::default());

    // Newest is day 6 (a win)
    assert_eq!(
        stats.recent_form,
        vec![
            FormResult::Win,
            FormResult::Loss,
            FormResult::Win,
            FormResult::Loss,
            FormResult::Win
        ]
    );
    assert_eq!(stats.overall.total_matches, 7);
}

#[test]
fn test_unfinished_and_foreign_matches_are_ignored() {
    let mut pending = fixture(1, TEAM, 2, (5, 0), 0, None);
    pending.fixture.status = MatchStatus::Scheduled;
    let foreign = fixture(2, 5, 6, (3, 3), 1, None);
    let counted = fixture(3, 2, TEAM, (0, 2), 2, None);

    let stats = team_statistics(TEAM, &[pending, foreign, counted], &[], TournamentCounts::default());
    assert_eq!(stats.overall.total_matches, 1);
    assert_eq!(stats.overall.wins, 1);
    assert_eq!(stats.overall.clean_sheets, 1);
    assert_eq!(stats.recent_form, vec![FormResult::Win]);
}

#[test]
fn test_top_scorers_belong_to_the_team() {
    let goals = vec![
        goal(10, TEAM),
        goal(11, TEAM),
        goal(11, TEAM),
        goal(12, 2),
        goal(12, 2),
        goal(12, 2),
    ];
    let stats = team_statistics(TEAM, &[], &goals, TournamentCounts::default());

    let chart: Vec<(i64, u32)> = stats.top_scorers.iter().map(|l| (l.player_id, l.goals)).collect();
    assert_eq!(chart, vec![(11, 2), (10, 1)]);
}

fn event(id: i64, match_id: i64, event_type: EventType, minute: i32) -> MatchEvent {
    MatchEvent {
        id,
        match_id,
        team_id: TEAM,
        player_id: Some(50),
        event_type,
        minute,
        additional_time: 0,
        description: None,
        created_at: day(0),
    }
}

fn record(event: MatchEvent, on: i64, tournament: Option<&str>) -> PlayerEventRecord {
    PlayerEventRecord {
        event,
        match_date: day(on),
        tournament_name: tournament.map(str::to_string),
    }
}

#[test]
fn test_player_event_counts() {
    let records = vec![
        record(event(1, 100, EventType::Goal, 12), 0, Some("Cup")),
        record(event(2, 100, EventType::YellowCard, 40), 0, Some("Cup")),
        record(event(3, 101, EventType::Goal, 3), 7, Some("League")),
        record(event(4, 101, EventType::Goal, 88), 7, None),
        record(event(5, 102, EventType::Assist, 55), 14, Some("League")),
        record(event(6, 102, EventType::SubstitutionOut, 70), 14, Some("League")),
        record(event(7, 103, EventType::OwnGoal, 20), 21, Some("League")),
        record(event(8, 103, EventType::RedCard, 21), 21, Some("League")),
    ];
    let stats = player_statistics(50, &records);

    assert_eq!(stats.total_matches, 4);
    assert_eq!(stats.goals, 3);
    assert_eq!(stats.own_goals, 1);
    assert_eq!(stats.assists, 1);
    assert_eq!(stats.yellow_cards, 1);
    assert_eq!(stats.red_cards, 1);
    assert_eq!(stats.substitutions, 1);

    assert_eq!(stats.goals_by_tournament["Cup"], 1);
    assert_eq!(stats.goals_by_tournament["League"], 1);
    assert_eq!(stats.goals_by_tournament[UNKNOWN_TOURNAMENT], 1);
}

#[test]
fn test_recent_events_newest_first_and_capped() {
    let records: Vec<PlayerEventRecord> = (0..12)
        .map(|n| record(event(n + 1, 200 + n, EventType::Goal, 30), n, None))
        .collect();
    let stats = player_statistics(50, &records);

    assert_eq!(stats.recent_events.len(), 10);
    assert_eq!(stats.recent_events[0].id, 12);
    assert_eq!(stats.recent_events[9].id, 3);
}

#[test]
fn test_player_without_events() {
    let stats = player_statistics(50, &[]);
    assert_eq!(stats.total_matches, 0);
    assert_eq!(stats.goals, 0);
    assert!(stats.recent_events.is_empty());
}
