//! Property-based tests for the league table.
//!
//! Random fixture lists between a handful of teams; every property must hold
//! whatever the scores and whatever order results arrive in.
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tourney::{
    matches::{Match, MatchStatus},
    standings::{POINTS_PER_DRAW, POINTS_PER_WIN, StandingsTable},
};

const TEAMS: i64 = 6;

// Strategy for one fixture: two different teams and a regulation score
fn fixture_strategy() -> impl Strategy<Value = (i64, i64, i32, i32)> {
    (1..=TEAMS, 1..=TEAMS, 0i32..=6, 0i32..=6).prop_filter("Teams must differ", |(h, a, _, _)| h != a)
}

fn build(fixtures: &[(i64, i64, i32, i32)], status_of: impl Fn(usize) -> MatchStatus) -> Vec<Match> {
    let kickoff = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    fixtures
        .iter()
        .enumerate()
        .map(|(i, &(home, away, hs, aws))| Match {
            id: i as i64 + 1,
            tournament_id: 1,
            home_team_id: home,
            away_team_id: away,
            referee_id: None,
            round: None,
            match_date: kickoff + Duration::days(i as i64),
            venue: None,
            status: status_of(i),
            home_score: Some(hs),
            away_score: Some(aws),
            extra_time: None,
            penalties: None,
            winner_team_id: None,
            notes: None,
        })
        .collect()
}

fn entrants() -> impl Iterator<Item = (i64, Option<String>)> {
    (1..=TEAMS).map(|t| (t, None))
}

proptest! {
    #[test]
    fn test_every_row_is_consistent(fixtures in prop::collection::vec(fixture_strategy(), 0..40)) {
        let matches = build(&fixtures, |_| MatchStatus::Completed);
        let table = StandingsTable::replay(1, entrants(), matches.iter()).unwrap();

        for row in table.ranked(None) {
            prop_assert!(row.is_consistent(), "inconsistent row: {:?}", row);
            prop_assert_eq!(row.played, row.won + row.drawn + row.lost);
            prop_assert_eq!(row.goal_difference, row.goals_for - row.goals_against);
            prop_assert_eq!(row.points, row.won * POINTS_PER_WIN + row.drawn * POINTS_PER_DRAW);
        }
    }

    #[test]
    fn test_table_totals_balance(fixtures in prop::collection::vec(fixture_strategy(), 0..40)) {
        let matches = build(&fixtures, |_| MatchStatus::Completed);
        let rows = StandingsTable::replay(1, entrants(), matches.iter()).unwrap().into_ranked();

        let played: i32 = rows.iter().map(|r| r.played).sum();
        let goals_for: i32 = rows.iter().map(|r| r.goals_for).sum();
        let goals_against: i32 = rows.iter().map(|r| r.goals_against).sum();
        let wins: i32 = rows.iter().map(|r| r.won).sum();
        let losses: i32 = rows.iter().map(|r| r.lost).sum();

        prop_assert_eq!(played, 2 * fixtures.len() as i32);
        prop_assert_eq!(goals_for, goals_against);
        prop_assert_eq!(wins, losses);

        let draws = fixtures.iter().filter(|(_, _, h, a)| h == a).count() as i32;
        let decisive = fixtures.len() as i32 - draws;
        let points: i32 = rows.iter().map(|r| r.points).sum();
        prop_assert_eq!(points, decisive * POINTS_PER_WIN + draws * 2 * POINTS_PER_DRAW);
    }

    #[test]
    fn test_incremental_matches_replay(
        fixtures in prop::collection::vec(fixture_strategy(), 0..40),
        seed in any::<u64>(),
    ) {
        let matches = build(&fixtures, |_| MatchStatus::Completed);

        // Apply results in a shuffled arrival order
        let mut arrival: Vec<&Match> = matches.iter().collect();
        let len = arrival.len();
        for i in (1..len).rev() {
            let j = (seed.wrapping_mul(i as u64 + 31).rotate_left(i as u32 % 64) % (i as u64 + 1)) as usize;
            arrival.swap(i, j);
        }

        let mut incremental = StandingsTable::new(1);
        for (team_id, group) in entrants() {
            incremental.seed(team_id, group);
        }
        for m in arrival {
            incremental.apply(m).unwrap();
        }

        let rebuilt = StandingsTable::replay(1, entrants(), matches.iter()).unwrap();
        prop_assert_eq!(incremental.into_ranked(), rebuilt.into_ranked());
    }

    #[test]
    fn test_unfinished_matches_are_ignored(fixtures in prop::collection::vec(fixture_strategy(), 1..30)) {
        let mixed = build(&fixtures, |i| if i % 3 == 0 { MatchStatus::Scheduled } else { MatchStatus::Completed });
        let completed_only: Vec<Match> = mixed
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
            .cloned()
            .collect();

        let from_mixed = StandingsTable::replay(1, entrants(), mixed.iter()).unwrap();
        let from_completed = StandingsTable::replay(1, entrants(), completed_only.iter()).unwrap();
        prop_assert_eq!(from_mixed.into_ranked(), from_completed.into_ranked());
    }

    #[test]
    fn test_replaying_twice_gives_the_same_table(fixtures in prop::collection::vec(fixture_strategy(), 0..40)) {
        let matches = build(&fixtures, |_| MatchStatus::Completed);

        let first = StandingsTable::replay(1, entrants(), matches.iter()).unwrap().into_ranked();
        let second = StandingsTable::replay(1, entrants(), matches.iter()).unwrap().into_ranked();
        prop_assert_eq!(&first, &second);

        // Seeding an entrant that already has a row leaves its numbers alone
        let reseeded = StandingsTable::replay(1, entrants().chain(entrants()), matches.iter())
            .unwrap()
            .into_ranked();
        prop_assert_eq!(first, reseeded);
    }

    #[test]
    fn test_positions_are_dense_and_ordered(fixtures in prop::collection::vec(fixture_strategy(), 0..40)) {
        let matches = build(&fixtures, |_| MatchStatus::Completed);
        let rows = StandingsTable::replay(1, entrants(), matches.iter()).unwrap().into_ranked();

        prop_assert_eq!(rows.len(), TEAMS as usize);
        for (index, pair) in rows.windows(2).enumerate() {
            prop_assert_eq!(pair[0].position, Some(index as u32 + 1));
            prop_assert!(pair[0].points >= pair[1].points);
        }
    }
}
