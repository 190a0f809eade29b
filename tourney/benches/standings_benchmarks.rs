use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tourney::{
    matches::{Match, MatchStatus},
    standings::{StandingsTable, rank},
    stats::{GoalRecord, TeamFixture, TournamentCounts, rank_scorers, team_statistics},
};

/// Double round robin between `teams` teams, with deterministic scores
fn round_robin(teams: i64) -> Vec<Match> {
    let kickoff = Utc.with_ymd_and_hms(2025, 8, 1, 15, 0, 0).unwrap();
    let mut matches = Vec::new();
    let mut id = 0;

    for home in 1..=teams {
        for away in 1..=teams {
            if home == away {
                continue;
            }
            id += 1;
            matches.push(Match {
                id,
                tournament_id: 1,
                home_team_id: home,
                away_team_id: away,
                referee_id: None,
                round: None,
                match_date: kickoff + Duration::hours(id),
                venue: None,
                status: MatchStatus::Completed,
                home_score: Some(((home * 7 + away) % 5) as i32),
                away_score: Some(((away * 3 + home) % 4) as i32),
                extra_time: None,
                penalties: None,
                winner_team_id: None,
                notes: None,
            });
        }
    }
    matches
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("standings_replay");

    for teams in [8_i64, 16, 32, 64] {
        let matches = round_robin(teams);
        group.bench_with_input(BenchmarkId::from_parameter(teams), &matches, |b, matches| {
            b.iter(|| {
                StandingsTable::replay(1, (1..=teams).map(|t| (t, None)), matches.iter())
                    .map(StandingsTable::into_ranked)
            });
        });
    }

    group.finish();
}

fn bench_incremental_apply(c: &mut Criterion) {
    let matches = round_robin(32);

    c.bench_function("standings_apply_32_teams", |b| {
        b.iter_batched(
            || StandingsTable::new(1),
            |mut table| {
                for m in &matches {
                    let _ = table.apply(m);
                }
                table
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_rank(c: &mut Criterion) {
    let matches = round_robin(64);
    let rows = StandingsTable::replay(1, (1..=64).map(|t| (t, None)), matches.iter())
        .map(StandingsTable::into_ranked)
        .unwrap();

    c.bench_function("rank_64_rows", |b| {
        b.iter_batched(
            || rows.clone(),
            rank,
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_team_statistics(c: &mut Criterion) {
    let fixtures: Vec<TeamFixture> = round_robin(20)
        .into_iter()
        .map(|fixture| TeamFixture {
            fixture,
            tournament_name: Some("League".to_string()),
        })
        .collect();
    let goals: Vec<GoalRecord> = (0..200)
        .map(|i| GoalRecord {
            player_id: i % 23,
            player_name: None,
            team_id: 1,
            team_name: None,
        })
        .collect();

    c.bench_function("team_statistics_20_teams", |b| {
        b.iter(|| team_statistics(1, &fixtures, &goals, TournamentCounts::default()));
    });

    c.bench_function("rank_scorers_200_goals", |b| {
        b.iter(|| rank_scorers(&goals, 10));
    });
}

criterion_group!(
    standings,
    bench_replay,
    bench_incremental_apply,
    bench_rank,
);

criterion_group!(statistics, bench_team_statistics);

criterion_main!(standings, statistics);
