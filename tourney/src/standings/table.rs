//! In-memory league table: applying results, full replays and ranking.

use super::models::{Standing, StandingDelta};
use crate::{
    errors::CoreResult,
    matches::Match,
    roster::TeamId,
    tournament::TournamentId,
};
use std::{cmp::Ordering, collections::BTreeMap};

/// Table ordering: points, goal difference and goals scored, all descending,
/// then team id ascending so equal rows always come out the same way.
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Sort rows and number them from 1
pub fn rank(mut rows: Vec<Standing>) -> Vec<Standing> {
    rows.sort_by(compare);
    for (index, row) in rows.iter_mut().enumerate() {
        row.position = Some(index as u32 + 1);
    }
    rows
}

/// A tournament's table keyed by team
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsTable {
    tournament_id: TournamentId,
    rows: BTreeMap<TeamId, Standing>,
}

impl StandingsTable {
    pub fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            rows: BTreeMap::new(),
        }
    }

    /// Give a team a zeroed row (or update its group if it already has one)
    pub fn seed(&mut self, team_id: TeamId, group_name: Option<String>) {
        let tournament_id = self.tournament_id;
        match self.rows.get_mut(&team_id) {
            Some(row) => row.group_name = group_name,
            None => {
                self.rows
                    .insert(team_id, Standing::zeroed(tournament_id, team_id, group_name));
            }
        }
    }

    /// Fold one completed match into the table.
    ///
    /// Teams without a row get one on first appearance.
    pub fn apply(&mut self, m: &Match) -> CoreResult<()> {
        for delta in StandingDelta::for_match(m)? {
            self.row_mut(delta.team_id).absorb(&delta);
        }
        Ok(())
    }

    /// Rebuild a table from nothing.
    ///
    /// Every entrant gets a zeroed row, then completed matches are applied in
    /// `(match_date, id)` order. Anything not completed is skipped.
    pub fn replay<'a>(
        tournament_id: TournamentId,
        entrants: impl IntoIterator<Item = (TeamId, Option<String>)>,
        matches: impl IntoIterator<Item = &'a Match>,
    ) -> CoreResult<Self> {
        let mut table = Self::new(tournament_id);
        for (team_id, group_name) in entrants {
            table.seed(team_id, group_name);
        }

        let mut completed: Vec<&Match> = matches
            .into_iter()
            .filter(|m| m.tournament_id == tournament_id && m.is_completed())
            .collect();
        completed.sort_by_key(|m| (m.match_date, m.id));

        for m in completed {
            table.apply(m)?;
        }
        Ok(table)
    }

    pub fn get(&self, team_id: TeamId) -> Option<&Standing> {
        self.rows.get(&team_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ranked rows, optionally limited to one group
    pub fn ranked(&self, group_name: Option<&str>) -> Vec<Standing> {
        let rows = self
            .rows
            .values()
            .filter(|row| group_name.is_none() || row.group_name.as_deref() == group_name)
            .cloned()
            .collect();
        rank(rows)
    }

    /// All rows, ranked
    pub fn into_ranked(self) -> Vec<Standing> {
        rank(self.rows.into_values().collect())
    }

    fn row_mut(&mut self, team_id: TeamId) -> &mut Standing {
        let tournament_id = self.tournament_id;
        self.rows
            .entry(team_id)
            .or_insert_with(|| Standing::zeroed(tournament_id, team_id, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn played(id: i64, home: i64, away: i64, score: (i32, i32), day: i64) -> Match {
        Match {
            id,
            tournament_id: 1,
            home_team_id: home,
            away_team_id: away,
            referee_id: None,
            round: None,
            match_date: Utc.with_ymd_and_hms(2025, 4, 1, 15, 0, 0).unwrap() + Duration::days(day),
            venue: None,
            status: MatchStatus::Completed,
            home_score: Some(score.0),
            away_score: Some(score.1),
            extra_time: None,
            penalties: None,
            winner_team_id: None,
            notes: None,
        }
    }

    #[test]
    fn test_single_result() {
        let mut table = StandingsTable::new(1);
        table.apply(&played(1, 10, 20, (2, 1), 0)).unwrap();

        let home = table.get(10).unwrap();
        assert_eq!((home.played, home.won, home.points), (1, 1, 3));
        assert_eq!((home.goals_for, home.goals_against, home.goal_difference), (2, 1, 1));

        let away = table.get(20).unwrap();
        assert_eq!((away.played, away.lost, away.points), (1, 1, 0));
        assert_eq!(away.goal_difference, -1);
    }

    #[test]
    fn test_draw_gives_both_a_point() {
        let mut table = StandingsTable::new(1);
        table.apply(&played(1, 10, 20, (1, 1), 0)).unwrap();

        for team in [10, 20] {
            let row = table.get(team).unwrap();
            assert_eq!((row.drawn, row.points), (1, 1));
        }
    }

    #[test]
    fn test_unfinished_match_is_rejected() {
        let mut m = played(1, 10, 20, (1, 0), 0);
        m.status = MatchStatus::InProgress;

        let mut table = StandingsTable::new(1);
        assert!(table.apply(&m).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_ranking_tie_breaks() {
        let mut table = StandingsTable::new(1);
        // 10 and 30 both win once; 10 by more
        table.apply(&played(1, 10, 20, (3, 0), 0)).unwrap();
        table.apply(&played(2, 30, 40, (1, 0), 0)).unwrap();

        let order: Vec<_> = table.ranked(None).iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec![10, 30, 40, 20]);
    }

    #[test]
    fn test_goals_for_then_team_id_break_ties() {
        let mut table = StandingsTable::new(1);
        table.apply(&played(1, 10, 20, (2, 2), 0)).unwrap();
        table.apply(&played(2, 30, 40, (1, 1), 0)).unwrap();

        let ranked = table.ranked(None);
        let order: Vec<_> = ranked.iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec![10, 20, 30, 40]);
        let positions: Vec<_> = ranked.iter().map(|r| r.position.unwrap()).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_replay_seeds_entrants_and_skips_unfinished() {
        let mut pending = played(3, 10, 30, (5, 0), 2);
        pending.status = MatchStatus::Scheduled;
        let matches = vec![played(1, 10, 20, (1, 0), 0), pending];

        let table = StandingsTable::replay(
            1,
            [(10, None), (20, None), (30, Some("B".to_string()))],
            &matches,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(30).unwrap().played, 0);
        assert_eq!(table.get(10).unwrap().points, 3);
    }

    #[test]
    fn test_group_filter() {
        let table = StandingsTable::replay(
            1,
            [
                (10, Some("A".to_string())),
                (20, Some("B".to_string())),
                (30, Some("A".to_string())),
            ],
            &[played(1, 10, 30, (0, 1), 0)],
        )
        .unwrap();

        let group_a = table.ranked(Some("A"));
        assert_eq!(group_a.len(), 2);
        assert_eq!(group_a[0].team_id, 30);
        assert_eq!(group_a[0].position, Some(1));
    }
}
