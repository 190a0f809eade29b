//! Single entry point over the managers.
//!
//! Each call runs under a timeout from [`crate::db::timeouts`]. Writes that
//! also rebuild the table, such as approving a registration, get the long
//! budget.

use crate::{
    access::Actor,
    db::timeouts::{with_default_timeout, with_long_timeout, with_transaction_timeout},
    errors::CoreResult,
    matches::{
        EventLedger, Match, MatchEvent, MatchId, MatchManager, MatchResult, MatchStatus,
        NewMatch, NewMatchEvent,
    },
    roster::{
        AddPlayerOutcome, AddPlayerRequest, NewPlayer, NewTeam, Player, PlayerId, RosterManager,
        Team, TeamId, TeamPlayer,
    },
    standings::{Standing, StandingsManager},
    stats::{
        DEFAULT_TOURNAMENT_TOP_SCORERS, PlayerStatistics, ScorerLine, StatisticsManager,
        TeamStatistics,
    },
    tournament::{
        NewTournament, RegistrationDecision, RegistrationStatus, Tournament, TournamentId,
        TournamentManager, TournamentRegistration, TournamentStatus, TournamentUpdate,
    },
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

/// Competition service
#[derive(Clone)]
pub struct CompetitionService {
    tournaments: TournamentManager,
    roster: RosterManager,
    matches: MatchManager,
    events: EventLedger,
    standings: StandingsManager,
    statistics: StatisticsManager,
}

impl CompetitionService {
    /// Build every manager over one pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            tournaments: TournamentManager::new(pool.clone()),
            roster: RosterManager::new(pool.clone()),
            matches: MatchManager::new(pool.clone()),
            events: EventLedger::new(pool.clone()),
            standings: StandingsManager::new(pool.clone()),
            statistics: StatisticsManager::new(pool),
        }
    }

    // Results and standings

    /// Record a match result; the table is updated in the same transaction
    pub async fn complete_match(
        &self,
        match_id: MatchId,
        result: MatchResult,
        notes: Option<String>,
        actor: &Actor,
    ) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.complete_match(actor, match_id, result, notes)).await
    }

    /// Rebuild a table from scratch (admin only)
    pub async fn recompute_standings(
        &self,
        tournament_id: TournamentId,
        actor: &Actor,
    ) -> CoreResult<Vec<Standing>> {
        with_long_timeout(self.standings.recompute(actor, tournament_id)).await
    }

    /// Ranked table, optionally limited to one group
    pub async fn get_standings(
        &self,
        tournament_id: TournamentId,
        group_name: Option<&str>,
    ) -> CoreResult<Vec<Standing>> {
        with_default_timeout(self.standings.list_standings(tournament_id, group_name)).await
    }

    // Statistics

    pub async fn get_team_statistics(&self, team_id: TeamId) -> CoreResult<TeamStatistics> {
        with_default_timeout(self.statistics.team_statistics(team_id)).await
    }

    pub async fn get_player_statistics(&self, player_id: PlayerId) -> CoreResult<PlayerStatistics> {
        with_default_timeout(self.statistics.player_statistics(player_id)).await
    }

    pub async fn tournament_top_scorers(
        &self,
        tournament_id: TournamentId,
        limit: Option<usize>,
    ) -> CoreResult<Vec<ScorerLine>> {
        let limit = limit.unwrap_or(DEFAULT_TOURNAMENT_TOP_SCORERS);
        with_default_timeout(self.statistics.tournament_top_scorers(tournament_id, limit)).await
    }

    // Rosters

    pub async fn create_team(&self, input: NewTeam, actor: &Actor) -> CoreResult<Team> {
        with_default_timeout(self.roster.create_team(actor, input)).await
    }

    pub async fn get_team(&self, team_id: TeamId) -> CoreResult<Team> {
        with_default_timeout(self.roster.get_team(team_id)).await
    }

    pub async fn create_player(&self, input: NewPlayer, actor: &Actor) -> CoreResult<Player> {
        with_default_timeout(self.roster.create_player(actor, input)).await
    }

    pub async fn get_player(&self, player_id: PlayerId) -> CoreResult<Player> {
        with_default_timeout(self.roster.get_player(player_id)).await
    }

    pub async fn add_player_to_team(
        &self,
        request: AddPlayerRequest,
        actor: &Actor,
    ) -> CoreResult<AddPlayerOutcome> {
        with_transaction_timeout(self.roster.add_player_to_team(actor, request)).await
    }

    pub async fn remove_player_from_team(
        &self,
        team_id: TeamId,
        player_id: PlayerId,
        actor: &Actor,
    ) -> CoreResult<TeamPlayer> {
        with_transaction_timeout(self.roster.remove_player_from_team(actor, team_id, player_id))
            .await
    }

    pub async fn reassign_jersey(
        &self,
        team_id: TeamId,
        player_id: PlayerId,
        jersey_number: i32,
        actor: &Actor,
    ) -> CoreResult<TeamPlayer> {
        with_transaction_timeout(
            self.roster
                .reassign_jersey(actor, team_id, player_id, jersey_number),
        )
        .await
    }

    pub async fn list_roster(&self, team_id: TeamId) -> CoreResult<Vec<TeamPlayer>> {
        with_default_timeout(self.roster.list_roster(team_id)).await
    }

    /// Every team the player has been on, active and closed, newest first
    pub async fn player_team_history(&self, player_id: PlayerId) -> CoreResult<Vec<TeamPlayer>> {
        with_default_timeout(self.roster.player_memberships(player_id)).await
    }

    /// Players free to join a team
    pub async fn available_players(&self) -> CoreResult<Vec<Player>> {
        with_default_timeout(self.roster.available_players()).await
    }

    pub async fn available_players_for_team(&self, team_id: TeamId) -> CoreResult<Vec<Player>> {
        with_default_timeout(self.roster.available_players_for_team(team_id)).await
    }

    // Tournaments and registrations

    pub async fn create_tournament(
        &self,
        input: NewTournament,
        actor: &Actor,
    ) -> CoreResult<Tournament> {
        with_default_timeout(self.tournaments.create_tournament(actor, input)).await
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> CoreResult<Tournament> {
        with_default_timeout(self.tournaments.get_tournament(tournament_id)).await
    }

    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> CoreResult<Vec<Tournament>> {
        with_default_timeout(self.tournaments.list_tournaments(status)).await
    }

    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        update: TournamentUpdate,
        actor: &Actor,
    ) -> CoreResult<Tournament> {
        with_transaction_timeout(self.tournaments.update_details(actor, tournament_id, update))
            .await
    }

    pub async fn set_tournament_status(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
        actor: &Actor,
    ) -> CoreResult<Tournament> {
        with_transaction_timeout(self.tournaments.update_status(actor, tournament_id, status))
            .await
    }

    /// Enter a team; admins are approved at once and the table is rebuilt in
    /// the same transaction
    pub async fn register_team_for_tournament(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        actor: &Actor,
    ) -> CoreResult<TournamentRegistration> {
        with_long_timeout(
            self.tournaments
                .register_team(actor, tournament_id, team_id),
        )
        .await
    }

    /// Approve or reject a pending entry. Approval rebuilds the table before
    /// the decision commits, so the new entrant has a row.
    pub async fn decide_registration(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
        decision: RegistrationDecision,
        actor: &Actor,
    ) -> CoreResult<TournamentRegistration> {
        with_long_timeout(self.tournaments.decide_registration(
            actor,
            tournament_id,
            team_id,
            decision,
        ))
        .await
    }

    pub async fn list_registrations(
        &self,
        tournament_id: TournamentId,
        status: Option<RegistrationStatus>,
    ) -> CoreResult<Vec<TournamentRegistration>> {
        with_default_timeout(self.tournaments.list_registrations(tournament_id, status)).await
    }

    // Matches and events

    pub async fn schedule_match(&self, input: NewMatch, actor: &Actor) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.schedule_match(actor, input)).await
    }

    pub async fn get_match(&self, match_id: MatchId) -> CoreResult<Match> {
        with_default_timeout(self.matches.get_match(match_id)).await
    }

    pub async fn list_matches(
        &self,
        tournament_id: TournamentId,
        status: Option<MatchStatus>,
    ) -> CoreResult<Vec<Match>> {
        with_default_timeout(self.matches.list_matches(tournament_id, status)).await
    }

    pub async fn start_match(&self, match_id: MatchId, actor: &Actor) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.start_match(actor, match_id)).await
    }

    pub async fn postpone_match(&self, match_id: MatchId, actor: &Actor) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.postpone_match(actor, match_id)).await
    }

    pub async fn reschedule_match(
        &self,
        match_id: MatchId,
        match_date: DateTime<Utc>,
        actor: &Actor,
    ) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.reschedule_match(actor, match_id, match_date)).await
    }

    pub async fn cancel_match(&self, match_id: MatchId, actor: &Actor) -> CoreResult<Match> {
        with_transaction_timeout(self.matches.cancel_match(actor, match_id)).await
    }

    pub async fn add_event(
        &self,
        match_id: MatchId,
        event: NewMatchEvent,
        actor: &Actor,
    ) -> CoreResult<MatchEvent> {
        with_transaction_timeout(self.events.add_event(actor, match_id, event)).await
    }

    pub async fn list_events(&self, match_id: MatchId) -> CoreResult<Vec<MatchEvent>> {
        with_default_timeout(self.events.list_events(match_id)).await
    }
}
