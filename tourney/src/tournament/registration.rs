//! Eligibility rules for entering a team into a tournament.

use super::models::{RegistrationStatus, Tournament, TournamentStatus};
use crate::{
    access::Actor,
    errors::{CoreError, CoreResult},
    roster::TeamId,
};
use chrono::{DateTime, Utc};

/// Facts gathered (under lock) before deciding on a registration
#[derive(Debug, Clone)]
pub struct RegistrationContext<'a> {
    pub tournament: &'a Tournament,
    pub team_id: TeamId,
    pub already_registered: bool,
    pub approved_count: u32,
    pub active_players: u32,
    pub now: DateTime<Utc>,
}

impl RegistrationContext<'_> {
    /// Decide whether the team may enter, and with which status.
    ///
    /// Duplicate entries and finished tournaments are refused for everyone.
    /// Admins skip the window, capacity and roster checks and are approved
    /// straight away; everyone else lands in `pending`.
    pub fn evaluate(&self, actor: &Actor) -> CoreResult<RegistrationStatus> {
        let tournament = self.tournament;

        if tournament.status.is_terminal() {
            return Err(CoreError::TournamentLocked {
                tournament_id: tournament.id,
                status: tournament.status,
            });
        }

        if self.already_registered {
            return Err(CoreError::AlreadyRegistered {
                tournament_id: tournament.id,
                team_id: self.team_id,
            });
        }

        if actor.is_admin() {
            return Ok(RegistrationStatus::Approved);
        }

        if tournament.status != TournamentStatus::RegistrationOpen
            || !tournament.registration.contains(self.now)
        {
            return Err(CoreError::RegistrationClosed(tournament.id));
        }

        if self.approved_count >= tournament.max_teams {
            return Err(CoreError::TournamentFull {
                tournament_id: tournament.id,
                max_teams: tournament.max_teams,
            });
        }

        if self.active_players == 0 {
            return Err(CoreError::EmptyRoster(self.team_id));
        }

        Ok(RegistrationStatus::Pending)
    }
}
