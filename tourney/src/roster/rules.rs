//! Roster invariants, checked against a snapshot of a team's active members.
//!
//! The manager loads the snapshot under a team row lock and applies the
//! resulting [`AdditionPlan`]; the partial unique indexes on `team_players`
//! back these checks up if two writers still race.

use super::models::{
    AddPlayerRequest, JerseyReassignment, MAX_JERSEY_NUMBER, MIN_JERSEY_NUMBER, PlayerId, TeamId,
    TeamPlayer, validate_jersey_number,
};
use crate::{
    access::Actor,
    errors::{CoreError, CoreResult},
};

/// Side effects needed on teammates before the new membership is inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionPlan {
    pub reassign: Option<JerseyReassignment>,
    pub demote_captain: Option<PlayerId>,
}

/// Check an addition against the team's active roster.
///
/// `active_elsewhere` is the player's current team, if any other. Checks run
/// in order and fail fast:
///
/// 1. the player is not already on this team (never bypassable)
/// 2. the player is not active on another team (admins skip this)
/// 3. the jersey number is free; an admin with the override who asked for
///    reassignment moves the holder to the lowest free number instead
/// 4. a requested captaincy is vacant; an admin with the override demotes
///    the current captain instead
pub fn plan_addition(
    actor: &Actor,
    request: &AddPlayerRequest,
    roster: &[TeamPlayer],
    active_elsewhere: Option<TeamId>,
) -> CoreResult<AdditionPlan> {
    validate_jersey_number(request.jersey_number)?;

    let active = || roster.iter().filter(|m| m.is_active());
    let mut plan = AdditionPlan::default();

    if active().any(|m| m.player_id == request.player_id) {
        return Err(CoreError::AlreadyOnTeam {
            team_id: request.team_id,
            player_id: request.player_id,
        });
    }

    if let Some(team_id) = active_elsewhere
        && !actor.is_admin()
    {
        return Err(CoreError::PlayerAlreadyRostered {
            player_id: request.player_id,
            team_id,
        });
    }

    if let Some(holder) = active().find(|m| m.jersey_number == request.jersey_number) {
        if !(actor.skips_checks() && request.reassign_conflicting_jersey) {
            return Err(CoreError::JerseyNumberTaken {
                team_id: request.team_id,
                jersey_number: request.jersey_number,
            });
        }
        let to = next_free_jersey(roster).ok_or(CoreError::NoFreeJerseyNumber(request.team_id))?;
        plan.reassign = Some(JerseyReassignment {
            player_id: holder.player_id,
            from: holder.jersey_number,
            to,
        });
    }

    if request.is_captain
        && let Some(captain) = active().find(|m| m.is_captain)
    {
        if !actor.skips_checks() {
            return Err(CoreError::CaptainAlreadyAssigned(request.team_id));
        }
        plan.demote_captain = Some(captain.player_id);
    }

    Ok(plan)
}

/// Lowest jersey number not worn by an active member, scanning 1 to 99
pub fn next_free_jersey(roster: &[TeamPlayer]) -> Option<i32> {
    (MIN_JERSEY_NUMBER..=MAX_JERSEY_NUMBER).find(|number| {
        !roster
            .iter()
            .any(|m| m.is_active() && m.jersey_number == *number)
    })
}

/// Check that a player may switch to `jersey_number` on their team
pub fn check_jersey_change(
    team_id: TeamId,
    player_id: PlayerId,
    jersey_number: i32,
    roster: &[TeamPlayer],
) -> CoreResult<()> {
    validate_jersey_number(jersey_number)?;

    if !roster
        .iter()
        .any(|m| m.is_active() && m.player_id == player_id)
    {
        return Err(CoreError::MembershipNotFound { team_id, player_id });
    }

    let taken = roster
        .iter()
        .any(|m| m.is_active() && m.player_id != player_id && m.jersey_number == jersey_number);
    if taken {
        return Err(CoreError::JerseyNumberTaken {
            team_id,
            jersey_number,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::Role,
        errors::ErrorKind,
        roster::models::MembershipStatus,
    };
    use chrono::NaiveDate;

    fn member(player_id: PlayerId, jersey_number: i32, is_captain: bool) -> TeamPlayer {
        TeamPlayer {
            id: player_id,
            team_id: 1,
            player_id,
            jersey_number,
            position: None,
            is_captain,
            joined_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            status: MembershipStatus::Active,
        }
    }

    fn request(player_id: PlayerId, jersey_number: i32, is_captain: bool) -> AddPlayerRequest {
        AddPlayerRequest {
            team_id: 1,
            player_id,
            jersey_number,
            is_captain,
            joined_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            position: None,
            reassign_conflicting_jersey: false,
        }
    }

    fn manager() -> Actor {
        Actor::new(7, Role::TeamManager)
    }

    fn admin_override() -> Actor {
        Actor::new(1, Role::Admin).with_override(true)
    }

    #[test]
    fn test_clean_addition_has_no_side_effects() {
        let roster = vec![member(10, 1, true), member(11, 2, false)];
        let plan = plan_addition(&manager(), &request(12, 3, false), &roster, None).unwrap();
        assert_eq!(plan, AdditionPlan::default());
    }

    #[test]
    fn test_jersey_conflict_for_manager() {
        let roster = vec![member(10, 9, false)];
        let err = plan_addition(&manager(), &request(12, 9, false), &roster, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::JerseyNumberTaken {
                jersey_number: 9,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::ConflictViolation);
    }

    #[test]
    fn test_override_without_reassign_flag_still_conflicts() {
        let roster = vec![member(10, 9, false)];
        let err =
            plan_addition(&admin_override(), &request(12, 9, false), &roster, None).unwrap_err();
        assert!(matches!(err, CoreError::JerseyNumberTaken { .. }));
    }

    #[test]
    fn test_override_reassigns_holder_to_lowest_free_number() {
        let roster = vec![member(10, 1, false), member(11, 2, false), member(13, 9, false)];
        let mut req = request(12, 9, false);
        req.reassign_conflicting_jersey = true;

        let plan = plan_addition(&admin_override(), &req, &roster, None).unwrap();
        assert_eq!(
            plan.reassign,
            Some(JerseyReassignment {
                player_id: 13,
                from: 9,
                to: 3
            })
        );
    }

    #[test]
    fn test_second_captain_rejected_without_override() {
        let roster = vec![member(10, 1, true)];
        let err = plan_addition(&manager(), &request(12, 5, true), &roster, None).unwrap_err();
        assert!(matches!(err, CoreError::CaptainAlreadyAssigned(1)));

        let admin = Actor::new(1, Role::Admin);
        assert!(plan_addition(&admin, &request(12, 5, true), &roster, None).is_err());
    }

    #[test]
    fn test_override_demotes_existing_captain() {
        let roster = vec![member(10, 1, true)];
        let plan = plan_addition(&admin_override(), &request(12, 5, true), &roster, None).unwrap();
        assert_eq!(plan.demote_captain, Some(10));
    }

    #[test]
    fn test_closed_memberships_do_not_hold_numbers_or_captaincy() {
        let mut old = member(10, 9, true);
        old.status = MembershipStatus::Closed {
            left_date: chrono::Utc::now(),
        };

        let plan = plan_addition(&manager(), &request(12, 9, true), &[old], None).unwrap();
        assert_eq!(plan, AdditionPlan::default());
    }

    #[test]
    fn test_active_elsewhere_blocks_non_admins_only() {
        let err = plan_addition(&manager(), &request(12, 5, false), &[], Some(4)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PlayerAlreadyRostered {
                player_id: 12,
                team_id: 4
            }
        ));

        let admin = Actor::new(1, Role::Admin);
        assert!(plan_addition(&admin, &request(12, 5, false), &[], Some(4)).is_ok());
    }

    #[test]
    fn test_already_on_team_is_never_bypassed() {
        let roster = vec![member(12, 5, false)];
        let err =
            plan_addition(&admin_override(), &request(12, 6, false), &roster, None).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyOnTeam { .. }));
    }

    #[test]
    fn test_full_roster_has_no_free_number() {
        let roster: Vec<_> = (1..=99).map(|n| member(n as i64 + 100, n, false)).collect();
        assert_eq!(next_free_jersey(&roster), None);

        let mut req = request(12, 9, false);
        req.reassign_conflicting_jersey = true;
        let err = plan_addition(&admin_override(), &req, &roster, None).unwrap_err();
        assert!(matches!(err, CoreError::NoFreeJerseyNumber(1)));
    }

    #[test]
    fn test_jersey_change_checks() {
        let roster = vec![member(10, 7, false), member(11, 8, false)];
        assert!(check_jersey_change(1, 10, 12, &roster).is_ok());
        assert!(check_jersey_change(1, 10, 7, &roster).is_ok());
        assert!(matches!(
            check_jersey_change(1, 10, 8, &roster),
            Err(CoreError::JerseyNumberTaken { .. })
        ));
        assert!(matches!(
            check_jersey_change(1, 99, 5, &roster),
            Err(CoreError::MembershipNotFound { .. })
        ));
    }
}
