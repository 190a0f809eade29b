//! Role and ownership checks.

use super::models::{Action, Actor, Resource, Role};
use crate::errors::{CoreError, CoreResult};

/// Whether `actor` may perform `action` on `resource`.
///
/// Reads are public. Admins may do anything. Team managers act on the teams
/// they manage and the tournaments they created; referees officiate the
/// matches they are assigned to. Any user may keep their own player profile.
pub fn is_allowed(actor: &Actor, resource: &Resource, action: Action) -> bool {
    if action == Action::Read || actor.role == Role::Admin {
        return true;
    }

    let owns = |owner: Option<i64>| owner == Some(actor.user_id);

    match (actor.role, resource, action) {
        (
            Role::TeamManager,
            Resource::Team { manager_id },
            Action::ManageRoster | Action::RegisterTeam | Action::Update,
        ) => owns(*manager_id),
        (Role::TeamManager, Resource::Team { manager_id }, Action::Create) => {
            manager_id.is_none() || owns(*manager_id)
        }
        (Role::TeamManager, Resource::Tournament { created_by }, Action::Update) => {
            owns(*created_by)
        }
        (_, Resource::Player { user_id }, Action::Create | Action::Update) => owns(Some(*user_id)),
        (Role::Referee, Resource::Match { referee_id }, Action::OfficiateMatch) => {
            owns(*referee_id)
        }
        _ => false,
    }
}

/// Like [`is_allowed`], but returns `Unauthorized` on refusal.
pub fn authorize(actor: &Actor, resource: &Resource, action: Action) -> CoreResult<()> {
    if is_allowed(actor, resource, action) {
        Ok(())
    } else {
        log::debug!(
            "Denied {:?} on {:?} for user {} ({})",
            action,
            resource,
            actor.user_id,
            actor.role
        );
        Err(CoreError::Unauthorized(format!(
            "{} {} may not {:?} this resource",
            actor.role, actor.user_id, action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_reads_are_public() {
        let player = Actor::new(9, Role::Player);
        assert!(is_allowed(&player, &Resource::Standings, Action::Read));
        assert!(is_allowed(
            &player,
            &Resource::Match { referee_id: None },
            Action::Read
        ));
    }

    #[test]
    fn test_admin_can_do_anything() {
        let admin = Actor::new(1, Role::Admin);
        assert!(is_allowed(&admin, &Resource::Standings, Action::Recompute));
        assert!(is_allowed(
            &admin,
            &Resource::Team { manager_id: Some(7) },
            Action::ManageRoster
        ));
    }

    #[test]
    fn test_manager_only_manages_own_team() {
        let manager = Actor::new(7, Role::TeamManager);
        assert!(is_allowed(
            &manager,
            &Resource::Team { manager_id: Some(7) },
            Action::ManageRoster
        ));
        assert!(!is_allowed(
            &manager,
            &Resource::Team { manager_id: Some(8) },
            Action::ManageRoster
        ));
        assert!(!is_allowed(
            &manager,
            &Resource::Team { manager_id: None },
            Action::RegisterTeam
        ));
    }

    #[test]
    fn test_users_keep_their_own_profile() {
        let player = Actor::new(12, Role::Player);
        assert!(is_allowed(
            &player,
            &Resource::Player { user_id: 12 },
            Action::Create
        ));
        assert!(!is_allowed(
            &player,
            &Resource::Player { user_id: 13 },
            Action::Update
        ));
    }

    #[test]
    fn test_manager_creates_teams_for_themselves() {
        let manager = Actor::new(7, Role::TeamManager);
        assert!(is_allowed(
            &manager,
            &Resource::Team { manager_id: None },
            Action::Create
        ));
        assert!(!is_allowed(
            &manager,
            &Resource::Team { manager_id: Some(8) },
            Action::Create
        ));
        assert!(!is_allowed(
            &Actor::new(9, Role::Player),
            &Resource::Team { manager_id: None },
            Action::Create
        ));
    }

    #[test]
    fn test_referee_only_officiates_assigned_match() {
        let referee = Actor::new(3, Role::Referee);
        assert!(is_allowed(
            &referee,
            &Resource::Match { referee_id: Some(3) },
            Action::OfficiateMatch
        ));
        assert!(!is_allowed(
            &referee,
            &Resource::Match { referee_id: Some(4) },
            Action::OfficiateMatch
        ));
        assert!(!is_allowed(
            &referee,
            &Resource::Match { referee_id: Some(3) },
            Action::ScheduleMatch
        ));
    }

    #[test]
    fn test_override_only_counts_for_admins() {
        let manager = Actor::new(7, Role::TeamManager).with_override(true);
        assert!(!manager.skips_checks());
        assert!(Actor::new(1, Role::Admin).with_override(true).skips_checks());
        assert!(!Actor::new(1, Role::Admin).skips_checks());
    }

    #[test]
    fn test_authorize_reports_unauthorized_kind() {
        let player = Actor::new(5, Role::Player);
        let err = authorize(&player, &Resource::Standings, Action::Recompute).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
