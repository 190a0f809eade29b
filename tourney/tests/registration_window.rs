//! Registration eligibility across the tournament lifecycle.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tourney::{
    access::{Actor, Role},
    errors::{CoreError, ErrorKind},
    tournament::{
        DateWindow, NewTournament, RegistrationContext, RegistrationStatus, Tournament,
        TournamentStatus, TournamentType, TournamentUpdate,
    },
};

fn opens() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
}

fn cup(status: TournamentStatus, max_teams: u32) -> Tournament {
    Tournament {
        id: 4,
        name: "Spring Cup".to_string(),
        description: Some("Five-a-side".to_string()),
        tournament_type: TournamentType::Knockout,
        status,
        max_teams,
        registration: DateWindow::new(opens(), opens() + Duration::days(14)).unwrap(),
        starts_at: opens() + Duration::days(21),
        ends_at: Some(opens() + Duration::days(28)),
        created_by: Some(1),
        created_at: opens() - Duration::days(3),
    }
}

fn entry(tournament: &Tournament, now: DateTime<Utc>) -> RegistrationContext<'_> {
    RegistrationContext {
        tournament,
        team_id: 12,
        already_registered: false,
        approved_count: 0,
        active_players: 8,
        now,
    }
}

fn manager() -> Actor {
    Actor::new(30, Role::TeamManager)
}

#[test]
fn test_window_is_half_open() {
    let t = cup(TournamentStatus::RegistrationOpen, 8);

    assert!(entry(&t, opens()).evaluate(&manager()).is_ok());
    assert!(entry(&t, opens() + Duration::days(14) - Duration::seconds(1))
        .evaluate(&manager())
        .is_ok());

    let before = entry(&t, opens() - Duration::seconds(1))
        .evaluate(&manager())
        .unwrap_err();
    assert!(matches!(before, CoreError::RegistrationClosed(4)));

    let at_close = entry(&t, opens() + Duration::days(14))
        .evaluate(&manager())
        .unwrap_err();
    assert!(matches!(at_close, CoreError::RegistrationClosed(4)));
}

#[test]
fn test_status_must_be_open_for_managers() {
    for status in [TournamentStatus::Draft, TournamentStatus::InProgress] {
        let t = cup(status, 8);
        let err = entry(&t, opens() + Duration::days(1))
            .evaluate(&manager())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}

#[test]
fn test_terminal_tournaments_refuse_everyone() {
    let admin = Actor::new(1, Role::Admin).with_override(true);
    for status in [TournamentStatus::Completed, TournamentStatus::Cancelled] {
        let t = cup(status, 8);
        let err = entry(&t, opens() + Duration::days(1))
            .evaluate(&admin)
            .unwrap_err();
        assert!(matches!(err, CoreError::TournamentLocked { .. }));
    }
}

#[test]
fn test_capacity_counts_approved_entries() {
    let t = cup(TournamentStatus::RegistrationOpen, 2);
    let mut ctx = entry(&t, opens() + Duration::days(1));

    ctx.approved_count = 1;
    assert_eq!(ctx.evaluate(&manager()).unwrap(), RegistrationStatus::Pending);

    ctx.approved_count = 2;
    let err = ctx.evaluate(&manager()).unwrap_err();
    assert!(matches!(err, CoreError::TournamentFull { max_teams: 2, .. }));
}

#[test]
fn test_team_without_players_cannot_enter() {
    let t = cup(TournamentStatus::RegistrationOpen, 8);
    let mut ctx = entry(&t, opens() + Duration::days(1));
    ctx.active_players = 0;

    assert!(matches!(
        ctx.evaluate(&manager()).unwrap_err(),
        CoreError::EmptyRoster(12)
    ));
}

#[test]
fn test_duplicate_entry_is_a_conflict() {
    let t = cup(TournamentStatus::RegistrationOpen, 8);
    let mut ctx = entry(&t, opens() + Duration::days(1));
    ctx.already_registered = true;

    let err = ctx.evaluate(&Actor::new(1, Role::Admin)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConflictViolation);
}

#[test]
fn test_admin_entries_skip_window_and_are_approved() {
    let t = cup(TournamentStatus::InProgress, 2);
    let mut ctx = entry(&t, opens() + Duration::days(30));
    ctx.approved_count = 2;
    ctx.active_players = 0;

    assert_eq!(
        ctx.evaluate(&Actor::new(1, Role::Admin)).unwrap(),
        RegistrationStatus::Approved
    );
}

#[test]
fn test_new_tournament_validation() {
    let valid = NewTournament {
        name: "Autumn League".to_string(),
        description: None,
        tournament_type: TournamentType::League,
        max_teams: 16,
        registration: DateWindow::new(opens(), opens() + Duration::days(7)).unwrap(),
        starts_at: opens() + Duration::days(7),
        ends_at: None,
    };
    assert!(valid.validate().is_ok());

    let mut too_big = valid.clone();
    too_big.max_teams = 65;
    assert_eq!(too_big.validate().unwrap_err().kind(), ErrorKind::ValidationFailed);

    let mut too_small = valid.clone();
    too_small.max_teams = 1;
    assert!(too_small.validate().is_err());

    let mut early_start = valid.clone();
    early_start.starts_at = opens() + Duration::days(3);
    assert!(early_start.validate().is_err());

    let mut unnamed = valid;
    unnamed.name = "   ".to_string();
    assert!(unnamed.validate().is_err());
}

#[test]
fn test_inverted_window_is_rejected() {
    assert!(DateWindow::new(opens(), opens()).is_err());
    assert!(DateWindow::new(opens() + Duration::days(1), opens()).is_err());

    let update = TournamentUpdate {
        max_teams: Some(0),
        ..Default::default()
    };
    assert!(update.validate().is_err());
}

#[test]
fn test_lifecycle_moves_forward_only() {
    use TournamentStatus::*;

    assert!(Draft.can_transition_to(RegistrationOpen));
    assert!(RegistrationOpen.can_transition_to(InProgress));
    assert!(InProgress.can_transition_to(Completed));
    assert!(Draft.can_transition_to(Cancelled));
    assert!(InProgress.can_transition_to(Cancelled));

    assert!(!InProgress.can_transition_to(RegistrationOpen));
    assert!(!Completed.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Draft));
    assert!(!Draft.can_transition_to(Completed));
}
