use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use roster_shuffle::assign::{
    assign_dual_teams, assign_single_roster, eligible_pool, fill_vacancy, Participant, PoolKind, PriorityOverrides,
    Seat, Status, Team,
};
use roster_shuffle::roles::Role;
use roster_shuffle::AssignError;

fn signup(id: usize, status: Status, preferences: Vec<Role>) -> Participant {
    Participant {
        id: format!("#{id}"),
        name: format!("member {id}"),
        preferences,
        signed_up_at: Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap() + Duration::seconds(id as i64),
        status,
        time_window: None,
    }
}

fn shuffled_roles(rng: &mut StdRng) -> Vec<Role> {
    let mut roles = Role::ALL.to_vec();
    roles.shuffle(rng);
    roles
}

#[test]
fn ten_flexible_players_with_one_pick() {
    let mut rng = StdRng::seed_from_u64(2024);
    let records: Vec<_> = (1..=10)
        .map(|i| signup(i, Status::Attending, shuffled_roles(&mut rng)))
        .collect();
    let pool = eligible_pool(&records, PoolKind::Teams);
    let overrides = PriorityOverrides::from([(Role::Gold, "#3".to_string())]);

    let teams = assign_dual_teams(&pool, &overrides, &mut rng).unwrap();

    let pick = teams.red.get(Role::Gold).unwrap();
    assert_eq!(pick.participant_id, "#3");
    assert!(pick.pinned);

    let placed: HashSet<&str> = teams.placed_ids().into_iter().collect();
    assert_eq!(placed.len(), 10);
    for team in Team::BOTH {
        assert_eq!(teams.lineup(team).len(), Role::ALL.len());
    }
    assert!(teams.substitutes.is_empty());
}

#[test]
fn nine_players_are_not_enough() {
    let mut rng = StdRng::seed_from_u64(1);
    let records: Vec<_> = (1..=9)
        .map(|i| signup(i, Status::Attending, shuffled_roles(&mut rng)))
        .collect();
    let pool = eligible_pool(&records, PoolKind::Teams);

    let err = assign_dual_teams(&pool, &PriorityOverrides::new(), &mut rng).unwrap_err();
    assert_eq!(err, AssignError::InsufficientParticipants { required: 10, available: 9 });
}

#[test]
fn maybe_attendees_fill_rosters_but_not_teams() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut records: Vec<_> = (1..=10)
        .map(|i| signup(i, Status::Attending, shuffled_roles(&mut rng)))
        .collect();
    records[4].status = Status::IfFree;

    let team_pool = eligible_pool(&records, PoolKind::Teams);
    assert!(matches!(
        assign_dual_teams(&team_pool, &PriorityOverrides::new(), &mut rng),
        Err(AssignError::InsufficientParticipants { available: 9, .. })
    ));

    let roster_pool = eligible_pool(&records, PoolKind::Roster);
    let roster = assign_single_roster(&roster_pool, &PriorityOverrides::new());
    assert!(roster.is_complete());
}

#[test]
fn substitutes_are_everyone_left_over() {
    let mut rng = StdRng::seed_from_u64(77);
    let records: Vec<_> = (1..=14)
        .map(|i| signup(i, Status::Attending, shuffled_roles(&mut rng)))
        .collect();
    let pool = eligible_pool(&records, PoolKind::Teams);

    let teams = assign_dual_teams(&pool, &PriorityOverrides::new(), &mut rng).unwrap();
    let placed: HashSet<&str> = teams.placed_ids().into_iter().collect();
    let subs: HashSet<&str> = teams.substitutes.iter().map(|s| s.participant_id.as_str()).collect();

    assert_eq!(subs.len(), 4);
    assert!(placed.is_disjoint(&subs));
    let everyone: HashSet<&str> = pool.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(placed.union(&subs).copied().collect::<HashSet<_>>(), everyone);
}

#[test]
fn roster_then_late_claim() {
    let records = vec![
        signup(1, Status::Attending, vec![Role::Gold, Role::Mid]),
        signup(2, Status::Temporary, vec![Role::Gold, Role::Exp]),
        signup(3, Status::Withdrawn, vec![Role::Jg]),
    ];
    let pool = eligible_pool(&records, PoolKind::Roster);
    let roster = assign_single_roster(&pool, &PriorityOverrides::new());

    assert_eq!(roster.seat(Role::Gold).unwrap().participant_id, "#1");
    assert_eq!(roster.seat(Role::Exp).unwrap().participant_id, "#2");
    assert_eq!(roster.missing_roles(), vec![Role::Jg, Role::Mid, Role::Roam]);

    let roster = fill_vacancy(&roster, Role::Jg, Seat::late_join("#9", "latecomer")).unwrap();
    assert_eq!(
        fill_vacancy(&roster, Role::Jg, Seat::late_join("#10", "too late")).unwrap_err(),
        AssignError::SlotAlreadyFilled(Role::Jg)
    );
}

#[test]
fn large_pool_missing_a_role_is_reported_infeasible() {
    let records: Vec<_> = (1..=18)
        .map(|i| signup(i, Status::Attending, vec![Role::Gold, Role::Mid, Role::Exp, Role::Jg]))
        .collect();
    let pool = eligible_pool(&records, PoolKind::Teams);

    let err = assign_dual_teams(&pool, &PriorityOverrides::new(), &mut StdRng::seed_from_u64(3)).unwrap_err();
    assert!(matches!(err, AssignError::NoFeasibleAssignment { .. }));
}
