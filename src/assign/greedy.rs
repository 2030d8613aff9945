use std::collections::HashSet;

use tracing::{debug, info};

use super::overrides::resolve_overrides;
use super::types::{Assignment, Participant, PriorityOverrides, Seat};
use crate::roles::ROLE_COUNT;

/// Fills one set of roles from the pool in signup order.
///
/// Overrides go first. Everyone else, earliest signup first, takes the first
/// role in their preference list that is still empty. Roles nobody wanted
/// stay `None` for the organizer to fill by hand. Single pass, no retries.
pub fn assign_single_roster(pool: &[Participant], overrides: &PriorityOverrides) -> Assignment {
    let mut assignment = Assignment::empty();
    let mut used: HashSet<&str> = HashSet::new();

    let resolved = resolve_overrides(pool, overrides);
    for (role, participant) in &resolved.pins {
        assignment.slots.insert(*role, Some(Seat::pinned(participant)));
        used.insert(participant.id.as_str());
    }

    // Sort candidates by signup time (earliest first), ties by id
    let mut candidates: Vec<&Participant> = pool.iter().filter(|p| !used.contains(p.id.as_str())).collect();
    candidates.sort_by(|a, b| {
        a.signed_up_at
            .cmp(&b.signed_up_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    for participant in candidates {
        if assignment.is_complete() {
            break;
        }
        let open_role = participant
            .preferences
            .iter()
            .copied()
            .find(|role| matches!(assignment.slots.get(role), Some(None)));

        match open_role {
            Some(role) => {
                debug!(participant = %participant.id, %role, "roster role taken");
                assignment.slots.insert(role, Some(Seat::for_participant(participant)));
                used.insert(participant.id.as_str());
            }
            None => assignment.unplaced.push(participant.id.clone()),
        }
    }

    // Anyone not reached because the roster filled up is unplaced as well
    let unreached: Vec<_> = pool
        .iter()
        .filter(|p| !used.contains(p.id.as_str()) && !assignment.unplaced.contains(&p.id))
        .map(|p| p.id.clone())
        .collect();
    assignment.unplaced.extend(unreached);

    let missing = assignment.missing_roles().len();
    info!(filled = ROLE_COUNT - missing, missing, "single roster assigned");
    assignment
}
