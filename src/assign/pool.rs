use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::{Participant, Status};

/// Which assignment operation a pool is being built for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// Open roster: anyone who might turn up.
    Roster,
    /// Strict two-team split: only participants present for the whole session.
    Teams,
}

impl PoolKind {
    pub fn accepts(self, status: Status) -> bool {
        match self {
            PoolKind::Roster => matches!(status, Status::Attending | Status::Temporary | Status::IfFree),
            PoolKind::Teams => status == Status::Attending,
        }
    }
}

/// Filters an event's registrations down to those eligible for `kind`.
///
/// The result is ordered by signup time (ties by id) and contains each
/// participant id once; the first record seen for an id wins.
pub fn eligible_pool<'a, I>(participants: I, kind: PoolKind) -> Vec<Participant>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut seen = HashSet::new();
    let mut pool: Vec<Participant> = participants
        .into_iter()
        .filter(|p| kind.accepts(p.status))
        .filter(|p| seen.insert(p.id.clone()))
        .cloned()
        .collect();
    pool.sort_by(|a, b| {
        a.signed_up_at
            .cmp(&b.signed_up_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::testing::participant;
    use crate::roles::Role;

    #[test]
    fn roster_pool_keeps_every_attending_status() {
        let records = vec![
            participant("1", 0, Status::Attending, &[Role::Gold]),
            participant("2", 1, Status::Temporary, &[Role::Mid]),
            participant("3", 2, Status::IfFree, &[Role::Jg]),
            participant("4", 3, Status::Withdrawn, &[Role::Exp]),
        ];
        let ids: Vec<String> = eligible_pool(&records, PoolKind::Roster).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn team_pool_only_keeps_full_attendance() {
        let records = vec![
            participant("1", 0, Status::Attending, &[Role::Gold]),
            participant("2", 1, Status::Temporary, &[Role::Mid]),
            participant("3", 2, Status::IfFree, &[Role::Jg]),
        ];
        let pool = eligible_pool(&records, PoolKind::Teams);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, "1");
    }

    #[test]
    fn pool_is_ordered_by_signup_then_id_and_deduplicated() {
        let records = vec![
            participant("b", 5, Status::Attending, &[]),
            participant("a", 5, Status::Attending, &[]),
            participant("c", 1, Status::Attending, &[]),
            participant("a", 9, Status::Attending, &[]),
        ];
        let pool = eligible_pool(&records, PoolKind::Teams);
        let ids: Vec<&str> = pool.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(pool[1].signed_up_at, records[1].signed_up_at);
    }

    #[test]
    fn empty_pool_is_not_an_error() {
        let records = vec![participant("1", 0, Status::Withdrawn, &[Role::Gold])];
        assert!(eligible_pool(&records, PoolKind::Roster).is_empty());
    }
}
