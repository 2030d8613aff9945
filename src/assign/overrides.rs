use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use super::types::{Participant, ParticipantId, PriorityOverrides};
use crate::error::{AssignError, OverrideRejection};
use crate::roles::Role;

/// Pins that survived validation against one pool.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOverrides<'a> {
    pub pins: BTreeMap<Role, &'a Participant>,
    pub rejected: Vec<AssignError>,
}

impl<'a> ResolvedOverrides<'a> {
    pub fn is_pinned(&self, participant_id: &str) -> bool {
        self.pins.values().any(|p| p.id == participant_id)
    }
}

fn rejection(role: impl ToString, participant_id: &str, reason: OverrideRejection) -> AssignError {
    let err = AssignError::InvalidOverride {
        role: role.to_string(),
        participant_id: participant_id.to_string(),
        reason,
    };
    warn!("{}", err);
    err
}

/// Builds an override map from raw `(role token, participant id)` pairs.
///
/// Unknown role tokens are returned as diagnostics. A later pair for the same
/// role replaces the earlier one.
pub fn parse_overrides<I, S, T>(pairs: I) -> (PriorityOverrides, Vec<AssignError>)
where
    I: IntoIterator<Item = (S, T)>,
    S: AsRef<str>,
    T: Into<ParticipantId>,
{
    let mut overrides = PriorityOverrides::new();
    let mut rejected = Vec::new();
    for (token, participant_id) in pairs {
        let participant_id = participant_id.into();
        match token.as_ref().parse::<Role>() {
            Ok(role) => {
                overrides.insert(role, participant_id);
            }
            Err(_) => rejected.push(rejection(token.as_ref().trim(), &participant_id, OverrideRejection::UnknownRole)),
        }
    }
    (overrides, rejected)
}

/// Matches overrides against `pool` in role order.
///
/// A participant can be pinned once; any further pins naming them, and pins
/// naming someone outside the pool, are rejected rather than applied.
pub fn resolve_overrides<'a>(pool: &'a [Participant], overrides: &PriorityOverrides) -> ResolvedOverrides<'a> {
    let mut resolved = ResolvedOverrides::default();
    let mut used: HashSet<&str> = HashSet::new();

    for (&role, participant_id) in overrides {
        let Some(participant) = pool.iter().find(|p| &p.id == participant_id) else {
            resolved.rejected.push(rejection(role, participant_id, OverrideRejection::NotInPool));
            continue;
        };
        if !used.insert(participant.id.as_str()) {
            resolved.rejected.push(rejection(role, participant_id, OverrideRejection::AlreadyPinned));
            continue;
        }
        resolved.pins.insert(role, participant);
    }
    resolved
}
