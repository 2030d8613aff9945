//! Preference profiles: each member's ordered list of acceptable roles.
//!
//! Profiles live outside the engine; the solvers only ever see the
//! `Vec<Role>` copied onto a [`Participant`](crate::assign::Participant)
//! at sign-up time.

use std::collections::HashMap;

use crate::assign::ParticipantId;
use crate::roles::{Role, ROLE_COUNT};

/// Normalizes raw role tokens into a preference list.
///
/// Unknown tokens are dropped, duplicates keep their first position and the
/// list is capped at one entry per role.
pub fn normalize_preferences<'a, I>(tokens: I) -> Vec<Role>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut roles = Vec::with_capacity(ROLE_COUNT);
    for token in tokens {
        let Ok(role) = token.parse::<Role>() else {
            continue;
        };
        if !roles.contains(&role) {
            roles.push(role);
        }
        if roles.len() == ROLE_COUNT {
            break;
        }
    }
    roles
}

/// Splits a free-form role cell (`gold/mid`, `gold, mid`, one per line...)
pub fn parse_preference_text(text: &str) -> Vec<Role> {
    normalize_preferences(
        text.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|t| !t.is_empty()),
    )
}

/// Source of stored preference lists, keyed by participant.
pub trait ProfileStore {
    fn preferences(&self, id: &str) -> Option<Vec<Role>>;

    fn has_profile(&self, id: &str) -> bool {
        self.preferences(id).map(|p| !p.is_empty()).unwrap_or(false)
    }
}

/// In-memory profile store.
#[derive(Debug, Clone, Default)]
pub struct ProfileBook {
    profiles: HashMap<ParticipantId, Vec<Role>>,
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<ParticipantId>, roles: Vec<Role>) {
        self.profiles.insert(id.into(), roles);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for ProfileBook {
    fn preferences(&self, id: &str) -> Option<Vec<Role>> {
        self.profiles.get(id).cloned()
    }
}
