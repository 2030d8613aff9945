//! Sign-up board for one event: who registered, with which status, and the
//! organizer's priority picks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assign::{eligible_pool, Participant, ParticipantId, PoolKind, PriorityOverrides};
use crate::error::{AssignError, Result};
use crate::profile::ProfileStore;
use crate::roles::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub participants: BTreeMap<ParticipantId, Participant>,
    #[serde(default)]
    pub priority_picks: PriorityOverrides,
}

impl Event {
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Event {
            id: id.into(),
            summary: summary.into(),
            start_time: String::new(),
            notes: String::new(),
            limit: None,
            participants: BTreeMap::new(),
            priority_picks: PriorityOverrides::new(),
        }
    }

    /// Registers or re-registers a participant, stamping the signup time.
    ///
    /// An empty preference list is taken from the profile store; a member
    /// with neither is turned away.
    pub fn register<P: ProfileStore>(
        &mut self,
        mut participant: Participant,
        profiles: &P,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if participant.preferences.is_empty() {
            participant.preferences = profiles.preferences(&participant.id).unwrap_or_default();
        }
        if participant.preferences.is_empty() {
            return Err(AssignError::ProfileNotSet(participant.id));
        }
        participant.signed_up_at = now;
        info!(event = %self.id, participant = %participant.id, status = ?participant.status, "registered");
        self.participants.insert(participant.id.clone(), participant);
        Ok(())
    }

    pub fn withdraw(&mut self, participant_id: &str) -> bool {
        self.participants.remove(participant_id).is_some()
    }

    /// Pins `participant_id` to `role`, replacing any earlier pick for that role.
    pub fn set_priority_pick(&mut self, role: Role, participant_id: impl Into<ParticipantId>) -> Option<ParticipantId> {
        self.priority_picks.insert(role, participant_id.into())
    }

    pub fn pool(&self, kind: PoolKind) -> Vec<Participant> {
        eligible_pool(self.participants.values(), kind)
    }

    pub fn headcount(&self) -> usize {
        self.participants
            .values()
            .filter(|p| PoolKind::Roster.accepts(p.status))
            .count()
    }

    pub fn headcount_label(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}/{}", self.headcount(), limit),
            None => self.headcount().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::testing::{participant, signup_time};
    use crate::assign::Status;
    use crate::profile::ProfileBook;

    #[test]
    fn reregistration_replaces_record_and_refreshes_time() {
        let mut event = Event::new("e1", "Custom match");
        let profiles = ProfileBook::new();
        event
            .register(participant("1", 0, Status::IfFree, &[Role::Gold]), &profiles, signup_time(1))
            .unwrap();
        event
            .register(participant("2", 0, Status::Attending, &[Role::Gold]), &profiles, signup_time(2))
            .unwrap();
        event
            .register(participant("1", 0, Status::Attending, &[Role::Mid]), &profiles, signup_time(3))
            .unwrap();

        let pool = event.pool(PoolKind::Teams);
        let ids: Vec<&str> = pool.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(pool[1].preferences, vec![Role::Mid]);
    }

    #[test]
    fn empty_preferences_fall_back_to_profile() {
        let mut event = Event::new("e1", "Custom match");
        let mut profiles = ProfileBook::new();
        profiles.set("1", vec![Role::Roam, Role::Jg]);

        event
            .register(participant("1", 0, Status::Attending, &[]), &profiles, signup_time(0))
            .unwrap();
        assert_eq!(event.participants["1"].preferences, vec![Role::Roam, Role::Jg]);

        let err = event
            .register(participant("2", 0, Status::Attending, &[]), &profiles, signup_time(0))
            .unwrap_err();
        assert_eq!(err, AssignError::ProfileNotSet("2".to_string()));
    }

    #[test]
    fn withdraw_and_headcount() {
        let mut event = Event::new("e1", "Custom match");
        event.limit = Some(10);
        let profiles = ProfileBook::new();
        for (id, status) in [("1", Status::Attending), ("2", Status::Temporary), ("3", Status::Withdrawn)] {
            event
                .register(participant(id, 0, status, &[Role::Exp]), &profiles, signup_time(0))
                .unwrap();
        }
        assert_eq!(event.headcount_label(), "2/10");
        assert!(event.withdraw("2"));
        assert!(!event.withdraw("2"));
        assert_eq!(event.headcount(), 1);
    }

    #[test]
    fn later_pick_replaces_earlier_for_same_role() {
        let mut event = Event::new("e1", "Custom match");
        assert_eq!(event.set_priority_pick(Role::Gold, "1"), None);
        assert_eq!(event.set_priority_pick(Role::Gold, "2"), Some("1".to_string()));
        assert_eq!(event.priority_picks[&Role::Gold], "2");
    }
}
