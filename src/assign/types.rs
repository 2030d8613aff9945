use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::window::TimeWindow;
use crate::roles::Role;

pub type ParticipantId = String;

/// Organizer pins, at most one participant per role.
pub type PriorityOverrides = BTreeMap<Role, ParticipantId>;

/// Sign-up status for an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Attending,
    /// Attending for part of the session, see `Participant::time_window`.
    Temporary,
    IfFree,
    Withdrawn,
}

impl Status {
    pub fn parse(value: &str) -> Option<Status> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "attending" | "attend" | "yes" | "参加" => Some(Status::Attending),
            "temporary" | "temp" | "一時的に参加" => Some(Status::Temporary),
            "if_free" | "maybe" | "空いていれば参加" => Some(Status::IfFree),
            "withdrawn" | "no" | "辞退" => Some(Status::Withdrawn),
            _ => None,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Status::Attending => "✅",
            Status::Temporary => "🕒",
            Status::IfFree => "❔",
            Status::Withdrawn => "❌",
        }
    }
}

/// One member's registration for an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub preferences: Vec<Role>,
    pub signed_up_at: DateTime<Utc>,
    pub status: Status,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
}

impl Participant {
    pub fn prefers(&self, role: Role) -> bool {
        self.preferences.contains(&role)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Attending,
    Temporary,
    IfFree,
    /// Claimed an open role after the roster was published.
    LateJoin,
}

impl SeatStatus {
    pub fn icon(self) -> &'static str {
        match self {
            SeatStatus::Attending => "✅",
            SeatStatus::Temporary => "🕒",
            SeatStatus::IfFree => "❔",
            SeatStatus::LateJoin => "🙋",
        }
    }
}

impl From<Status> for SeatStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Attending | Status::Withdrawn => SeatStatus::Attending,
            Status::Temporary => SeatStatus::Temporary,
            Status::IfFree => SeatStatus::IfFree,
        }
    }
}

/// Who holds a role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub participant_id: ParticipantId,
    pub name: String,
    pub status: SeatStatus,
    /// Placed by a priority override rather than by preference.
    #[serde(default)]
    pub pinned: bool,
}

impl Seat {
    pub fn for_participant(participant: &Participant) -> Self {
        Seat {
            participant_id: participant.id.clone(),
            name: participant.name.clone(),
            status: participant.status.into(),
            pinned: false,
        }
    }

    pub fn pinned(participant: &Participant) -> Self {
        Seat {
            pinned: true,
            ..Seat::for_participant(participant)
        }
    }

    pub fn late_join(participant_id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Seat {
            participant_id: participant_id.into(),
            name: name.into(),
            status: SeatStatus::LateJoin,
            pinned: false,
        }
    }
}

/// Single-roster result: every role, filled or missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub slots: BTreeMap<Role, Option<Seat>>,
    /// Pool participants whose preferences were all taken.
    pub unplaced: Vec<ParticipantId>,
}

impl Assignment {
    pub fn empty() -> Self {
        Assignment {
            slots: Role::ALL.iter().map(|&role| (role, None)).collect(),
            unplaced: Vec::new(),
        }
    }

    pub fn seat(&self, role: Role) -> Option<&Seat> {
        self.slots.get(&role).and_then(Option::as_ref)
    }

    pub fn missing_roles(&self) -> Vec<Role> {
        self.slots
            .iter()
            .filter(|(_, seat)| seat.is_none())
            .map(|(&role, _)| role)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.values().all(Option::is_some)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// First team; priority overrides always land here.
    Red,
    Blue,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::Red, Team::Blue];

    pub fn label(self) -> &'static str {
        match self {
            Team::Red => "🔴 Red",
            Team::Blue => "🔵 Blue",
        }
    }
}

/// One team's role map
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Lineup(pub BTreeMap<Role, Seat>);

impl Lineup {
    pub fn get(&self, role: Role) -> Option<&Seat> {
        self.0.get(&role)
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.0.values().any(|s| s.participant_id == participant_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dual-team result: two full lineups plus everyone left over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamAssignment {
    pub red: Lineup,
    pub blue: Lineup,
    pub substitutes: Vec<Seat>,
}

impl TeamAssignment {
    pub fn lineup(&self, team: Team) -> &Lineup {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn team_of(&self, participant_id: &str) -> Option<Team> {
        Team::BOTH
            .into_iter()
            .find(|&team| self.lineup(team).contains(participant_id))
    }

    pub fn is_substitute(&self, participant_id: &str) -> bool {
        self.substitutes.iter().any(|s| s.participant_id == participant_id)
    }

    /// Every placed participant id, red first.
    pub fn placed_ids(&self) -> Vec<&str> {
        self.red
            .0
            .values()
            .chain(self.blue.0.values())
            .map(|s| s.participant_id.as_str())
            .collect()
    }
}

/// Effort spent by one dual-team solve
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolveStats {
    pub attempts: usize,
    pub states: usize,
    pub backtracks: usize,
}
