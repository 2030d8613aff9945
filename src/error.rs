use thiserror::Error;

use crate::assign::ParticipantId;
use crate::roles::Role;

/// Why a priority override was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideRejection {
    UnknownRole,
    NotInPool,
    AlreadyPinned,
}

impl std::fmt::Display for OverrideRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            OverrideRejection::UnknownRole => "role is not part of the lineup",
            OverrideRejection::NotInPool => "participant is not in the eligible pool",
            OverrideRejection::AlreadyPinned => "participant is already pinned to another role",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    #[error("Not enough participants for two teams: need {required}, have {available}")]
    InsufficientParticipants { required: usize, available: usize },

    #[error("No balanced team split exists for these preferences after {attempts} attempts; recruit more players or widen role preferences")]
    NoFeasibleAssignment { attempts: usize },

    #[error("Team search ran out of time after {attempts} attempts")]
    SearchTimedOut { attempts: usize },

    #[error("Role {0} is already filled")]
    SlotAlreadyFilled(Role),

    #[error("Priority pick {role} -> {participant_id} ignored: {reason}")]
    InvalidOverride {
        role: String,
        participant_id: ParticipantId,
        reason: OverrideRejection,
    },

    #[error("Participant {0} already holds a role in this roster")]
    AlreadySeated(ParticipantId),

    #[error("Participant {0} has already joined this team split")]
    AlreadyJoined(ParticipantId),

    #[error("Assignment not found: {0}")]
    UnknownAssignment(String),

    #[error("Event not found: {0}")]
    UnknownEvent(String),

    #[error("Participant {0} has no role preferences; set a profile first")]
    ProfileNotSet(ParticipantId),
}

pub type Result<T> = std::result::Result<T, AssignError>;
