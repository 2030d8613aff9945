use tracing::{info, warn};

use super::types::{Assignment, Seat, TeamAssignment};
use crate::error::{AssignError, Result};
use crate::roles::Role;

/// A published roster that late arrivals can claim open roles in.
///
/// Team splits have no vacancies: both lineups are always full, and late
/// arrivals go to the substitutes instead.
///
/// `claim` is check-then-act: callers sharing a table between tasks must hold
/// an exclusive lock on it for the duration of the call (see
/// [`RecordStore::update`](crate::store::RecordStore::update)).
pub trait Vacancies {
    fn occupant(&self, role: Role) -> Option<&Seat>;

    fn holds_seat(&self, participant_id: &str) -> bool;

    fn place(&mut self, role: Role, seat: Seat);

    fn claim(&mut self, role: Role, claimant: Seat) -> Result<()> {
        if let Some(current) = self.occupant(role) {
            warn!(%role, holder = %current.participant_id, claimant = %claimant.participant_id, "vacancy claim lost");
            return Err(AssignError::SlotAlreadyFilled(role));
        }
        if self.holds_seat(&claimant.participant_id) {
            return Err(AssignError::AlreadySeated(claimant.participant_id));
        }
        info!(%role, claimant = %claimant.participant_id, "vacancy filled");
        self.place(role, claimant);
        Ok(())
    }
}

impl Vacancies for Assignment {
    fn occupant(&self, role: Role) -> Option<&Seat> {
        self.seat(role)
    }

    fn holds_seat(&self, participant_id: &str) -> bool {
        self.slots
            .values()
            .flatten()
            .any(|s| s.participant_id == participant_id)
    }

    fn place(&mut self, role: Role, seat: Seat) {
        self.unplaced.retain(|id| *id != seat.participant_id);
        self.slots.insert(role, Some(seat));
    }
}

/// Returns a copy of `table` with `claimant` in `role`, or `SlotAlreadyFilled`
/// if someone already holds it. `table` itself is never modified.
pub fn fill_vacancy<T>(table: &T, role: Role, claimant: Seat) -> Result<T>
where
    T: Vacancies + Clone,
{
    let mut updated = table.clone();
    updated.claim(role, claimant)?;
    Ok(updated)
}

impl TeamAssignment {
    /// Adds a late arrival to the substitute bench.
    pub fn join_substitutes(&mut self, seat: Seat) -> Result<()> {
        let id = &seat.participant_id;
        if self.team_of(id).is_some() || self.is_substitute(id) {
            return Err(AssignError::AlreadyJoined(seat.participant_id));
        }
        info!(participant = %seat.participant_id, "joined substitutes");
        self.substitutes.push(seat);
        Ok(())
    }
}
