//! Fixtures shared by the assignment tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::types::{Participant, Status};
use crate::roles::Role;

pub fn signup_time(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn participant(id: &str, minutes: i64, status: Status, roles: &[Role]) -> Participant {
    Participant {
        id: id.to_string(),
        name: format!("player-{id}"),
        preferences: roles.to_vec(),
        signed_up_at: signup_time(minutes),
        status,
        time_window: None,
    }
}

/// Seeded RNG that counts how often it is drawn from.
pub struct CountingRng {
    inner: StdRng,
    pub calls: usize,
}

impl CountingRng {
    pub fn new(seed: u64) -> Self {
        CountingRng {
            inner: StdRng::seed_from_u64(seed),
            calls: 0,
        }
    }
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.calls += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.calls += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.calls += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.calls += 1;
        self.inner.try_fill_bytes(dest)
    }
}
