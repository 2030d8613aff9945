//! Published assignments, keyed by assignment id.
//!
//! Each record sits behind its own lock. Check-then-act operations such as a
//! vacancy claim run entirely inside [`RecordStore::update`], so two requests
//! racing for the same role are serialized and exactly one of them wins.
//! Requests against different records never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::assign::{Assignment, TeamAssignment};
use crate::error::{AssignError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct RecordStore<T> {
    records: Mutex<HashMap<String, Arc<Mutex<T>>>>,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        RecordStore {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> RecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a finished record, replacing any previous one under `id`.
    pub fn insert(&self, id: impl Into<String>, record: T) {
        lock(&self.records).insert(id.into(), Arc::new(Mutex::new(record)));
    }

    pub fn get(&self, id: &str) -> Option<T> {
        let record = lock(&self.records).get(id).cloned()?;
        let snapshot = lock(&record).clone();
        Some(snapshot)
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.records).contains_key(id)
    }

    /// Runs `f` with exclusive access to one record.
    ///
    /// Changes made by `f` are kept even if it returns an error, so `f` must
    /// only mutate after its checks pass.
    pub fn update<R, F>(&self, id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let record = lock(&self.records)
            .get(id)
            .cloned()
            .ok_or_else(|| AssignError::UnknownAssignment(id.to_string()))?;
        let mut guard = lock(&record);
        f(&mut guard)
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        let record = lock(&self.records).remove(id)?;
        let value = lock(&record).clone();
        Some(value)
    }

    /// Removes every record, returning them for cleanup.
    pub fn drain(&self) -> Vec<(String, T)> {
        let drained: Vec<_> = lock(&self.records).drain().collect();
        drained
            .into_iter()
            .map(|(id, record)| {
                let value = lock(&record).clone();
                (id, value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type AssignmentStore = RecordStore<Assignment>;
pub type ShuffleStore = RecordStore<TeamAssignment>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::{Seat, Vacancies};
    use crate::roles::Role;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn racing_claims_have_exactly_one_winner() {
        for _ in 0..20 {
            let store = AssignmentStore::new();
            store.insert("a1", Assignment::empty());
            let barrier = Barrier::new(2);

            let results: Vec<Result<()>> = thread::scope(|s| {
                let handles: Vec<_> = ["1", "2"]
                    .into_iter()
                    .map(|id| {
                        let store = &store;
                        let barrier = &barrier;
                        s.spawn(move || {
                            barrier.wait();
                            store.update("a1", |a| a.claim(Role::Mid, Seat::late_join(id, id)))
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let wins = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(wins, 1);
            assert!(results.contains(&Err(AssignError::SlotAlreadyFilled(Role::Mid))));
            assert!(store.get("a1").unwrap().seat(Role::Mid).is_some());
        }
    }

    #[test]
    fn unknown_id_is_reported() {
        let store = AssignmentStore::new();
        let err = store.update("missing", |_| Ok(())).unwrap_err();
        assert_eq!(err, AssignError::UnknownAssignment("missing".to_string()));
    }

    #[test]
    fn drain_empties_store() {
        let store = AssignmentStore::new();
        store.insert("a", Assignment::empty());
        store.insert("b", Assignment::empty());
        let mut ids: Vec<String> = store.drain().into_iter().map(|(id, _)| id).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.is_empty());
    }
}
