//! Two-team split with randomized restarts and backtracking.
//!
//! Each attempt pins the organizer's overrides onto the red team, shuffles the
//! remaining (team, role) slots, then fills them depth first: a slot only
//! takes candidates who list that role, candidates are tried in shuffled
//! order, and a dead end undoes the last placement. Nothing is published
//! until all ten slots are filled, so an abandoned or failed search leaves no
//! partial state behind.
//!
//! Every search state first checks that the open slots can still be matched
//! to distinct candidates who play them. A branch that cannot be completed is
//! cut before it is expanded, and a pool that fails the check up front is
//! reported infeasible without searching at all.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::overrides::resolve_overrides;
use super::types::{Lineup, Participant, PriorityOverrides, Seat, SolveStats, Team, TeamAssignment};
use crate::error::{AssignError, Result};
use crate::roles::{Role, ROLE_COUNT};

pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Seats across both teams, and so the smallest pool worth searching.
pub const TEAM_SLOTS: usize = 2 * ROLE_COUNT;

/// How many search states between wall-clock checks.
pub const INTERRUPT_FREQUENCY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub team: Team,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSolution {
    pub teams: TeamAssignment,
    pub stats: SolveStats,
}

#[derive(Debug, Clone, Copy)]
struct Placement<'a> {
    slot: Slot,
    participant: &'a Participant,
    pinned: bool,
}

enum Outcome {
    Solved,
    Exhausted,
    TimedOut,
}

/// Bounded randomized search for a balanced 5v5 split.
#[derive(Debug, Clone)]
pub struct DualTeamSolver {
    pub max_attempts: usize,
    /// Wall-clock cap on the whole solve, on top of the attempt cap.
    pub time_budget: Option<Duration>,
}

impl Default for DualTeamSolver {
    fn default() -> Self {
        DualTeamSolver {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            time_budget: None,
        }
    }
}

impl DualTeamSolver {
    pub fn new(max_attempts: usize) -> Self {
        DualTeamSolver {
            max_attempts,
            time_budget: None,
        }
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn solve<R>(&self, pool: &[Participant], overrides: &PriorityOverrides, rng: &mut R) -> Result<TeamSolution>
    where
        R: Rng + ?Sized,
    {
        if pool.len() < TEAM_SLOTS {
            return Err(AssignError::InsufficientParticipants {
                required: TEAM_SLOTS,
                available: pool.len(),
            });
        }

        let deadline = self.time_budget.map(|budget| Instant::now() + budget);
        let resolved = resolve_overrides(pool, overrides);
        let pins: Vec<Placement<'_>> = resolved
            .pins
            .iter()
            .map(|(&role, &participant)| Placement {
                slot: Slot { team: Team::Red, role },
                participant,
                pinned: true,
            })
            .collect();
        let pinned_slots: HashSet<Slot> = pins.iter().map(|p| p.slot).collect();

        let available: Vec<&Participant> = pool.iter().filter(|p| !resolved.is_pinned(&p.id)).collect();
        let open_slots: Vec<Slot> = Team::BOTH
            .into_iter()
            .flat_map(|team| Role::ALL.into_iter().map(move |role| Slot { team, role }))
            .filter(|slot| !pinned_slots.contains(slot))
            .collect();

        // No attempt can succeed, whatever order it tries
        if let Some(role) = short_role(&open_slots, &available) {
            info!(%role, "not enough players list this role, no team split possible");
            return Err(AssignError::NoFeasibleAssignment {
                attempts: self.max_attempts,
            });
        }
        if !has_complete_matching(&open_slots, &available) {
            info!("preferences cannot cover every open slot, no team split possible");
            return Err(AssignError::NoFeasibleAssignment {
                attempts: self.max_attempts,
            });
        }

        let mut stats = SolveStats::default();
        for attempt in 1..=self.max_attempts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(AssignError::SearchTimedOut { attempts: attempt - 1 });
            }
            stats.attempts = attempt;

            let mut placed = pins.clone();
            let mut open = open_slots.clone();
            open.shuffle(rng);

            let mut search = Search {
                rng: &mut *rng,
                deadline,
                stats: &mut stats,
            };
            match search.fill(&open, available.clone(), &mut placed) {
                Outcome::Solved => {
                    let teams = build_teams(pool, &placed);
                    info!(
                        attempts = stats.attempts,
                        states = stats.states,
                        backtracks = stats.backtracks,
                        substitutes = teams.substitutes.len(),
                        "team split found"
                    );
                    return Ok(TeamSolution { teams, stats });
                }
                Outcome::Exhausted => debug!(attempt, "attempt dead-ended, retrying"),
                Outcome::TimedOut => return Err(AssignError::SearchTimedOut { attempts: attempt }),
            }
        }

        info!(attempts = self.max_attempts, "no team split found");
        Err(AssignError::NoFeasibleAssignment {
            attempts: self.max_attempts,
        })
    }
}

/// Splits the pool into red and blue lineups with the default solver.
pub fn assign_dual_teams<R>(pool: &[Participant], overrides: &PriorityOverrides, rng: &mut R) -> Result<TeamAssignment>
where
    R: Rng + ?Sized,
{
    DualTeamSolver::default().solve(pool, overrides, rng).map(|s| s.teams)
}

struct Search<'r, R: ?Sized> {
    rng: &'r mut R,
    deadline: Option<Instant>,
    stats: &'r mut SolveStats,
}

impl<R: Rng + ?Sized> Search<'_, R> {
    fn out_of_time(&self) -> bool {
        match self.deadline {
            Some(deadline) => self.stats.states % INTERRUPT_FREQUENCY == 0 && Instant::now() >= deadline,
            None => false,
        }
    }

    fn fill<'a>(&mut self, open: &[Slot], available: Vec<&'a Participant>, placed: &mut Vec<Placement<'a>>) -> Outcome {
        let Some((&slot, rest)) = open.split_first() else {
            return Outcome::Solved;
        };
        self.stats.states += 1;
        if self.out_of_time() {
            return Outcome::TimedOut;
        }
        if short_role(open, &available).is_some() || !has_complete_matching(open, &available) {
            return Outcome::Exhausted;
        }

        let mut candidates: Vec<&'a Participant> = available.iter().copied().filter(|p| p.prefers(slot.role)).collect();
        candidates.shuffle(&mut *self.rng);

        for candidate in candidates {
            placed.push(Placement {
                slot,
                participant: candidate,
                pinned: false,
            });
            let remaining = available.iter().copied().filter(|p| p.id != candidate.id).collect();
            match self.fill(rest, remaining, placed) {
                Outcome::Exhausted => {
                    placed.pop();
                    self.stats.backtracks += 1;
                }
                done => return done,
            }
        }
        Outcome::Exhausted
    }
}

/// First role with more open slots than candidates who list it.
fn short_role(slots: &[Slot], candidates: &[&Participant]) -> Option<Role> {
    Role::ALL.into_iter().find(|&role| {
        let needed = slots.iter().filter(|slot| slot.role == role).count();
        needed > candidates.iter().filter(|p| p.prefers(role)).count()
    })
}

/// Whether each slot can get its own candidate who plays the slot's role.
///
/// Augmenting-path bipartite matching. There are at most ten slots, so this
/// runs at every search state.
fn has_complete_matching(slots: &[Slot], candidates: &[&Participant]) -> bool {
    let mut owner: Vec<Option<usize>> = vec![None; candidates.len()];
    (0..slots.len()).all(|slot| {
        let mut visited = vec![false; candidates.len()];
        augment(slot, slots, candidates, &mut owner, &mut visited)
    })
}

fn augment(
    slot: usize,
    slots: &[Slot],
    candidates: &[&Participant],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for (c, candidate) in candidates.iter().enumerate() {
        if visited[c] || !candidate.prefers(slots[slot].role) {
            continue;
        }
        visited[c] = true;
        let free = match owner[c] {
            None => true,
            Some(other) => augment(other, slots, candidates, owner, visited),
        };
        if free {
            owner[c] = Some(slot);
            return true;
        }
    }
    false
}

fn build_teams(pool: &[Participant], placed: &[Placement<'_>]) -> TeamAssignment {
    let mut red = Lineup::default();
    let mut blue = Lineup::default();
    for placement in placed {
        let seat = if placement.pinned {
            Seat::pinned(placement.participant)
        } else {
            Seat::for_participant(placement.participant)
        };
        let lineup = match placement.slot.team {
            Team::Red => &mut red,
            Team::Blue => &mut blue,
        };
        lineup.0.insert(placement.slot.role, seat);
    }

    let placed_ids: HashSet<&str> = placed.iter().map(|p| p.participant.id.as_str()).collect();
    let substitutes = pool
        .iter()
        .filter(|p| !placed_ids.contains(p.id.as_str()))
        .map(Seat::for_participant)
        .collect();

    TeamAssignment { red, blue, substitutes }
}
