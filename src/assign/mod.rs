pub mod types;
pub mod window;
pub mod pool;
pub mod overrides;
pub mod greedy;
pub mod backtrack;
pub mod vacancy;
#[cfg(test)]
pub(crate) mod testing;

pub use types::{
    Assignment, Lineup, Participant, ParticipantId, PriorityOverrides, Seat, SeatStatus, SolveStats, Status, Team,
    TeamAssignment,
};
pub use window::{parse_time_window, TimeWindow};
pub use pool::{eligible_pool, PoolKind};
pub use overrides::{parse_overrides, resolve_overrides, ResolvedOverrides};
pub use greedy::assign_single_roster;
pub use backtrack::{assign_dual_teams, DualTeamSolver, TeamSolution, DEFAULT_MAX_ATTEMPTS, TEAM_SLOTS};
pub use vacancy::{fill_vacancy, Vacancies};
