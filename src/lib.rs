//! Role and team assignment for community events.
//!
//! Participants sign up with an ordered list of preferred roles. The engine
//! either fills one open roster greedily in signup order
//! ([`assign::assign_single_roster`]) or splits the attending pool into two
//! balanced five-role teams with substitutes ([`assign::assign_dual_teams`]).
//! Published results accept late claims on open roles through
//! [`assign::fill_vacancy`] and the per-record locking of [`store`].

pub mod assign;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod parser;
pub mod profile;
pub mod roles;
pub mod store;
pub mod web;

pub use error::{AssignError, Result};
