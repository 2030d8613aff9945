use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;

use crate::assign::{Assignment, Seat, SolveStats, Team, TeamAssignment};
use crate::roles::DISPLAY_ORDER;

/// Formats a seat with its status icon
pub fn format_seat(seat: &Seat) -> String {
    let pin = if seat.pinned { " 📌" } else { "" };
    format!("{} {}{}", seat.status.icon(), seat.name, pin)
}

/// Renders a single roster, one role per line, in display order
pub fn format_assignment(summary: &str, assignment: &Assignment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "** {} **", summary);
    for role in DISPLAY_ORDER {
        match assignment.seat(role) {
            Some(seat) => {
                let _ = writeln!(out, "{} {:<5} {}", role.emoji(), role.token().to_uppercase(), format_seat(seat));
            }
            None => {
                let _ = writeln!(out, "{} {:<5} [MISSING]", role.emoji(), role.token().to_uppercase());
            }
        }
    }
    if !assignment.unplaced.is_empty() {
        let _ = writeln!(out, "Unplaced: {}", assignment.unplaced.join(", "));
    }
    out
}

pub fn format_teams(teams: &TeamAssignment) -> String {
    let mut out = String::new();
    for team in Team::BOTH {
        let _ = writeln!(out, "{} team", team.label());
        let lineup = teams.lineup(team);
        for role in DISPLAY_ORDER {
            let holder = lineup.get(role).map(format_seat).unwrap_or_else(|| "[EMPTY]".to_string());
            let _ = writeln!(out, "  {} {:<5} {}", role.emoji(), role.token().to_uppercase(), holder);
        }
    }
    let names: Vec<&str> = teams.substitutes.iter().map(|s| s.name.as_str()).collect();
    let subs = if names.is_empty() { "none".to_string() } else { names.join(", ") };
    let _ = writeln!(out, "🟡 Substitutes: {}", subs);
    out
}

pub fn format_stats(stats: &SolveStats) -> String {
    format!(
        "attempts: {}, states: {}, backtracks: {}",
        stats.attempts, stats.states, stats.backtracks
    )
}

/// Writes a rendered report to a file
pub fn write_report_to_file(report: &str, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    file.write_all(report.as_bytes())?;
    Ok(())
}
