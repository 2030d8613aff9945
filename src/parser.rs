use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{Reader, ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::assign::{parse_overrides, parse_time_window, Participant, ParticipantId, PriorityOverrides, Status};
use crate::error::AssignError;
use crate::profile::{parse_preference_text, ProfileBook, ProfileStore};

/// Parses a signup timestamp: RFC 3339, or a naive ISO timestamp taken as UTC
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Reads a sign-up sheet.
///
/// Columns are found by header name (`id`, `name`, `status`, `timestamp`,
/// `roles`, `time`). Rows are applied in order: a later row for the same id is
/// a re-registration and replaces the earlier one, a `withdrawn` row removes
/// the participant. Rows without a preference list take the participant's
/// stored profile.
pub fn read_participants<R: Read, P: ProfileStore>(
    input: R,
    profiles: &P,
) -> Result<Vec<Participant>, Box<dyn std::error::Error>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let id_col = column(&headers, &["id", "participant_id", "user_id"]).ok_or("missing id column")?;
    let name_col = column(&headers, &["name", "display_name"]).unwrap_or(1);
    let status_col = column(&headers, &["status"]).unwrap_or(2);
    let timestamp_col = column(&headers, &["timestamp", "signed_up_at"]);
    let roles_col = column(&headers, &["roles", "preferences"]);
    let time_col = column(&headers, &["time", "window"]);

    let mut order: Vec<ParticipantId> = Vec::new();
    let mut by_id: HashMap<ParticipantId, Participant> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").trim();

        let id = field(Some(id_col)).to_string();
        if id.is_empty() {
            continue; // Skip rows without an id
        }
        let Some(status) = Status::parse(field(Some(status_col))) else {
            warn!(row = row + 2, id = %id, status = field(Some(status_col)), "unknown status, row skipped");
            continue;
        };
        if status == Status::Withdrawn {
            by_id.remove(&id);
            order.retain(|o| *o != id);
            continue;
        }

        let mut preferences = parse_preference_text(field(roles_col));
        if preferences.is_empty() {
            preferences = profiles.preferences(&id).unwrap_or_default();
        }
        let name = match field(Some(name_col)) {
            "" => id.clone(),
            name => name.to_string(),
        };
        // Missing timestamps keep sheet order via the row number
        let signed_up_at = parse_timestamp(field(timestamp_col))
            .or_else(|| DateTime::from_timestamp(row as i64, 0))
            .unwrap_or_default();
        let time_window = (status == Status::Temporary).then(|| parse_time_window(field(time_col)));

        let participant = Participant {
            id: id.clone(),
            name,
            preferences,
            signed_up_at,
            status,
            time_window,
        };
        if by_id.insert(id.clone(), participant).is_some() {
            debug!(id = %id, "re-registration replaces earlier row");
            order.retain(|o| *o != id);
        }
        order.push(id);
    }

    Ok(order.into_iter().filter_map(|id| by_id.remove(&id)).collect())
}

pub fn load_participants<Q: AsRef<Path>, P: ProfileStore>(
    csv_path: Q,
    profiles: &P,
) -> Result<Vec<Participant>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(csv_path)?;
    read_participants(file, profiles)
}

/// Loads stored profiles from an `id,roles` sheet
pub fn load_profiles<Q: AsRef<Path>>(csv_path: Q) -> Result<ProfileBook, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();
    let id_col = column(&headers, &["id", "participant_id", "user_id"]).unwrap_or(0);
    let roles_col = column(&headers, &["roles", "role_priority", "preferences"]).unwrap_or(1);

    let mut book = ProfileBook::new();
    for result in reader.records() {
        let record = result?;
        let id = record.get(id_col).unwrap_or("").trim();
        if id.is_empty() {
            continue;
        }
        book.set(id, parse_preference_text(record.get(roles_col).unwrap_or("")));
    }
    Ok(book)
}

/// Parses `role=id` priority picks, returning the diagnostics for bad ones
pub fn parse_priority_picks(picks: &[String]) -> (PriorityOverrides, Vec<AssignError>) {
    let pairs: Vec<(&str, &str)> = picks
        .iter()
        .filter_map(|pick| match pick.split_once('=') {
            Some((role, id)) => Some((role.trim(), id.trim())),
            None => {
                warn!(pick = %pick, "priority pick must look like role=id");
                None
            }
        })
        .collect();
    parse_overrides(pairs)
}
