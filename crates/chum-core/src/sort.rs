//! Order rated lines by surname, then chronologically.

use std::cmp::Ordering;

use crate::classify::DisplayLine;
use crate::merge::CompositeRecord;

/// Days per season never reach this, so `season * 200 + day` is unique.
const DAYS_PER_SEASON_BOUND: i64 = 200;

/// Sort key for a display name: first token moved to the end.
///
/// `"Jim Barnes"` becomes `"Barnes Jim"`; single-token names are unchanged.
#[must_use]
pub fn surname_key(name: &str) -> String {
    let mut tokens = name.split_whitespace();
    let Some(first) = tokens.next() else {
        return name.to_string();
    };
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return name.to_string();
    }
    format!("{} {first}", rest.join(" "))
}

/// Chronological tie-break key.
#[must_use]
pub const fn chrono_key(record: &CompositeRecord) -> i64 {
    record.season * DAYS_PER_SEASON_BOUND + record.day
}

/// Compare two records the way the credits are listed.
#[must_use]
pub fn compare_records(a: &CompositeRecord, b: &CompositeRecord) -> Ordering {
    let a_name = a.primary_name.as_deref().unwrap_or_default();
    let b_name = b.primary_name.as_deref().unwrap_or_default();
    if a_name == b_name {
        chrono_key(a).cmp(&chrono_key(b))
    } else {
        surname_key(a_name).cmp(&surname_key(b_name))
    }
}

/// Stable sort of classified lines by their source records.
#[must_use]
pub fn sort_lines(mut entries: Vec<(CompositeRecord, DisplayLine)>) -> Vec<DisplayLine> {
    entries.sort_by(|(a, _), (b, _)| compare_records(a, b));
    entries.into_iter().map(|(_, line)| line).collect()
}
