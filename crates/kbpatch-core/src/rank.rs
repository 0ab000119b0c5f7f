//! Ranked white-list generation for third-party libraries.
//!
//! Standalone batch utility with no shared data model with the
//! reconciliation engine.  Parses a CSV snapshot of library popularity
//! counters (`pkg,project,watch,star,fork`, `#` comments and a header row
//! allowed) and returns package identifiers ordered by a weighted score.
//! Counters for non-GitHub projects are assigned by hand upstream; this
//! module only scores and sorts.

use crate::errors::{KbError, KbResult};

pub const WATCH_WEIGHT: f64 = 0.15;
pub const STAR_WEIGHT: f64 = 0.5;
pub const FORK_WEIGHT: f64 = 0.35;

/// Weighted popularity score of one library.
pub fn popularity_score(watch: i64, star: i64, fork: i64) -> f64 {
    WATCH_WEIGHT * watch as f64 + STAR_WEIGHT * star as f64 + FORK_WEIGHT * fork as f64
}

/// Rank library package identifiers by descending popularity score.
///
/// Ties keep input order (the sort is stable).  A row with fewer than five
/// fields or a non-numeric counter is fatal rather than skipped.
pub fn rank_libraries(csv_text: &str) -> KbResult<Vec<String>> {
    let mut scored: Vec<(String, f64)> = Vec::new();

    for (line_idx, line) in csv_text.lines().enumerate() {
        let line_number = line_idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').collect();
        if fields[0] == "pkg" {
            // Header row.
            continue;
        }
        if fields.len() < 5 {
            return Err(KbError::MalformedCsvRow {
                line: line_number,
                reason: format!("expected 5 fields, got {}", fields.len()),
            });
        }

        let watch = parse_counter(fields[2], line_number)?;
        let star = parse_counter(fields[3], line_number)?;
        let fork = parse_counter(fields[4], line_number)?;
        scored.push((fields[0].to_string(), popularity_score(watch, star, fork)));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(scored.into_iter().map(|(pkg, _)| pkg).collect())
}

fn parse_counter(value: &str, line: usize) -> KbResult<i64> {
    value.trim().parse::<i64>().map_err(|_| KbError::MalformedCsvRow {
        line,
        reason: format!("non-numeric counter {value:?}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
