//! Set algebra over canonical signature keys.

use std::collections::BTreeSet;

/// Signatures present in `source` but absent from `target`, by exact string
/// equality.  The result is sorted, so synthesized-record append order is
/// reproducible across runs.
pub fn missing_signatures(source: &BTreeSet<String>, target: &BTreeSet<String>) -> Vec<String> {
    source.difference(target).cloned().collect()
}
