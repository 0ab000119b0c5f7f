//! Signature indexing over the two knowledge bases.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::models::{is_method_record, FlatRecord, ModelRecord};
use crate::signature::to_signature;

/// Lookup structures derived from one base in a single read-only pass:
/// a signature → position map and the sorted set of unique signatures.
///
/// Duplicate signatures collapse: the map keeps the last occurrence, the set
/// is idempotent on insert.  Iterating `signatures` is deterministic (sorted),
/// which fixes the append order of synthesized records across runs.
#[derive(Clone, Debug, Default)]
pub struct BaseIndex {
    pub by_signature: IndexMap<String, usize>,
    pub signatures: BTreeSet<String>,
}

/// Index the flat base by its stored `APISignature` strings.
pub fn index_flat(records: &[FlatRecord]) -> BaseIndex {
    let mut index = BaseIndex::default();
    for (position, record) in records.iter().enumerate() {
        index.signatures.insert(record.signature.clone());
        index.by_signature.insert(record.signature.clone(), position);
    }
    debug!(
        records = records.len(),
        unique = index.signatures.len(),
        "indexed flat base"
    );
    index
}

/// Index the structured base by signatures derived from its method
/// descriptors.  Non-method entries are excluded per the policy in
/// [`crate::models::is_method_record`].
pub fn index_model(records: &[ModelRecord]) -> BaseIndex {
    let mut index = BaseIndex::default();
    let mut skipped = 0usize;
    for (position, record) in records.iter().enumerate() {
        if !is_method_record(record) {
            skipped += 1;
            continue;
        }
        // Guarded by the policy check above.
        let Some(descriptor) = record.api.as_method() else {
            continue;
        };
        let signature = to_signature(descriptor);
        index.signatures.insert(signature.clone());
        index.by_signature.insert(signature, position);
    }
    debug!(
        records = records.len(),
        unique = index.signatures.len(),
        skipped_non_method = skipped,
        "indexed structured base"
    );
    index
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
