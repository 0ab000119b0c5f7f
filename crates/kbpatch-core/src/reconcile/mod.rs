//! Reconciliation pipeline: index both bases, diff the signature sets,
//! synthesize the missing records, append.
//!
//! All indexing state is built fresh per run and owned by [`reconcile`];
//! there are no ambient lookup tables.  The run is all-or-nothing: both
//! patch lists are synthesized in full before either collection is touched,
//! so a fatal error never publishes a half-patched base.

pub mod diff;
pub mod index;
pub mod synthesize;

use tracing::info;

use crate::errors::{KbError, KbResult};
use crate::models::{FlatRecord, ModelRecord};

/// Counts of records appended to each base by one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub flat_appended: usize,
    pub model_appended: usize,
}

/// The two augmented collections plus run statistics.  Pre-existing records
/// are unchanged and keep their original positions; synthesized records
/// follow at the end.
#[derive(Clone, Debug)]
pub struct Reconciled {
    pub flat: Vec<FlatRecord>,
    pub model: Vec<ModelRecord>,
    pub stats: ReconcileStats,
}

/// Resolve a signature back to its backing record.  Both the set and the map
/// come from the same indexing pass, so a miss here is an internal indexing
/// bug, not bad input.
fn lookup<'a, T>(
    records: &'a [T],
    index: &index::BaseIndex,
    signature: &str,
) -> KbResult<&'a T> {
    index
        .by_signature
        .get(signature)
        .and_then(|&position| records.get(position))
        .ok_or_else(|| KbError::MissingCounterpart(signature.to_string()))
}

/// Reconcile the two bases so both describe the same method set.
///
/// Signatures known only to the structured base are synthesized into the
/// flat base and vice versa; presence is reconciled, field-level
/// disagreement between matching records is not.
pub fn reconcile(
    mut flat: Vec<FlatRecord>,
    mut model: Vec<ModelRecord>,
) -> KbResult<Reconciled> {
    let flat_index = index::index_flat(&flat);
    let model_index = index::index_model(&model);

    let missing_from_flat =
        diff::missing_signatures(&model_index.signatures, &flat_index.signatures);
    let missing_from_model =
        diff::missing_signatures(&flat_index.signatures, &model_index.signatures);

    let mut flat_patches = Vec::with_capacity(missing_from_flat.len());
    for signature in &missing_from_flat {
        let record = lookup(&model, &model_index, signature)?;
        flat_patches.push(synthesize::flatten_record(signature, &record.context));
    }

    let mut model_patches = Vec::with_capacity(missing_from_model.len());
    for signature in &missing_from_model {
        let record = lookup(&flat, &flat_index, signature)?;
        model_patches.push(synthesize::lift_record(record)?);
    }

    let stats = ReconcileStats {
        flat_appended: flat_patches.len(),
        model_appended: model_patches.len(),
    };
    flat.extend(flat_patches);
    model.extend(model_patches);

    info!(
        flat_appended = stats.flat_appended,
        model_appended = stats.model_appended,
        flat_total = flat.len(),
        model_total = model.len(),
        "reconciliation complete"
    );

    Ok(Reconciled { flat, model, stats })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiEntry, Conditions, Context, TypeRef};
    use crate::signature::{from_signature, to_signature};
    use std::collections::BTreeSet;

    fn flat(signature: &str) -> FlatRecord {
        FlatRecord::new(signature, Conditions::default())
    }

    fn model(signature: &str, context: Context) -> ModelRecord {
        ModelRecord::new(ApiEntry::Method(from_signature(signature).unwrap()), context)
    }

    fn signature_sets(reconciled: &Reconciled) -> (BTreeSet<String>, BTreeSet<String>) {
        let flat_sigs: BTreeSet<String> = reconciled
            .flat
            .iter()
            .map(|r| r.signature.clone())
            .collect();
        let model_sigs: BTreeSet<String> = reconciled
            .model
            .iter()
            .filter_map(|r| r.api.as_method())
            .map(to_signature)
            .collect();
        (flat_sigs, model_sigs)
    }

    #[test]
    fn test_flat_only_record_lifted_into_model() {
        // One flat record with no conditions, empty structured base.
        let result = reconcile(vec![flat("<a.B: void m()>")], vec![]).unwrap();

        assert_eq!(result.stats, ReconcileStats { flat_appended: 0, model_appended: 1 });
        assert_eq!(result.model.len(), 1);
        let descriptor = result.model[0].api.as_method().expect("method entry");
        assert_eq!(descriptor.pkg, "a");
        assert_eq!(descriptor.iface, "B");
        assert_eq!(descriptor.method, "m");
        assert_eq!(descriptor.ret, TypeRef::new("", "void"));
        assert!(descriptor.param_list.is_empty());
        assert!(result.model[0].context.is_empty());
    }

    #[test]
    fn test_model_only_record_flattened_with_post_sdk() {
        let record = model(
            "<a.B: void m()>",
            Context {
                max_api_level: Some(23),
                ..Context::default()
            },
        );
        let result = reconcile(vec![], vec![record]).unwrap();

        assert_eq!(result.stats, ReconcileStats { flat_appended: 1, model_appended: 0 });
        assert_eq!(result.flat.len(), 1);
        assert_eq!(result.flat[0].signature, "<a.B: void m()>");
        let conditions = &result.flat[0].conditions;
        assert_eq!(conditions.post_sdk.as_deref(), Some("23"));
        assert!(conditions.sdk.is_none());
        assert!(conditions.device.is_none());
        assert!(conditions.additional_info.is_none());
    }

    #[test]
    fn test_symmetric_coverage_after_reconciliation() {
        let flat_base = vec![flat("<a.A: void a()>"), flat("<b.B: void b()>")];
        let model_base = vec![
            model("<b.B: void b()>", Context::default()),
            model("<c.C: void c()>", Context::default()),
            // Non-method entry must not join the reconciled universe.
            ModelRecord::new(
                ApiEntry::Other(serde_json::json!({"@type": "field", "iface": "X"})),
                Context::default(),
            ),
        ];
        let result = reconcile(flat_base, model_base).unwrap();
        let (flat_sigs, model_sigs) = signature_sets(&result);
        assert_eq!(flat_sigs, model_sigs);
        assert_eq!(flat_sigs.len(), 3);
    }

    #[test]
    fn test_idempotence() {
        let flat_base = vec![flat("<a.A: void a()>")];
        let model_base = vec![model("<c.C: void c()>", Context::default())];
        let first = reconcile(flat_base, model_base).unwrap();
        let second = reconcile(first.flat.clone(), first.model.clone()).unwrap();
        assert_eq!(second.stats, ReconcileStats::default());
        assert_eq!(second.flat, first.flat);
        assert_eq!(second.model, first.model);
    }

    #[test]
    fn test_originals_unchanged_and_in_place() {
        let flat_base = vec![
            FlatRecord::new(
                "<a.A: void a()>",
                Conditions {
                    sdk: Some("19".to_string()),
                    ..Conditions::default()
                },
            ),
            flat("<b.B: void b()>"),
        ];
        let model_base = vec![model("<c.C: void c()>", Context::default())];
        let flat_before = flat_base.clone();
        let model_before = model_base.clone();

        let result = reconcile(flat_base, model_base).unwrap();
        assert_eq!(&result.flat[..flat_before.len()], &flat_before[..]);
        assert_eq!(&result.model[..model_before.len()], &model_before[..]);
    }

    #[test]
    fn test_append_order_is_deterministic_sorted() {
        let model_base = vec![
            model("<z.Z: void z()>", Context::default()),
            model("<a.A: void a()>", Context::default()),
            model("<m.M: void m()>", Context::default()),
        ];
        let result = reconcile(vec![], model_base).unwrap();
        let appended: Vec<&str> = result.flat.iter().map(|r| r.signature.as_str()).collect();
        assert_eq!(
            appended,
            vec!["<a.A: void a()>", "<m.M: void m()>", "<z.Z: void z()>"]
        );
    }

    #[test]
    fn test_malformed_flat_signature_aborts_run() {
        let err = reconcile(vec![flat("not a signature")], vec![]).unwrap_err();
        assert!(matches!(err, KbError::MalformedSignature(_)));
    }

    #[test]
    fn test_condition_translation_both_directions() {
        let flat_base = vec![FlatRecord::new(
            "<a.A: void a()>",
            Conditions {
                sdk: Some("16".to_string()),
                device: Some("Nexus5,Pixel2".to_string()),
                additional_info: Some("flaky".to_string()),
                ..Conditions::default()
            },
        )];
        let model_base = vec![model(
            "<b.B: void b()>",
            Context {
                min_api_level: Some(1),
                max_api_level: Some(25),
                bad_devices: Some(vec!["G3".to_string()]),
                message: Some("slow".to_string()),
            },
        )];

        let result = reconcile(flat_base, model_base).unwrap();

        let lifted = &result.model[1];
        assert_eq!(lifted.context.min_api_level, Some(16));
        assert_eq!(
            lifted.context.bad_devices,
            Some(vec!["Nexus5".to_string(), "Pixel2".to_string()])
        );
        assert_eq!(lifted.context.message.as_deref(), Some("flaky"));

        let flattened = &result.flat[1];
        assert_eq!(flattened.signature, "<b.B: void b()>");
        // min_api_level 1 is the default and must not appear.
        assert!(flattened.conditions.sdk.is_none());
        assert_eq!(flattened.conditions.post_sdk.as_deref(), Some("25"));
        assert_eq!(flattened.conditions.device.as_deref(), Some("G3"));
        assert_eq!(flattened.conditions.additional_info.as_deref(), Some("slow"));
    }

    #[test]
    fn test_duplicate_signature_uses_last_record() {
        let flat_base = vec![
            FlatRecord::new(
                "<a.A: void a()>",
                Conditions {
                    sdk: Some("10".to_string()),
                    ..Conditions::default()
                },
            ),
            FlatRecord::new(
                "<a.A: void a()>",
                Conditions {
                    sdk: Some("21".to_string()),
                    ..Conditions::default()
                },
            ),
        ];
        let result = reconcile(flat_base, vec![]).unwrap();
        assert_eq!(result.model.len(), 1);
        assert_eq!(result.model[0].context.min_api_level, Some(21));
    }
}
