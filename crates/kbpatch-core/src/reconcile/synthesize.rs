//! Cross-schema record synthesis.
//!
//! Two asymmetric directions: structured context → flat conditions (with
//! default elision against the platform thresholds) and flat conditions →
//! structured context (with strict integer parsing; silently defaulting a
//! bad `SDK` string would corrupt the reconciliation).

use crate::errors::{KbError, KbResult};
use crate::models::{
    ApiEntry, Conditions, Context, FlatRecord, ModelRecord, MAX_API_LEVEL_DEFAULT,
    MIN_API_LEVEL_DEFAULT,
};
use crate::signature::from_signature;

/// Build a flat record from a structured record's signature and context.
///
/// The signature is reused verbatim rather than re-derived, so the join key
/// is preserved even for codec edge cases.  `SDK`/`postSDK` are written only
/// when the level is present and differs from its default; the device list
/// joins in original order with no stray delimiters.
pub fn flatten_record(signature: &str, context: &Context) -> FlatRecord {
    let mut conditions = Conditions::default();

    if let Some(min) = context.min_api_level {
        if min != MIN_API_LEVEL_DEFAULT {
            conditions.sdk = Some(min.to_string());
        }
    }
    if let Some(max) = context.max_api_level {
        if max != MAX_API_LEVEL_DEFAULT {
            conditions.post_sdk = Some(max.to_string());
        }
    }
    if let Some(devices) = &context.bad_devices {
        if !devices.is_empty() {
            conditions.device = Some(devices.join(","));
        }
    }
    if let Some(message) = &context.message {
        if !message.is_empty() {
            conditions.additional_info = Some(message.clone());
        }
    }

    FlatRecord::new(signature, conditions)
}

/// Build a structured record from a flat record.
///
/// The descriptor comes from parsing the signature; condition fields map
/// back into the context, with `SDK`/`postSDK` parsed as integers.
pub fn lift_record(record: &FlatRecord) -> KbResult<ModelRecord> {
    let descriptor = from_signature(&record.signature)?;
    let mut context = Context::default();

    if let Some(message) = &record.conditions.additional_info {
        if !message.is_empty() {
            context.message = Some(message.clone());
        }
    }
    if let Some(sdk) = &record.conditions.sdk {
        context.min_api_level = Some(parse_api_level("SDK", sdk)?);
    }
    if let Some(post_sdk) = &record.conditions.post_sdk {
        context.max_api_level = Some(parse_api_level("postSDK", post_sdk)?);
    }
    if let Some(device) = &record.conditions.device {
        context.bad_devices = Some(device.split(',').map(str::to_string).collect());
    }

    Ok(ModelRecord::new(ApiEntry::Method(descriptor), context))
}

fn parse_api_level(field: &'static str, value: &str) -> KbResult<i64> {
    value.parse::<i64>().map_err(|_| KbError::InvalidApiLevel {
        field,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
