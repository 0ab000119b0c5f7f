//! Typed records for the two knowledge-base schemas.
//!
//! The flat schema keys each method by its canonical signature string and
//! carries conditions as a string-valued map.  The structured schema nests a
//! method descriptor under `api` (with an `@type` discriminator) and platform
//! conditions under `context`.  Field names follow the on-disk JSON exactly
//! via serde renames.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Platform threshold constants
// ---------------------------------------------------------------------------

/// Lowest SDK level the platform ever shipped.  A `min_api_level` equal to
/// this is semantically "no lower bound" and is elided from flat conditions.
pub const MIN_API_LEVEL_DEFAULT: i64 = 1;

/// Highest SDK level known when the bases were authored.  A `max_api_level`
/// equal to this is semantically "no upper bound" and is elided from flat
/// conditions.
pub const MAX_API_LEVEL_DEFAULT: i64 = 27;

// ---------------------------------------------------------------------------
// Structured schema
// ---------------------------------------------------------------------------

/// A `{package, interface}` pair naming a type.  `pkg` may be empty for
/// primitive and default-package types (`void`, `int`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default)]
    pub pkg: String,
    pub iface: String,
}

impl TypeRef {
    pub fn new(pkg: impl Into<String>, iface: impl Into<String>) -> Self {
        Self {
            pkg: pkg.into(),
            iface: iface.into(),
        }
    }
}

/// Discriminator for method entries.  Deserializing any other `@type` value
/// fails, which is what routes non-method entries into [`ApiEntry::Other`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodTag {
    #[default]
    #[serde(rename = "method")]
    Method,
}

/// Structured descriptor of one API method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    #[serde(rename = "@type")]
    pub kind: MethodTag,
    #[serde(default)]
    pub pkg: String,
    pub iface: String,
    pub method: String,
    pub ret: TypeRef,
    #[serde(rename = "paramList", default)]
    pub param_list: Vec<TypeRef>,
}

/// The `api` object of a structured record.
///
/// Entries whose `@type` is not `"method"` are preserved verbatim as raw JSON
/// so that round-tripping a base never alters them, but they do not
/// participate in indexing or reconciliation (see [`is_method_record`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiEntry {
    Method(MethodDescriptor),
    Other(serde_json::Value),
}

impl ApiEntry {
    /// The method descriptor, if this entry is a method.
    pub fn as_method(&self) -> Option<&MethodDescriptor> {
        match self {
            ApiEntry::Method(descriptor) => Some(descriptor),
            ApiEntry::Other(_) => None,
        }
    }
}

/// Platform-compatibility conditions of a structured record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_api_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_api_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_devices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        *self == Context::default()
    }
}

/// One row of the structured-schema collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub api: ApiEntry,
    #[serde(default)]
    pub context: Context,
    /// Record-level keys outside the declared schema (e.g. the `important`
    /// marker some bases carry); preserved verbatim so rewriting a base never
    /// strips them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelRecord {
    pub fn new(api: ApiEntry, context: Context) -> Self {
        Self {
            api,
            context,
            extra: serde_json::Map::new(),
        }
    }
}

/// Indexing policy: only entries tagged `@type: "method"` participate in
/// reconciliation.  Field, class and other entry kinds are carried through
/// untouched but never diffed or synthesized.
pub fn is_method_record(record: &ModelRecord) -> bool {
    record.api.as_method().is_some()
}

// ---------------------------------------------------------------------------
// Flat schema
// ---------------------------------------------------------------------------

/// String-valued condition map of a flat record.  Absent keys are absent on
/// disk as well, not serialized as null.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(rename = "SDK", default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(rename = "postSDK", default, skip_serializing_if = "Option::is_none")]
    pub post_sdk: Option<String>,
    #[serde(rename = "Device", default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(
        rename = "additionalInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_info: Option<String>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        *self == Conditions::default()
    }
}

/// One row of the flat-schema collection.  An empty condition map still
/// serializes as `"conditions": {}`, matching the existing bases.
///
/// Records carry at least `APISignature` and `conditions`; anything else
/// (real bases have e.g. a top-level `additionalInfo`) rides along in
/// `extra` untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(rename = "APISignature")]
    pub signature: String,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FlatRecord {
    pub fn new(signature: impl Into<String>, conditions: Conditions) -> Self {
        Self {
            signature: signature.into(),
            conditions,
            extra: serde_json::Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
