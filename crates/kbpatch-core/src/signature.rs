//! Canonical signature codec.
//!
//! The canonical signature is the join key between the two schemas:
//! `<Pkg.Iface: RetPkg.RetIface method(ParamPkg.ParamIface,...)>`, where a
//! component with an empty package renders as the bare interface name.  It is
//! a pure function of (package, interface, method, return type, parameter
//! list); no condition fields participate.  `from_signature(to_signature(d))`
//! must reproduce exactly the fields the signature encodes — a codec mismatch
//! would silently merge unrelated methods during reconciliation.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{KbError, KbResult};
use crate::models::{MethodDescriptor, MethodTag, TypeRef};

/// Fixed four-group grammar: class path, return type, method name, parameter
/// list.  Anything that does not match the exact delimiters is malformed.
static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(.*?): (.*?) (.*?)\((.*?)\)>$").unwrap());

fn render_type(type_ref: &TypeRef) -> String {
    if type_ref.pkg.is_empty() {
        type_ref.iface.clone()
    } else {
        format!("{}.{}", type_ref.pkg, type_ref.iface)
    }
}

/// Split a dotted type path on its last dot into (package, interface).
/// A path without a dot has an empty package.
fn split_type(path: &str) -> TypeRef {
    match path.rsplit_once('.') {
        Some((pkg, iface)) => TypeRef::new(pkg, iface),
        None => TypeRef::new("", path),
    }
}

/// Render a method descriptor as its canonical signature string.
///
/// Parameters render in original order; an empty parameter list renders
/// as `()`.
pub fn to_signature(descriptor: &MethodDescriptor) -> String {
    let class_path = if descriptor.pkg.is_empty() {
        descriptor.iface.clone()
    } else {
        format!("{}.{}", descriptor.pkg, descriptor.iface)
    };
    let ret = render_type(&descriptor.ret);
    let params: Vec<String> = descriptor.param_list.iter().map(render_type).collect();
    format!(
        "<{}: {} {}({})>",
        class_path,
        ret,
        descriptor.method,
        params.join(",")
    )
}

/// Parse a canonical signature back into a method descriptor.
///
/// An empty parameter substring yields an empty parameter list, not a single
/// empty-named parameter.  Fails with [`KbError::MalformedSignature`] when the
/// input does not match the grammar.
pub fn from_signature(signature: &str) -> KbResult<MethodDescriptor> {
    let caps = SIGNATURE_RE
        .captures(signature)
        .ok_or_else(|| KbError::MalformedSignature(signature.to_string()))?;

    let class = split_type(&caps[1]);
    let ret = split_type(&caps[2]);
    let method = caps[3].to_string();
    let params_raw = &caps[4];
    let param_list: Vec<TypeRef> = if params_raw.is_empty() {
        Vec::new()
    } else {
        params_raw.split(',').map(split_type).collect()
    };

    Ok(MethodDescriptor {
        kind: MethodTag::Method,
        pkg: class.pkg,
        iface: class.iface,
        method,
        ret,
        param_list,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
