//! Coercion library: pure conversions between raw values and primitive
//! kinds, plus the type-compatibility test used by the resolution
//! pipeline.
//!
//! All functions here are total. Conversions that cannot produce a
//! definite result return `None` ("undefined") or hand the input back
//! unchanged so the caller's type check can reject it.

use crate::types::{MadeValue, TypeTag};

/// Converts a value to a boolean where a definite conversion exists.
///
/// Null converts to `false`. Numbers convert by zero-test, except NaN
/// which has no definite boolean. Strings are trimmed and lowercased;
/// `""`, `"false"`, `"no"` and `"0"` convert to `false`, everything else
/// to `true`. Arrays, objects and instances have no boolean form.
pub fn to_boolean(value: &MadeValue) -> Option<bool> {
    match value {
        MadeValue::Null => Some(false),
        MadeValue::Bool(b) => Some(*b),
        MadeValue::Number(n) => {
            if n.is_nan() {
                None
            } else {
                Some(*n != 0.0)
            }
        }
        MadeValue::String(s) => {
            let s = s.trim().to_lowercase();
            Some(!(s.is_empty() || s == "false" || s == "no" || s == "0"))
        }
        _ => None,
    }
}

/// Tests whether a resolved value satisfies a type designator.
///
/// The `Boolean` designator accepts anything [`to_boolean`] can convert;
/// the `Object` designator accepts anything object-like, arrays and
/// instances included. `Named` matches an instance by exact nominal
/// identifier.
pub fn is_type_matched(tag: &TypeTag, value: &MadeValue) -> bool {
    match tag {
        TypeTag::String => matches!(value, MadeValue::String(_)),
        TypeTag::Number => matches!(value, MadeValue::Number(n) if !n.is_nan()),
        TypeTag::Boolean => to_boolean(value).is_some(),
        TypeTag::Array(_) => matches!(value, MadeValue::Array(_)),
        TypeTag::Object => matches!(
            value,
            MadeValue::Array(_) | MadeValue::Object(_) | MadeValue::Instance(_)
        ),
        TypeTag::Named(name) => {
            matches!(value, MadeValue::Instance(instance) if instance.type_name() == name)
        }
    }
}

/// Coerces a raw value toward a preferred primitive kind.
///
/// With no designator, or a designator that is not a primitive kind, the
/// value passes through unchanged. A failed conversion also passes the
/// value through unchanged (not an error): the type-check step decides
/// whether that is acceptable. The one exception is the boolean
/// designator, where an indefinite conversion yields `None`.
pub fn primitive_parse(value: MadeValue, tag: Option<&TypeTag>) -> Option<MadeValue> {
    match tag {
        Some(TypeTag::Boolean) => to_boolean(&value).map(MadeValue::Bool),
        Some(TypeTag::Number) => Some(parse_number(value)),
        Some(TypeTag::String) => Some(parse_string(value)),
        _ => Some(value),
    }
}

fn parse_number(value: MadeValue) -> MadeValue {
    match &value {
        MadeValue::Bool(true) => MadeValue::Number(1.0),
        MadeValue::Bool(false) => MadeValue::Number(0.0),
        _ => match numeric_cast(&value) {
            // Conversion of the original value must be non-NaN; otherwise
            // the input is handed back unchanged, deliberately left
            // mismatched for the type-check step to reject.
            Some(n) => MadeValue::Number(n),
            None => value,
        },
    }
}

fn parse_string(value: MadeValue) -> MadeValue {
    match &value {
        MadeValue::String(_) => value,
        MadeValue::Number(n) => MadeValue::String(number_to_string(*n)),
        MadeValue::Bool(b) => MadeValue::String(b.to_string()),
        MadeValue::Null => MadeValue::String(String::new()),
        _ => value,
    }
}

/// Numeric conversion: null is zero, blank strings are zero, other
/// strings parse as floats (signs and scientific notation accepted).
/// NaN results count as "no conversion".
fn numeric_cast(value: &MadeValue) -> Option<f64> {
    let n = match value {
        MadeValue::Null => 0.0,
        MadeValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        MadeValue::Number(n) => *n,
        MadeValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };
    if n.is_nan() {
        None
    } else {
        Some(n)
    }
}

/// Textual form of a number: integral values render without a decimal
/// part, NaN and infinities by name.
fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", n)
    }
}

/// Returns the first candidate that is not `None`.
pub fn select<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}
