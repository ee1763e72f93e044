//! Template expansion and placeholder substitution.
//!
//! A mapping carrying a `$$template` marker names one or more registered
//! templates. Each body has its placeholders substituted, is expanded
//! recursively (multi-level chains), and the results are merged
//! left-to-right with a shallow overlay; the literal mapping always wins
//! over template-supplied keys. Cycles between templates are not
//! detected and recurse until stack exhaustion.

use std::borrow::Cow;

use log::trace;
use serde_json::{Map, Value};

use crate::constants::{
    PLACEHOLDER_DEFAULT_KEY, PLACEHOLDER_KEY, PLACEHOLDER_PREFIX, TEMPLATE_KEY,
};
use crate::context::MakeContext;
use crate::error::MakeResult;

struct TemplateEntry<'a> {
    name: &'a str,
    placeholders: Option<&'a Map<String, Value>>,
}

/// Expands a `$$template` marker at the top of a mapping. Anything else
/// is returned untouched.
pub(super) fn expand<'c>(ctx: &MakeContext, config: &'c Value) -> MakeResult<Cow<'c, Value>> {
    let Value::Object(map) = config else {
        return Ok(Cow::Borrowed(config));
    };
    let Some(marker) = map.get(TEMPLATE_KEY) else {
        return Ok(Cow::Borrowed(config));
    };
    if marker_is_empty(marker) {
        return Ok(Cow::Borrowed(config));
    }

    let entries = parse_entries(ctx, marker)?;
    for entry in &entries {
        if !ctx.registry().has_template(entry.name) {
            return Err(ctx.invalid_config_error(format!("cannot find template `{}`", entry.name)));
        }
    }

    let mut merged = Map::new();
    for entry in &entries {
        trace!("expanding template `{}`", entry.name);
        let Some(body) = ctx.registry().get_template(entry.name) else {
            continue;
        };
        let Some(substituted) = substitute(entry.placeholders, body) else {
            continue;
        };
        let expanded = expand(ctx, &substituted)?;
        // a non-mapping body contributes nothing to the merge
        if let Value::Object(body_map) = expanded.as_ref() {
            for (key, value) in body_map {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in map {
        if key != TEMPLATE_KEY {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Cow::Owned(Value::Object(merged)))
}

/// An absent or empty marker leaves the mapping unexpanded. Scalars
/// other than non-empty strings count as empty.
fn marker_is_empty(marker: &Value) -> bool {
    match marker {
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn parse_entries<'a>(ctx: &MakeContext, marker: &'a Value) -> MakeResult<Vec<TemplateEntry<'a>>> {
    match marker {
        Value::Array(items) => items.iter().map(|entry| parse_entry(ctx, entry)).collect(),
        other => Ok(vec![parse_entry(ctx, other)?]),
    }
}

fn parse_entry<'a>(ctx: &MakeContext, entry: &'a Value) -> MakeResult<TemplateEntry<'a>> {
    match entry {
        Value::String(name) => Ok(TemplateEntry {
            name,
            placeholders: None,
        }),
        Value::Object(map) => {
            let name = match map.get("name") {
                Some(Value::String(name)) => name,
                _ => {
                    return Err(
                        ctx.invalid_config_error("template entry must carry a string `name`")
                    )
                }
            };
            let placeholders = match map.get("placeholders") {
                None | Some(Value::Null) => None,
                Some(Value::Object(placeholders)) => Some(placeholders),
                Some(_) => {
                    return Err(ctx.invalid_config_error("template placeholders must be a mapping"))
                }
            };
            Ok(TemplateEntry { name, placeholders })
        }
        _ => Err(ctx.invalid_config_error(
            "template entry must be a name or a {name, placeholders} mapping",
        )),
    }
}

/// Substitutes placeholders through a template body. `None` means the
/// value resolved to nothing: such keys are dropped from mappings and
/// become null inside arrays.
fn substitute(placeholders: Option<&Map<String, Value>>, body: &Value) -> Option<Value> {
    match body {
        Value::String(text) => match text.strip_prefix(PLACEHOLDER_PREFIX) {
            Some(path) => path_get(placeholders, path).cloned(),
            None => Some(body.clone()),
        },
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| substitute(placeholders, item).unwrap_or(Value::Null))
                .collect(),
        )),
        Value::Object(map) => {
            if let Some(key) = map.get(PLACEHOLDER_KEY) {
                let supplied = match key {
                    Value::String(path) => path_get(placeholders, path).cloned(),
                    _ => None,
                };
                // a null placeholder value falls back to the default too
                return match supplied {
                    Some(Value::Null) | None => map.get(PLACEHOLDER_DEFAULT_KEY).cloned(),
                    supplied => supplied,
                };
            }
            let mut out = Map::new();
            for (key, value) in map {
                if let Some(substituted) = substitute(placeholders, value) {
                    out.insert(key.clone(), substituted);
                }
            }
            Some(Value::Object(out))
        }
        _ => Some(body.clone()),
    }
}

/// Dotted-path lookup into the placeholders mapping, traversing nested
/// mappings and numeric array indices.
fn path_get<'a>(root: Option<&'a Map<String, Value>>, path: &str) -> Option<&'a Value> {
    let map = root?;
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
