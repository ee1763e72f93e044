//! Resolution context: the pipeline that walks a configuration value,
//! expands templates, resolves references, dispatches to a maker and
//! enforces the type-check contract.
//!
//! A context is created per top-level [`MakeContext::make`] call and
//! discarded afterward. It owns the diagnostic path stack; entries are
//! pushed before entering a field and popped on every exit path, so a
//! failed call leaves the context clean for the next one.

mod template;

use std::collections::BTreeMap;

use log::trace;
use serde_json::Value;

use crate::coerce;
use crate::constants::{REF_PREFIX, TYPE_KEY};
use crate::error::{render_path, MakeError, MakeResult};
use crate::registry::MakeRegistry;
use crate::types::{MadeValue, TypeTag};

/// Per-call options steering resolution of one value.
#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    /// Diagnostic path segment pushed while this value resolves.
    pub field_name: Option<String>,
    /// Preferred type: drives maker dispatch for `Named` designators,
    /// primitive coercion for primitive designators, and the final type
    /// check.
    pub preferred_type: Option<TypeTag>,
    /// Return the resolved value unchecked.
    pub skip_type_check: bool,
    /// Tolerate a null/absent result instead of failing the type check.
    pub optional: bool,
    /// Applied only when resolution itself yields nothing.
    pub default_value: Option<MadeValue>,
}

impl MakeOptions {
    /// Options preferring the given type.
    pub fn typed(tag: TypeTag) -> Self {
        Self {
            preferred_type: Some(tag),
            ..Self::default()
        }
    }

    /// Options carrying only a diagnostic field name.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field_name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// One resolution pass over a config value, bound to a registry.
pub struct MakeContext<'r> {
    registry: &'r MakeRegistry,
    path: Vec<String>,
}

impl<'r> MakeContext<'r> {
    pub(crate) fn new(registry: &'r MakeRegistry) -> Self {
        Self {
            registry,
            path: Vec::new(),
        }
    }

    pub fn registry(&self) -> &MakeRegistry {
        self.registry
    }

    /// The current diagnostic path stack.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Resolves a config value into a constructed value.
    ///
    /// `None` config means the value is absent; resolution then yields
    /// the default value when one is given. `Ok(None)` means the value
    /// resolved to nothing, which the type check rejects unless
    /// `skip_type_check` or `optional` says otherwise.
    ///
    /// # Errors
    /// Returns a `MakeError` when the config shape is invalid, a maker
    /// fails, or the resolved value fails the type check.
    pub fn make(
        &mut self,
        config: Option<&Value>,
        opts: &MakeOptions,
    ) -> MakeResult<Option<MadeValue>> {
        if let Some(field_name) = &opts.field_name {
            self.path.push(field_name.clone());
        }
        let result = self.make_checked(config, opts);
        if opts.field_name.is_some() {
            self.path.pop();
        }
        result
    }

    fn make_checked(
        &mut self,
        config: Option<&Value>,
        opts: &MakeOptions,
    ) -> MakeResult<Option<MadeValue>> {
        let raw = self.dispatch(config, opts)?;
        let result = coerce::select([raw, opts.default_value.clone()]);

        if opts.skip_type_check {
            return Ok(result);
        }
        match result {
            None => {
                if opts.optional {
                    Ok(None)
                } else {
                    Err(self.type_check_error("a present value", "undefined"))
                }
            }
            Some(MadeValue::Null) => {
                if opts.optional {
                    Ok(Some(MadeValue::Null))
                } else {
                    Err(self.type_check_error("a present value", "null"))
                }
            }
            Some(value) => {
                if let Some(tag) = &opts.preferred_type {
                    if !self.registry.matches_type(tag, &value) {
                        return Err(self.type_check_error(tag.to_string(), value.describe()));
                    }
                }
                Ok(Some(value))
            }
        }
    }

    /// Template expansion, reference lookup, maker dispatch, primitive
    /// coercion — in that order.
    fn dispatch(
        &mut self,
        config: Option<&Value>,
        opts: &MakeOptions,
    ) -> MakeResult<Option<MadeValue>> {
        let registry = self.registry;
        let Some(config) = config else {
            return Ok(None);
        };

        let expanded = template::expand(self, config)?;
        let config = expanded.as_ref();

        if let Value::String(text) = config {
            if let Some(name) = text.strip_prefix(REF_PREFIX) {
                if let Some(value) = registry.get_ref(name) {
                    trace!("resolved ref `{}`", name);
                    return Ok(Some(value.clone()));
                }
            }
        }

        if let Value::Object(map) = config {
            if let Some(Value::String(type_name)) = map.get(TYPE_KEY) {
                let Some(maker) = registry.get_maker(type_name) else {
                    return Err(self.invalid_config_error(format!(
                        "cannot find maker for {} = `{}`",
                        TYPE_KEY, type_name
                    )));
                };
                trace!("dispatching to maker `{}`", type_name);
                let mut stripped = map.clone();
                stripped.remove(TYPE_KEY);
                return maker(self, &Value::Object(stripped), opts);
            }
        }

        if let Some(TypeTag::Named(name)) = &opts.preferred_type {
            if let Some(maker) = registry.get_maker(name) {
                trace!("dispatching to maker `{}` by preferred type", name);
                return maker(self, config, opts);
            }
        }

        Ok(coerce::primitive_parse(
            MadeValue::from(config),
            opts.preferred_type.as_ref(),
        ))
    }

    /// Pre-materializes a config tree: recursively expands every
    /// template marker at any depth and substitutes registered `$#`
    /// references at string leaves, constructing no typed object.
    ///
    /// # Errors
    /// Returns a `MakeError` when a template marker is malformed or
    /// names an unregistered template.
    pub fn resolve_config(&self, config: &Value) -> MakeResult<MadeValue> {
        match config {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.resolve_config(item)?);
                }
                Ok(MadeValue::Array(out))
            }
            Value::Object(_) => {
                let expanded = template::expand(self, config)?;
                match expanded.as_ref() {
                    Value::Object(map) => {
                        let mut out = BTreeMap::new();
                        for (key, value) in map {
                            out.insert(key.clone(), self.resolve_config(value)?);
                        }
                        Ok(MadeValue::Object(out))
                    }
                    other => self.resolve_config(other),
                }
            }
            Value::String(text) => {
                if let Some(name) = text.strip_prefix(REF_PREFIX) {
                    if let Some(value) = self.registry.get_ref(name) {
                        return Ok(value.clone());
                    }
                }
                Ok(MadeValue::from(config))
            }
            _ => Ok(MadeValue::from(config)),
        }
    }

    /// Structural config error at the current path.
    pub fn invalid_config_error(&self, reason: impl Into<String>) -> MakeError {
        MakeError::InvalidConfig {
            path: render_path(&self.path),
            reason: reason.into(),
        }
    }

    /// Type-check error at the current path.
    pub fn type_check_error(
        &self,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> MakeError {
        MakeError::TypeCheck {
            path: render_path(&self.path),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Construction/validation error at the current path.
    pub fn construction_error(&self, reason: impl Into<String>) -> MakeError {
        MakeError::Construction {
            path: render_path(&self.path),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_config_yields_nothing_under_skip() {
        let registry = MakeRegistry::new();
        let mut ctx = registry.new_context();
        let result = ctx
            .make(
                None,
                &MakeOptions {
                    skip_type_check: true,
                    ..MakeOptions::default()
                },
            )
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn path_unwinds_on_error() {
        let mut registry = MakeRegistry::new();
        registry.add_maker("Outer", |ctx, config, _| {
            ctx.make(
                config.get("inner"),
                &MakeOptions {
                    field_name: Some("inner".to_string()),
                    ..MakeOptions::default()
                },
            )
        });
        let mut ctx = registry.new_context();
        let config = json!({"$$type": "Outer"});

        let first = ctx.make(Some(&config), &MakeOptions::default()).unwrap_err();
        assert_eq!(first.path(), "inner");
        assert_eq!(ctx.path().len(), 0);

        // a second call on the same context starts from a clean path
        let second = ctx.make(Some(&config), &MakeOptions::default()).unwrap_err();
        assert_eq!(second.path(), "inner");
    }

    #[test]
    fn unregistered_ref_passes_through_as_string() {
        let registry = MakeRegistry::new();
        let result = registry.make(&json!("$#missing")).unwrap();
        assert_eq!(result, Some(MadeValue::from("$#missing")));
    }
}
