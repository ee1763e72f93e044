//! Registry of makers, templates and references.
//!
//! A `MakeRegistry` is populated once during schema setup and treated as
//! read-only during resolution; entries are `Send + Sync`, so a populated
//! registry can serve concurrent read-only `make` calls, each with its
//! own context.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::coerce;
use crate::context::{MakeContext, MakeOptions};
use crate::error::MakeResult;
use crate::recipe::Recipe;
use crate::types::{MadeValue, TypeTag};

/// A maker builds a value from a config, recursing through the context
/// for nested values. `Ok(None)` means the config resolved to nothing.
pub type Maker =
    Box<dyn Fn(&mut MakeContext, &Value, &MakeOptions) -> MakeResult<Option<MadeValue>> + Send + Sync>;

/// Pluggable compatibility test between a type designator and a resolved
/// value.
pub type TypeMatcher = Box<dyn Fn(&TypeTag, &MadeValue) -> bool + Send + Sync>;

/// Store of maker functions keyed by type name, raw template bodies
/// keyed by template name, and pre-built values keyed by reference name.
///
/// Names are matched exactly; registering a name twice replaces the
/// earlier entry. There are no removal operations: entries persist for
/// the registry's lifetime.
pub struct MakeRegistry {
    makers: HashMap<String, Maker>,
    templates: HashMap<String, Value>,
    refs: HashMap<String, MadeValue>,
    type_matcher: TypeMatcher,
}

impl Default for MakeRegistry {
    fn default() -> Self {
        Self {
            makers: HashMap::new(),
            templates: HashMap::new(),
            refs: HashMap::new(),
            type_matcher: Box::new(|tag, value| coerce::is_type_matched(tag, value)),
        }
    }
}

impl MakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a maker under a type name.
    pub fn add_maker<M>(&mut self, name: impl Into<String>, maker: M)
    where
        M: Fn(&mut MakeContext, &Value, &MakeOptions) -> MakeResult<Option<MadeValue>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        debug!("registering maker `{}`", name);
        self.makers.insert(name, Box::new(maker));
    }

    pub fn has_maker(&self, name: &str) -> bool {
        self.makers.contains_key(name)
    }

    pub fn get_maker(&self, name: &str) -> Option<&Maker> {
        self.makers.get(name)
    }

    /// Registers a recipe: its custom maker when it has one, otherwise
    /// the default field-iteration builder, under the recipe's name.
    pub fn add_recipe(&mut self, recipe: Recipe) {
        let mut recipe = recipe;
        let name = recipe.name.clone();
        debug!(
            "registering recipe `{}` with {} field(s)",
            name,
            recipe.fields.len()
        );
        match recipe.custom_maker.take() {
            Some(custom) => self.makers.insert(name, custom),
            None => self.makers.insert(
                name,
                Box::new(move |ctx, config, opts| recipe.make(ctx, config, opts)),
            ),
        };
    }

    /// Registers a raw template body under a name.
    pub fn add_template(&mut self, name: impl Into<String>, body: Value) {
        let name = name.into();
        debug!("registering template `{}`", name);
        self.templates.insert(name, body);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn get_template(&self, name: &str) -> Option<&Value> {
        self.templates.get(name)
    }

    /// Registers a pre-built value under a reference name. The value is
    /// returned as-is wherever a `$#name` string appears in a config,
    /// never reconstructed.
    pub fn add_ref(&mut self, name: impl Into<String>, value: impl Into<MadeValue>) {
        let name = name.into();
        debug!("registering ref `{}`", name);
        self.refs.insert(name, value.into());
    }

    pub fn has_ref(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    pub fn get_ref(&self, name: &str) -> Option<&MadeValue> {
        self.refs.get(name)
    }

    /// Replaces the type-compatibility test used at the type-check step.
    pub fn set_type_matcher(&mut self, matcher: TypeMatcher) {
        self.type_matcher = matcher;
    }

    pub(crate) fn matches_type(&self, tag: &TypeTag, value: &MadeValue) -> bool {
        (self.type_matcher)(tag, value)
    }

    /// Returns a fresh resolution context bound to this registry.
    pub fn new_context(&self) -> MakeContext<'_> {
        MakeContext::new(self)
    }

    /// Builds a value from a config with default options, using a fresh
    /// context.
    pub fn make(&self, config: &Value) -> MakeResult<Option<MadeValue>> {
        self.new_context().make(Some(config), &MakeOptions::default())
    }

    /// Builds a value from a config with the given options, using a
    /// fresh context.
    pub fn make_with(&self, config: &Value, opts: &MakeOptions) -> MakeResult<Option<MadeValue>> {
        self.new_context().make(Some(config), opts)
    }

    /// Pre-materializes a config tree (templates expanded, references
    /// substituted) without constructing any typed object, using a fresh
    /// context.
    pub fn resolve_config(&self, config: &Value) -> MakeResult<MadeValue> {
        self.new_context().resolve_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_registration_wins() {
        let mut registry = MakeRegistry::new();
        registry.add_template("t", json!({"a": 1}));
        registry.add_template("t", json!({"a": 2}));
        assert_eq!(registry.get_template("t"), Some(&json!({"a": 2})));

        registry.add_ref("r", 1i64);
        registry.add_ref("r", 2i64);
        assert_eq!(registry.get_ref("r"), Some(&MadeValue::Number(2.0)));
    }

    #[test]
    fn maker_lookup_is_exact() {
        let mut registry = MakeRegistry::new();
        registry.add_maker("Endpoint", |_, _, _| Ok(Some(MadeValue::Null)));
        assert!(registry.has_maker("Endpoint"));
        assert!(!registry.has_maker("endpoint"));
        assert!(!registry.has_maker("Endpoint "));
    }

    #[test]
    fn type_matcher_is_pluggable() {
        let mut registry = MakeRegistry::new();
        assert!(!registry.matches_type(&TypeTag::Number, &MadeValue::from("5")));
        registry.set_type_matcher(Box::new(|_, _| true));
        assert!(registry.matches_type(&TypeTag::Number, &MadeValue::from("5")));
    }
}
