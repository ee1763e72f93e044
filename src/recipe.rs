//! Schema model: per-type construction recipes and the default
//! field-iteration builder.
//!
//! A [`Recipe`] describes how to build one constructible type: a factory
//! producing a blank instance, an ordered list of field descriptors, and
//! optional validation hooks. Registering a recipe installs it as the
//! maker for its type name; a recipe carrying a custom maker bypasses
//! the field iteration entirely.

use log::trace;
use serde_json::Value;

use crate::context::{MakeContext, MakeOptions};
use crate::error::MakeResult;
use crate::registry::Maker;
use crate::types::{Instance, MadeValue, TypeTag};

/// Zero-argument producer of a blank target instance.
pub type Factory = Box<dyn Fn() -> Instance + Send + Sync>;

/// Per-field validation hook: receives the descriptor and the final
/// field value (absent = `None`); `false` fails the construction.
pub type FieldValidation = Box<dyn Fn(&FieldSpec, Option<&MadeValue>) -> bool + Send + Sync>;

/// Whole-object validation hook; `false` fails the construction.
pub type RecipeValidation = Box<dyn Fn(&Instance) -> bool + Send + Sync>;

/// Descriptor for one constructible field.
pub struct FieldSpec {
    /// Field identifier on the target instance.
    pub field_name: String,
    /// Config key to read, when it differs from the field identifier.
    pub config_name: Option<String>,
    /// Preferred type for the field value. An `Array(elem)` tag selects
    /// the sequence specialization with `elem` as the per-element
    /// preferred type.
    pub field_type: Option<TypeTag>,
    /// Per-field maker override replacing the context's default `make`.
    pub maker: Option<Maker>,
    pub skip_type_check: bool,
    pub optional: bool,
    /// Applied when resolution of a present config value yields nothing.
    pub default_value: Option<MadeValue>,
    pub validation: Option<FieldValidation>,
}

impl FieldSpec {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            config_name: None,
            field_type: None,
            maker: None,
            skip_type_check: false,
            optional: false,
            default_value: None,
            validation: None,
        }
    }

    /// Descriptor with a preferred type.
    pub fn typed(field_name: impl Into<String>, field_type: TypeTag) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::new(field_name)
        }
    }

    pub fn with_config_name(mut self, config_name: impl Into<String>) -> Self {
        self.config_name = Some(config_name.into());
        self
    }

    pub fn skip_type_check(mut self) -> Self {
        self.skip_type_check = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<MadeValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_maker<M>(mut self, maker: M) -> Self
    where
        M: Fn(&mut MakeContext, &Value, &MakeOptions) -> MakeResult<Option<MadeValue>>
            + Send
            + Sync
            + 'static,
    {
        self.maker = Some(Box::new(maker));
        self
    }

    pub fn with_validation<V>(mut self, validation: V) -> Self
    where
        V: Fn(&FieldSpec, Option<&MadeValue>) -> bool + Send + Sync + 'static,
    {
        self.validation = Some(Box::new(validation));
        self
    }

    /// The key read from the config: the explicit override or the field
    /// identifier.
    pub fn config_key(&self) -> &str {
        self.config_name.as_deref().unwrap_or(&self.field_name)
    }
}

/// Construction recipe for one constructible type.
pub struct Recipe {
    pub name: String,
    pub factory: Option<Factory>,
    /// Field descriptors, built in declaration order.
    pub fields: Vec<FieldSpec>,
    pub validation: Option<RecipeValidation>,
    /// Replaces the default field-iteration builder entirely when set.
    pub custom_maker: Option<Maker>,
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            name: String::new(),
            factory: None,
            fields: Vec::new(),
            validation: None,
            custom_maker: None,
        }
    }
}

impl Recipe {
    /// Recipe producing blank instances of the named type.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_name = name.clone();
        Self {
            name,
            factory: Some(Box::new(move || Instance::new(type_name.clone()))),
            ..Self::default()
        }
    }

    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_validation<V>(mut self, validation: V) -> Self
    where
        V: Fn(&Instance) -> bool + Send + Sync + 'static,
    {
        self.validation = Some(Box::new(validation));
        self
    }

    pub fn with_custom_maker<M>(mut self, maker: M) -> Self
    where
        M: Fn(&mut MakeContext, &Value, &MakeOptions) -> MakeResult<Option<MadeValue>>
            + Send
            + Sync
            + 'static,
    {
        self.custom_maker = Some(Box::new(maker));
        self
    }

    /// Default field-iteration builder: instantiate a blank target, then
    /// build and assign each described field from the config in
    /// declaration order, running validation hooks along the way.
    ///
    /// # Errors
    /// Returns a `MakeError` when no factory is registered, a field
    /// fails to build, or a validation hook rejects.
    pub fn make(
        &self,
        ctx: &mut MakeContext,
        config: &Value,
        _opts: &MakeOptions,
    ) -> MakeResult<Option<MadeValue>> {
        let Some(factory) = &self.factory else {
            return Err(ctx.construction_error(format!("recipe `{}` has no factory", self.name)));
        };
        trace!("building `{}`", self.name);
        let mut target = factory();

        for field in &self.fields {
            let key = field.config_key();
            if let Some(raw) = config.get(key) {
                let opts = MakeOptions {
                    field_name: Some(key.to_string()),
                    preferred_type: field.field_type.clone(),
                    skip_type_check: field.skip_type_check || field.validation.is_some(),
                    optional: field.optional,
                    default_value: field.default_value.clone(),
                };
                let value = if let Some(TypeTag::Array(element)) = &field.field_type {
                    self.make_array_field(ctx, field, element.as_deref(), raw)?
                } else {
                    match &field.maker {
                        Some(maker) => maker(ctx, raw, &opts)?,
                        None => ctx.make(Some(raw), &opts)?,
                    }
                };
                if let Some(value) = value {
                    target.set(field.field_name.clone(), value);
                }
            }

            if let Some(validation) = &field.validation {
                if !validation(field, target.get(&field.field_name)) {
                    return Err(ctx.construction_error(format!(
                        "validation failed for field `{}`",
                        field.field_name
                    )));
                }
            }
        }

        if let Some(validation) = &self.validation {
            if !validation(&target) {
                return Err(
                    ctx.construction_error(format!("validation failed for `{}`", self.name))
                );
            }
        }

        Ok(Some(MadeValue::Instance(target)))
    }

    /// Sequence specialization: the raw config must be an array; each
    /// element is built through the per-element maker with the element
    /// designator as its preferred type, order preserved.
    fn make_array_field(
        &self,
        ctx: &mut MakeContext,
        field: &FieldSpec,
        element: Option<&TypeTag>,
        raw: &Value,
    ) -> MakeResult<Option<MadeValue>> {
        let Value::Array(items) = raw else {
            return Err(ctx.invalid_config_error(format!(
                "expected an array for field `{}`",
                field.config_key()
            )));
        };
        let skip = field.skip_type_check || field.validation.is_some();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let opts = MakeOptions {
                field_name: Some(format!("{}.{}", field.config_key(), index)),
                preferred_type: element.cloned(),
                skip_type_check: skip,
                optional: false,
                default_value: None,
            };
            let value = match &field.maker {
                Some(maker) => maker(ctx, item, &opts)?,
                None => ctx.make(Some(item), &opts)?,
            };
            out.push(value.unwrap_or(MadeValue::Null));
        }
        Ok(Some(MadeValue::Array(out)))
    }
}
