use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::constants::TYPE_KEY;

/// A constructed value: the output side of the engine.
///
/// Mirrors the JSON shape of the config input, with two deviations:
/// numbers are `f64` (NaN representable, which the coercion rules
/// depend on) and `Instance` carries a nominally-typed constructed
/// object. "Undefined" has no variant; absence is expressed as
/// `Option::None` at the API boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum MadeValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<MadeValue>),
    Object(BTreeMap<String, MadeValue>),
    Instance(Instance),
}

/// A constructed object of a registered constructible type: the type's
/// nominal identifier plus its named field values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instance {
    type_name: String,
    fields: BTreeMap<String, MadeValue>,
}

impl Instance {
    /// Creates a blank instance of the named type, as recipe factories do.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&MadeValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<MadeValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style field assignment, convenient in factories.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<MadeValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, MadeValue> {
        &self.fields
    }
}

impl MadeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, MadeValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MadeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MadeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MadeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[MadeValue]> {
        match self {
            MadeValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, MadeValue>> {
        match self {
            MadeValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            MadeValue::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Short kind description used in type-check error messages.
    pub fn describe(&self) -> String {
        match self {
            MadeValue::Null => "null".to_string(),
            MadeValue::Bool(_) => "boolean".to_string(),
            MadeValue::Number(_) => "number".to_string(),
            MadeValue::String(_) => "string".to_string(),
            MadeValue::Array(_) => "array".to_string(),
            MadeValue::Object(_) => "object".to_string(),
            MadeValue::Instance(instance) => format!("instance of {}", instance.type_name()),
        }
    }

    /// Converts back to a plain JSON value. Returns `None` when the value
    /// embeds an instance or a non-finite number, neither of which has a
    /// JSON form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            MadeValue::Null => Some(Value::Null),
            MadeValue::Bool(b) => Some(Value::Bool(*b)),
            MadeValue::Number(n) => json_number(*n),
            MadeValue::String(s) => Some(Value::String(s.clone())),
            MadeValue::Array(items) => items
                .iter()
                .map(MadeValue::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            MadeValue::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            MadeValue::Instance(_) => None,
        }
    }
}

fn json_number(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(Value::Number(serde_json::Number::from(n as i64)))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

impl From<&Value> for MadeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => MadeValue::Null,
            Value::Bool(b) => MadeValue::Bool(*b),
            Value::Number(n) => MadeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => MadeValue::String(s.clone()),
            Value::Array(items) => MadeValue::Array(items.iter().map(MadeValue::from).collect()),
            Value::Object(map) => MadeValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), MadeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for MadeValue {
    fn from(value: Value) -> Self {
        MadeValue::from(&value)
    }
}

impl From<bool> for MadeValue {
    fn from(value: bool) -> Self {
        MadeValue::Bool(value)
    }
}

impl From<f64> for MadeValue {
    fn from(value: f64) -> Self {
        MadeValue::Number(value)
    }
}

impl From<i64> for MadeValue {
    fn from(value: i64) -> Self {
        MadeValue::Number(value as f64)
    }
}

impl From<&str> for MadeValue {
    fn from(value: &str) -> Self {
        MadeValue::String(value.to_string())
    }
}

impl From<String> for MadeValue {
    fn from(value: String) -> Self {
        MadeValue::String(value)
    }
}

impl From<Instance> for MadeValue {
    fn from(value: Instance) -> Self {
        MadeValue::Instance(value)
    }
}

impl<T: Into<MadeValue>> From<Vec<T>> for MadeValue {
    fn from(values: Vec<T>) -> Self {
        MadeValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl Serialize for MadeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MadeValue::Null => serializer.serialize_unit(),
            MadeValue::Bool(b) => serializer.serialize_bool(*b),
            MadeValue::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    serializer.serialize_i64(*n as i64)
                } else if n.is_finite() {
                    serializer.serialize_f64(*n)
                } else {
                    // NaN and infinities have no JSON form
                    serializer.serialize_unit()
                }
            }
            MadeValue::String(s) => serializer.serialize_str(s),
            MadeValue::Array(items) => serializer.collect_seq(items),
            MadeValue::Object(map) => serializer.collect_map(map),
            MadeValue::Instance(instance) => {
                let mut map = serializer.serialize_map(Some(instance.fields.len() + 1))?;
                map.serialize_entry(TYPE_KEY, instance.type_name())?;
                for (field, value) in &instance.fields {
                    map.serialize_entry(field, value)?;
                }
                map.end()
            }
        }
    }
}
