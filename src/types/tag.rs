use std::fmt;

/// A type designator: the closed set of kinds a field or option can
/// prefer, checked by the coercion library's compatibility test.
///
/// `Array` optionally carries the designator its elements should be
/// built against ("sequence of T"); `Named` designates a constructible
/// type by its registered nominal identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Array(Option<Box<TypeTag>>),
    Named(String),
}

impl TypeTag {
    /// Convenience constructor for a typed sequence designator.
    pub fn array_of(element: TypeTag) -> Self {
        TypeTag::Array(Some(Box::new(element)))
    }

    /// Convenience constructor for a constructible-type designator.
    pub fn named(name: impl Into<String>) -> Self {
        TypeTag::Named(name.into())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Number => write!(f, "number"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::Object => write!(f, "object"),
            TypeTag::Array(None) => write!(f, "array"),
            TypeTag::Array(Some(element)) => write!(f, "array of {}", element),
            TypeTag::Named(name) => write!(f, "{}", name),
        }
    }
}
