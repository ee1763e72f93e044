//! # Confect
//!
//! A declarative construction engine: given a registry of per-type
//! makers and a JSON-shaped configuration tree, it builds fully-typed
//! object graphs, resolving type dispatch, template inheritance with
//! placeholder substitution, named references, default values and type
//! coercion/validation along the way.
//!
//! ## Core Components
//!
//! * `coerce` - pure conversions between raw values and primitive kinds
//! * `constants` - reserved config marker keys
//! * `context` - the resolution pipeline: template expansion, reference
//!   lookup, maker dispatch, type-check enforcement
//! * `error` - error types carrying the diagnostic config path
//! * `loader` - config and template loading from JSON text and files
//! * `recipe` - per-type construction recipes and the default field
//!   builder
//! * `registry` - makers, templates and references, keyed by name
//! * `types` - constructed values, instances and type designators
//!
//! ## Configuration markers
//!
//! Reserved keys at the top of a config mapping drive the engine: a
//! `$$type` key dispatches to a registered maker, a `$$template` key
//! expands one or more registered templates underneath the literal
//! config, and string values prefixed with `$#` resolve to pre-built
//! reference values by name.
//!
//! ```
//! use confect::{FieldSpec, MakeRegistry, Recipe, TypeTag};
//! use serde_json::json;
//!
//! let mut registry = MakeRegistry::new();
//! registry.add_recipe(
//!     Recipe::new("Endpoint")
//!         .with_field(FieldSpec::typed("host", TypeTag::String))
//!         .with_field(FieldSpec::typed("port", TypeTag::Number)),
//! );
//!
//! let made = registry
//!     .make(&json!({"$$type": "Endpoint", "host": "localhost", "port": "8080"}))
//!     .unwrap()
//!     .unwrap();
//! let endpoint = made.as_instance().unwrap();
//! assert_eq!(endpoint.get("port").unwrap().as_f64(), Some(8080.0));
//! ```

pub mod coerce;
pub mod constants;
pub mod context;
pub mod error;
pub mod loader;
pub mod recipe;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use context::{MakeContext, MakeOptions};
pub use error::{MakeError, MakeResult};
pub use recipe::{FieldSpec, Recipe};
pub use registry::{MakeRegistry, Maker, TypeMatcher};
pub use types::{Instance, MadeValue, TypeTag};
