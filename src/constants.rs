/// Reserved marker keys and limits for the construction engine.
///
/// Configuration mappings use these keys to drive dispatch and template
/// expansion; they are stripped before any maker sees the config.

/// Mapping key selecting a maker by registered type name.
pub const TYPE_KEY: &str = "$$type";

/// Mapping key naming one or more templates to expand into the mapping.
pub const TEMPLATE_KEY: &str = "$$template";

/// Mapping key marking a placeholder slot inside a template body.
pub const PLACEHOLDER_KEY: &str = "$$placeholder";

/// Mapping key giving the fallback value for a placeholder slot.
pub const PLACEHOLDER_DEFAULT_KEY: &str = "$$default";

/// Prefix marking a template-body string as a placeholder path.
pub const PLACEHOLDER_PREFIX: &str = "$$";

/// Prefix marking a config string as a reference to a pre-built value.
pub const REF_PREFIX: &str = "$#";

/// Maximum number of path segments rendered into an error message.
pub const ERROR_PATH_LIMIT: usize = 100;
