//! Loading configs and template bodies from JSON text and files.

use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::{MakeError, MakeResult};
use crate::registry::MakeRegistry;

/// Parses a JSON config from a string.
///
/// # Errors
/// Returns a structural config error when the text is not valid JSON.
pub fn config_from_str(text: &str) -> MakeResult<Value> {
    serde_json::from_str(text).map_err(|e| MakeError::InvalidConfig {
        path: String::new(),
        reason: format!("invalid JSON config: {}", e),
    })
}

/// Reads and parses a JSON config from a file.
///
/// # Errors
/// Returns a structural config error when the file cannot be read or
/// does not contain valid JSON.
pub fn config_from_file(path: impl AsRef<Path>) -> MakeResult<Value> {
    let path = path.as_ref();
    debug!("loading config from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| MakeError::InvalidConfig {
        path: String::new(),
        reason: format!("cannot read config file {}: {}", path.display(), e),
    })?;
    config_from_str(&text)
}

impl MakeRegistry {
    /// Parses a JSON template body and registers it under a name.
    ///
    /// # Errors
    /// Returns a structural config error when the text is not valid JSON.
    pub fn add_template_str(&mut self, name: impl Into<String>, json: &str) -> MakeResult<()> {
        let body = config_from_str(json)?;
        self.add_template(name, body);
        Ok(())
    }

    /// Reads a JSON template body from a file and registers it under a
    /// name.
    ///
    /// # Errors
    /// Returns a structural config error when the file cannot be read or
    /// does not contain valid JSON.
    pub fn add_template_file(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> MakeResult<()> {
        let body = config_from_file(path)?;
        self.add_template(name, body);
        Ok(())
    }
}
