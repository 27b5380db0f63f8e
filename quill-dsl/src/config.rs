//! Loading parser settings from TOML.
//!
//! ```toml
//! imports = { orm = "Acme\\ORM\\Mapping", __NAMESPACE__ = "App\\Entity" }
//! ignored_annotation_names = ["author", "since"]
//! ignore_not_imported_annotations = false
//! target = 1
//! ```

use quill_core::{ConfigError, ParserConfig};

/// Parse and validate settings. Import aliases are lower-cased.
pub fn load_config(text: &str) -> Result<ParserConfig, ConfigError> {
    let mut config: ParserConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    config.imports = std::mem::take(&mut config.imports)
        .into_iter()
        .map(|(alias, fqn)| (alias.to_lowercase(), fqn))
        .collect();
    config.validate()?;
    Ok(config)
}
