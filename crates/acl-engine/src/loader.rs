use std::path::Path;

use anyhow::{Context, Result};

use crate::compiler::compile;
use crate::error::ConfigurationError;
use crate::schema::AclConfig;

/// Load an [`AclConfig`] from a YAML file on disk.
///
/// Validates the document after deserialization by compiling its rules
/// (non-empty rule list, every rule has an action, path patterns compile,
/// rule names are unique).
pub fn load_acl(path: impl AsRef<Path>) -> Result<AclConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ACL file: {}", path.display()))?;
    load_acl_from_str(&contents)
        .with_context(|| format!("failed to parse ACL file: {}", path.display()))
}

/// Parse and validate an [`AclConfig`] from a YAML string.
pub fn load_acl_from_str(yaml: &str) -> Result<AclConfig> {
    let config: AclConfig = serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AclConfig) -> Result<()> {
    if config.rules.is_empty() {
        return Err(ConfigurationError::EmptyRules.into());
    }
    compile(&config.rules)?;
    Ok(())
}
