//! Saving the parsed config next to a run's outputs

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::to_yaml;
use crate::domain::{ConfigNode, ResolvedConfig};

pub const PARSED_CONFIG_FILE: &str = "parsed.yaml";

/// Write `config` to `dir/parsed.yaml`, creating `dir` if needed.
///
/// Literal `${` text is written back as `\${`, so the file loads to the same config.
pub fn dump_config(dir: &Path, config: &ResolvedConfig) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed creating config directory: {}", dir.display()))?;
    let path = dir.join(PARSED_CONFIG_FILE);
    fs::write(&path, to_yaml(&escape_literals(config.root()))?)
        .with_context(|| format!("Failed writing parsed config: {}", path.display()))?;
    tracing::debug!("Saved parsed config to {}", path.display());
    Ok(path)
}

fn escape_literals(node: &ConfigNode) -> ConfigNode {
    match node {
        ConfigNode::String(text) if text.contains("${") => {
            ConfigNode::String(text.replace("${", "\\${"))
        }
        ConfigNode::List(items) => ConfigNode::List(items.iter().map(escape_literals).collect()),
        ConfigNode::Map(map) => {
            ConfigNode::Map(map.iter().map(|(k, v)| (k.clone(), escape_literals(v))).collect())
        }
        other => other.clone(),
    }
}
