//! Configuration loading, layering and overriding
//!
//! A run's configuration goes through a fixed pipeline: base files are loaded
//! and layered (later files win), command-line overrides are applied in order,
//! then the tree is resolved into a [`ResolvedConfig`].

use std::path::Path;

use crate::domain::{ConfigNode, ResolvedConfig};
use crate::error::Result;
use crate::resolve::resolve_tree;

pub mod loader;
pub mod merge;
pub mod overrides;

pub use loader::{load_document, load_documents, DocumentFormat};
pub use merge::deep_merge;
pub use overrides::{apply_override, parse_overrides, Override};

/// Knobs for the override/resolve pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Convert override values to the scalar type already stored at their path.
    pub coerce_overrides: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { coerce_overrides: true }
    }
}

/// A loaded, not yet resolved configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: ConfigNode,
}

impl ConfigDocument {
    pub(crate) fn from_root(root: ConfigNode) -> Self {
        Self { root }
    }

    /// Parse an in-memory YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let root = loader::parse_document(content, DocumentFormat::Yaml, "<string>")?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    pub fn into_root(self) -> ConfigNode {
        self.root
    }

    /// Layer another document on top of this one.
    pub fn merge(&mut self, other: ConfigDocument) {
        deep_merge(&mut self.root, other.root);
    }

    /// Apply overrides strictly in order; later ones win on the same path.
    pub fn apply_overrides(&mut self, overrides: &[Override], options: &ResolverOptions) -> Result<()> {
        for ov in overrides {
            apply_override(&mut self.root, ov, options.coerce_overrides)?;
        }
        Ok(())
    }

    /// Substitute every interpolation and check required values.
    pub fn resolve(self) -> Result<ResolvedConfig> {
        resolve_tree(&self.root)
    }
}

/// Load `paths`, apply `overrides` (`dotted.path=value`), and resolve.
pub fn load_config<P, S>(paths: &[P], overrides: &[S], options: &ResolverOptions) -> Result<ResolvedConfig>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut document = load_documents(paths)?;
    let overrides = parse_overrides(overrides)?;
    tracing::debug!("Applying {} override(s) over {} file(s)", overrides.len(), paths.len());
    document.apply_overrides(&overrides, options)?;
    document.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_end_to_end() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("zero123.yaml");
        fs::write(
            &path,
            "name: zero123\ntag: \"${rmspace:system.prompt}\"\ndata:\n  image_path: '???'\nsystem:\n  prompt: a teddy bear\n",
        )
        .expect("write");

        let cfg = load_config(&[&path], &["data.image_path=load/images/teddy.png"], &ResolverOptions::default())
            .expect("config");
        assert_eq!(cfg.get_str("tag"), Some("a_teddy_bear"));
        assert_eq!(cfg.get_str("data.image_path"), Some("load/images/teddy.png"));
    }

    #[test]
    fn test_load_config_requires_missing_values() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("zero123.yaml");
        fs::write(&path, "data:\n  image_path: '???'\n").expect("write");

        let overrides: [&str; 0] = [];
        let err = load_config(&[&path], &overrides, &ResolverOptions::default()).expect_err("missing");
        assert!(matches!(err, ConfigError::MissingRequiredField { ref path } if path == "data.image_path"));
    }

    #[test]
    fn test_document_merge_and_overrides() {
        let mut doc = ConfigDocument::from_yaml_str("seed: 0\nsystem:\n  lr: 0.01\n").expect("doc");
        doc.merge(ConfigDocument::from_yaml_str("system:\n  lr: 0.02\n").expect("layer"));
        let overrides = parse_overrides(&["seed=7", "seed=9"]).expect("overrides");
        doc.apply_overrides(&overrides, &ResolverOptions::default()).expect("apply");

        let cfg = doc.resolve().expect("resolve");
        assert_eq!(cfg.get_i64("seed"), Some(9));
        assert_eq!(cfg.get_f64("system.lr"), Some(0.02));
    }
}
