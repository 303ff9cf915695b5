//! Fully resolved, read-only configuration

use serde::de::DeserializeOwned;

use super::node::ConfigNode;
use super::path::ConfigPath;
use crate::error::{ConfigError, Result};

/// Configuration tree with every interpolation substituted and every required value present.
///
/// Only produced by the resolver. Consumers receive it by reference; there is no way
/// to mutate it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    root: ConfigNode,
}

impl ResolvedConfig {
    pub(crate) fn new(root: ConfigNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Look up a dotted path. The empty string is the root.
    pub fn get(&self, dotted: &str) -> Option<&ConfigNode> {
        let path = ConfigPath::parse(dotted)?;
        self.root.get_path(&path)
    }

    /// Like [`get`](Self::get), but a missing path is an error.
    pub fn require(&self, dotted: &str) -> Result<&ConfigNode> {
        self.get(dotted).ok_or_else(|| ConfigError::PathNotFound { path: dotted.to_string() })
    }

    pub fn get_str(&self, dotted: &str) -> Option<&str> {
        self.get(dotted).and_then(ConfigNode::as_str)
    }

    pub fn get_i64(&self, dotted: &str) -> Option<i64> {
        self.get(dotted).and_then(ConfigNode::as_i64)
    }

    pub fn get_f64(&self, dotted: &str) -> Option<f64> {
        self.get(dotted).and_then(ConfigNode::as_f64)
    }

    pub fn get_bool(&self, dotted: &str) -> Option<bool> {
        self.get(dotted).and_then(ConfigNode::as_bool)
    }

    /// Deserialize the subtree at `dotted` into a typed section.
    pub fn extract<T: DeserializeOwned>(&self, dotted: &str) -> Result<T> {
        let node = self.require(dotted)?;
        serde_json::from_value(node.to_json()).map_err(|e| ConfigError::Deserialize {
            path: if dotted.is_empty() { "<root>".to_string() } else { dotted.to_string() },
            message: e.to_string(),
        })
    }

    pub fn into_node(self) -> ConfigNode {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn resolved(text: &str) -> ResolvedConfig {
        let value: serde_yaml::Value = serde_yaml::from_str(text).expect("yaml");
        ResolvedConfig::new(value.into())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct GuidanceSection {
        guidance_scale: f64,
        #[serde(default)]
        min_step_percent: f64,
        pretrained_model_name_or_path: String,
    }

    #[test]
    fn typed_getters() {
        let cfg = resolved("seed: 0\nname: magic123\nsystem:\n  lr: 0.01\n  refine: false\n");
        assert_eq!(cfg.get_i64("seed"), Some(0));
        assert_eq!(cfg.get_str("name"), Some("magic123"));
        assert_eq!(cfg.get_f64("system.lr"), Some(0.01));
        assert_eq!(cfg.get_bool("system.refine"), Some(false));
        assert!(cfg.get("system.nope").is_none());
        assert!(cfg.get("system..lr").is_none());
    }

    #[test]
    fn extract_builds_typed_sections() {
        let cfg = resolved(
            "guidance:\n  guidance_scale: 5\n  pretrained_model_name_or_path: load/zero123/105000.ckpt\n",
        );
        let section: GuidanceSection = cfg.extract("guidance").expect("section");
        assert_eq!(
            section,
            GuidanceSection {
                guidance_scale: 5.0,
                min_step_percent: 0.0,
                pretrained_model_name_or_path: "load/zero123/105000.ckpt".to_string(),
            }
        );
    }

    #[test]
    fn extract_reports_path_on_failure() {
        let cfg = resolved("guidance:\n  guidance_scale: high\n");
        let err = cfg.extract::<GuidanceSection>("guidance").expect_err("should fail");
        assert_eq!(err.path(), Some("guidance"));

        let err = cfg.extract::<GuidanceSection>("renderer").expect_err("absent");
        assert!(matches!(err, ConfigError::PathNotFound { .. }));
    }
}
