//! Output rendering (YAML, JSON, saved parsed configs)

use anyhow::Result;
use clap::ValueEnum;

use crate::domain::ConfigNode;

pub mod dump;

pub use dump::{dump_config, PARSED_CONFIG_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn to_yaml(node: &ConfigNode) -> Result<String> {
    Ok(serde_yaml::to_string(node)?)
}

pub fn to_json(node: &ConfigNode) -> Result<String> {
    let mut out = serde_json::to_string_pretty(node)?;
    out.push('\n');
    Ok(out)
}

pub fn render_node(node: &ConfigNode, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => to_yaml(node),
        OutputFormat::Json => to_json(node),
    }
}

/// Text for a single looked-up value: scalars bare, containers as a document.
pub fn render_value(node: &ConfigNode, format: OutputFormat) -> Result<String> {
    match node.scalar_text() {
        Some(text) if format == OutputFormat::Yaml => Ok(format!("{}\n", text)),
        _ => render_node(node, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigNode {
        serde_yaml::from_str::<serde_yaml::Value>(text).expect("yaml").into()
    }

    #[test]
    fn yaml_output_preserves_key_order() {
        let node = yaml("name: magic123\nseed: 0\nsystem:\n  lr: 0.01\n");
        assert_eq!(to_yaml(&node).expect("yaml"), "name: magic123\nseed: 0\nsystem:\n  lr: 0.01\n");
    }

    #[test]
    fn json_output_is_pretty() {
        let node = yaml("a: [1, 2]\n");
        let json = to_json(&node).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed, serde_json::json!({"a": [1, 2]}));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn scalar_values_render_bare() {
        assert_eq!(render_value(&ConfigNode::Float(0.5), OutputFormat::Yaml).expect("v"), "0.5\n");
        assert_eq!(
            render_value(&ConfigNode::String("a b".into()), OutputFormat::Json).expect("v"),
            "\"a b\"\n"
        );
    }

    #[test]
    fn rendered_yaml_reads_back_identically() {
        let node = yaml("tag: '5'\nflag: 'true'\nratio: 1.0\nempty: null\n");
        let back = yaml(&to_yaml(&node).expect("yaml"));
        assert_eq!(back, node);
    }
}
