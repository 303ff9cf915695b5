//! Config file loading

use std::fs;
use std::path::Path;

use super::merge::deep_merge;
use super::ConfigDocument;
use crate::domain::ConfigNode;
use crate::error::{ConfigError, Result};

/// Document formats understood by the loader, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn load_document(path: &Path) -> Result<ConfigDocument> {
    let label = path.display().to_string();
    let Some(format) = DocumentFormat::from_path(path) else {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        return Err(ConfigError::Parse {
            path: label,
            message: format!("unsupported config extension '.{}'", ext),
        });
    };

    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

    tracing::debug!("Loading {:?} config from {}", format, label);
    let root = parse_document(&content, format, &label)?;
    Ok(ConfigDocument::from_root(root))
}

/// Load every file and layer them in order; later files win.
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<ConfigDocument> {
    let mut merged = ConfigNode::default();
    for path in paths {
        let layer = load_document(path.as_ref())?;
        deep_merge(&mut merged, layer.into_root());
    }
    Ok(ConfigDocument::from_root(merged))
}

/// Parse document text. The root must be a mapping; an empty document is an empty mapping.
pub fn parse_document(content: &str, format: DocumentFormat, label: &str) -> Result<ConfigNode> {
    let parse_error = |message: String| ConfigError::Parse { path: label.to_string(), message };

    let root: ConfigNode = match format {
        DocumentFormat::Yaml => {
            if content.trim().is_empty() {
                return Ok(ConfigNode::default());
            }
            serde_yaml::from_str::<serde_yaml::Value>(content)
                .map_err(|e| parse_error(e.to_string()))?
                .into()
        }
        DocumentFormat::Toml => toml::from_str::<toml::Table>(content)
            .map(|table| toml::Value::Table(table).into())
            .map_err(|e| parse_error(e.to_string()))?,
        DocumentFormat::Json => serde_json::from_str::<serde_json::Value>(content)
            .map_err(|e| parse_error(e.to_string()))?
            .into(),
    };

    match root {
        ConfigNode::Map(_) => Ok(root),
        ConfigNode::Null => Ok(ConfigNode::default()),
        other => Err(parse_error(format!(
            "document root must be a mapping, found {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_document() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("magic123.yaml");
        fs::write(&path, "name: magic123\nseed: 0\ndata:\n  image_path: '???'\n").expect("write");

        let doc = load_document(&path).expect("document");
        let root = doc.root();
        assert_eq!(root.child("name").and_then(ConfigNode::as_str), Some("magic123"));
        assert!(root.child("data").and_then(|d| d.child("image_path")).is_some_and(ConfigNode::is_missing));
    }

    #[test]
    fn test_load_toml_and_json_documents() {
        let tmp = TempDir::new().expect("tmp");
        let toml_path = tmp.path().join("base.toml");
        fs::write(&toml_path, "seed = 3\n[system]\nlr = 0.01\n").expect("write");
        let json_path = tmp.path().join("base.json");
        fs::write(&json_path, r#"{"seed": 3, "system": {"lr": 0.01}}"#).expect("write");

        let from_toml = load_document(&toml_path).expect("toml");
        let from_json = load_document(&json_path).expect("json");
        assert_eq!(from_toml.root(), from_json.root());
    }

    #[test]
    fn test_empty_yaml_is_empty_mapping() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("empty.yml");
        fs::write(&path, "\n").expect("write");
        assert_eq!(load_document(&path).expect("doc").root(), &ConfigNode::default());
    }

    #[test]
    fn test_unsupported_extension_is_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.ini");
        fs::write(&path, "a=1\n").expect("write");
        let err = load_document(&path).expect_err("ini");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("unsupported config extension"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "system: [unclosed\n").expect("write");
        let err = load_document(&path).expect_err("bad yaml");
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.ends_with("bad.yaml")));
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = parse_document("- a\n- b\n", DocumentFormat::Yaml, "inline").expect_err("list");
        assert!(err.to_string().contains("root must be a mapping"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_document(&tmp.path().join("absent.yaml")).expect_err("absent");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_documents_layers_in_order() {
        let tmp = TempDir::new().expect("tmp");
        let base = tmp.path().join("base.yaml");
        let refine = tmp.path().join("refine.yaml");
        fs::write(&base, "name: coarse\nsystem:\n  lr: 0.01\n  steps: 100\n").expect("write");
        fs::write(&refine, "name: refine\nsystem:\n  lr: 0.001\n").expect("write");

        let doc = load_documents(&[&base, &refine]).expect("layers");
        let system = doc.root().child("system").expect("system");
        assert_eq!(doc.root().child("name").and_then(ConfigNode::as_str), Some("refine"));
        assert_eq!(system.child("lr"), Some(&ConfigNode::Float(0.001)));
        assert_eq!(system.child("steps"), Some(&ConfigNode::Int(100)));
    }
}
