//! Configuration tree

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

use super::path::ConfigPath;

/// Literal that marks a value which must be supplied before the config is usable.
pub const MISSING_MARKER: &str = "???";

/// A node of a configuration document.
///
/// String leaves may still carry `${...}` interpolations until the tree is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Required sentinel (`???`).
    Missing,
    List(Vec<ConfigNode>),
    Map(IndexMap<String, ConfigNode>),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Map(IndexMap::new())
    }
}

impl ConfigNode {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigNode::Null => "null",
            ConfigNode::Bool(_) => "bool",
            ConfigNode::Int(_) => "int",
            ConfigNode::Float(_) => "float",
            ConfigNode::String(_) => "string",
            ConfigNode::Missing => "missing",
            ConfigNode::List(_) => "list",
            ConfigNode::Map(_) => "mapping",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigNode::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and ints widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigNode::Float(f) => Some(*f),
            ConfigNode::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Direct child by key (mappings) or numeric index (lists).
    pub fn child(&self, segment: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Map(map) => map.get(segment),
            ConfigNode::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub fn get_path(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Scalar text used when a value is spliced into a string or fed to a transform.
    /// Containers and the required sentinel have no scalar text.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ConfigNode::Null => Some("null".to_string()),
            ConfigNode::Bool(b) => Some(b.to_string()),
            ConfigNode::Int(i) => Some(i.to_string()),
            ConfigNode::Float(f) => Some(format_float(*f)),
            ConfigNode::String(s) => Some(s.clone()),
            ConfigNode::Missing | ConfigNode::List(_) | ConfigNode::Map(_) => None,
        }
    }

    /// First required sentinel in document order, with its path.
    pub fn find_missing(&self) -> Option<ConfigPath> {
        fn walk(node: &ConfigNode, path: &ConfigPath) -> Option<ConfigPath> {
            match node {
                ConfigNode::Missing => Some(path.clone()),
                ConfigNode::Map(map) => map.iter().find_map(|(k, v)| walk(v, &path.child(k))),
                ConfigNode::List(items) => items
                    .iter()
                    .enumerate()
                    .find_map(|(i, v)| walk(v, &path.child(i.to_string()))),
                _ => None,
            }
        }
        walk(self, &ConfigPath::root())
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ConfigNode::Null => Value::Null,
            ConfigNode::Bool(b) => Value::Bool(*b),
            ConfigNode::Int(i) => Value::from(*i),
            ConfigNode::Float(f) => {
                serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
            ConfigNode::String(s) => Value::String(s.clone()),
            ConfigNode::Missing => Value::String(MISSING_MARKER.to_string()),
            ConfigNode::List(items) => Value::Array(items.iter().map(ConfigNode::to_json).collect()),
            ConfigNode::Map(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for ConfigNode {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => ConfigNode::Null,
            Value::Bool(b) => ConfigNode::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigNode::Int(i)
                } else {
                    ConfigNode::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) if s == MISSING_MARKER => ConfigNode::Missing,
            Value::String(s) => ConfigNode::String(s),
            Value::Sequence(items) => ConfigNode::List(items.into_iter().map(Into::into).collect()),
            Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    map.insert(yaml_key(key), value.into());
                }
                ConfigNode::Map(map)
            }
            Value::Tagged(tagged) => tagged.value.into(),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s,
        other => {
            let text = ConfigNode::from(other).scalar_text().unwrap_or_default();
            tracing::warn!("Non-string mapping key stringified as '{}'", text);
            text
        }
    }
}

impl From<toml::Value> for ConfigNode {
    fn from(value: toml::Value) -> Self {
        use toml::Value;
        match value {
            Value::String(s) if s == MISSING_MARKER => ConfigNode::Missing,
            Value::String(s) => ConfigNode::String(s),
            Value::Integer(i) => ConfigNode::Int(i),
            Value::Float(f) => ConfigNode::Float(f),
            Value::Boolean(b) => ConfigNode::Bool(b),
            Value::Datetime(dt) => ConfigNode::String(dt.to_string()),
            Value::Array(items) => ConfigNode::List(items.into_iter().map(Into::into).collect()),
            Value::Table(table) => {
                ConfigNode::Map(table.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<serde_json::Value> for ConfigNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigNode::Null,
            Value::Bool(b) => ConfigNode::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigNode::Int(i),
                None => ConfigNode::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) if s == MISSING_MARKER => ConfigNode::Missing,
            Value::String(s) => ConfigNode::String(s),
            Value::Array(items) => ConfigNode::List(items.into_iter().map(Into::into).collect()),
            Value::Object(object) => {
                ConfigNode::Map(object.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigNode::Null => serializer.serialize_unit(),
            ConfigNode::Bool(b) => serializer.serialize_bool(*b),
            ConfigNode::Int(i) => serializer.serialize_i64(*i),
            ConfigNode::Float(f) => serializer.serialize_f64(*f),
            ConfigNode::String(s) => serializer.serialize_str(s),
            ConfigNode::Missing => serializer.serialize_str(MISSING_MARKER),
            ConfigNode::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigNode::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scalar_text() {
            Some(text) => write!(f, "{}", text),
            None if self.is_missing() => write!(f, "{}", MISSING_MARKER),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

/// Float text as the training framework writes it: a trailing `.0` on integral
/// values, and exponent form (`1e-15`, `1e+20`) outside `1e-4 <= |x| < 1e16`.
fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        if value.fract() == 0.0 {
            format!("{:.1}", value)
        } else {
            value.to_string()
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigNode {
        serde_yaml::from_str::<serde_yaml::Value>(text).expect("yaml").into()
    }

    #[test]
    fn yaml_scalars_keep_their_types() {
        let node = yaml("a: 1\nb: 0.5\nc: true\nd: null\ne: text\nf: '???'\n");
        assert_eq!(node.child("a"), Some(&ConfigNode::Int(1)));
        assert_eq!(node.child("b"), Some(&ConfigNode::Float(0.5)));
        assert_eq!(node.child("c"), Some(&ConfigNode::Bool(true)));
        assert_eq!(node.child("d"), Some(&ConfigNode::Null));
        assert_eq!(node.child("e"), Some(&ConfigNode::String("text".into())));
        assert_eq!(node.child("f"), Some(&ConfigNode::Missing));
    }

    #[test]
    fn numeric_keys_are_stringified() {
        let node = yaml("1: one\ntrue: yes\n");
        assert_eq!(node.child("1").and_then(ConfigNode::as_str), Some("one"));
        assert!(node.child("true").is_some());
    }

    #[test]
    fn get_path_walks_maps_and_lists() {
        let node = yaml("data:\n  image_paths: [a.png, b.png]\n");
        let path = ConfigPath::parse("data.image_paths.1").expect("path");
        assert_eq!(node.get_path(&path).and_then(ConfigNode::as_str), Some("b.png"));
        let bad = ConfigPath::parse("data.image_paths.7").expect("path");
        assert!(node.get_path(&bad).is_none());
    }

    #[test]
    fn find_missing_reports_first_in_document_order() {
        let node = yaml("a: 1\nb:\n  c: '???'\nd: '???'\n");
        assert_eq!(node.find_missing().map(|p| p.to_string()), Some("b.c".to_string()));
    }

    #[test]
    fn scalar_text_formats_floats_and_null() {
        assert_eq!(ConfigNode::Float(2.0).scalar_text().as_deref(), Some("2.0"));
        assert_eq!(ConfigNode::Float(0.25).scalar_text().as_deref(), Some("0.25"));
        assert_eq!(ConfigNode::Null.scalar_text().as_deref(), Some("null"));
        assert!(ConfigNode::List(vec![]).scalar_text().is_none());
    }

    #[test]
    fn scalar_text_uses_exponent_form_for_tiny_and_huge_floats() {
        assert_eq!(ConfigNode::Float(1.0e-15).scalar_text().as_deref(), Some("1e-15"));
        assert_eq!(ConfigNode::Float(1.5e-7).scalar_text().as_deref(), Some("1.5e-07"));
        assert_eq!(ConfigNode::Float(1.0e20).scalar_text().as_deref(), Some("1e+20"));
        assert_eq!(ConfigNode::Float(-2.5e16).scalar_text().as_deref(), Some("-2.5e+16"));
        assert_eq!(ConfigNode::Float(0.0001).scalar_text().as_deref(), Some("0.0001"));
        assert_eq!(ConfigNode::Float(1.0e15).scalar_text().as_deref(), Some("1000000000000000.0"));
        assert_eq!(ConfigNode::Float(0.0).scalar_text().as_deref(), Some("0.0"));
    }

    #[test]
    fn toml_and_json_convert_to_the_same_tree() {
        let table: toml::Table = toml::from_str("[system]\nlr = 0.01\nsteps = 10\n").expect("toml");
        let from_toml: ConfigNode = toml::Value::Table(table).into();
        let from_json: ConfigNode =
            serde_json::from_str::<serde_json::Value>(r#"{"system": {"lr": 0.01, "steps": 10}}"#)
                .expect("json")
                .into();
        assert_eq!(from_toml, from_json);
    }
}
