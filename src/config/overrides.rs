//! Command-line `dotted.path=value` overrides

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{ConfigNode, ConfigPath, MISSING_MARKER};
use crate::error::{ConfigError, Result};

static OVERRIDE_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(?P<key>[^=\s]+)=(?P<value>.*)$").expect("valid regex"));

static INT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("valid regex"));

static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][-+]?[0-9]+)?$")
        .expect("valid regex")
});

/// One `dotted.path=value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: ConfigPath,
    pub value: ConfigNode,
    /// Value text as written, for error messages.
    pub raw_value: String,
}

impl Override {
    pub fn parse(arg: &str) -> Result<Self> {
        let invalid = || ConfigError::InvalidOverride { arg: arg.to_string() };
        let caps = OVERRIDE_ARG.captures(arg).ok_or_else(invalid)?;
        let key = caps.name("key").map(|m| m.as_str()).ok_or_else(invalid)?;
        let raw_value = caps.name("value").map(|m| m.as_str()).unwrap_or_default();

        let path = ConfigPath::parse(key).filter(|p| !p.is_root()).ok_or_else(invalid)?;
        Ok(Self { path, value: parse_value(raw_value), raw_value: raw_value.to_string() })
    }
}

pub fn parse_overrides<S: AsRef<str>>(args: &[S]) -> Result<Vec<Override>> {
    args.iter().map(|arg| Override::parse(arg.as_ref())).collect()
}

/// Interpret override text the way a YAML flow value would read.
fn parse_value(text: &str) -> ConfigNode {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ConfigNode::String(String::new());
    }
    if trimmed == MISSING_MARKER {
        return ConfigNode::Missing;
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(trimmed) {
            return value.into();
        }
        return ConfigNode::String(text.to_string());
    }
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return ConfigNode::String(trimmed[1..trimmed.len() - 1].to_string());
        }
    }
    match trimmed {
        "null" | "Null" | "NULL" | "~" => return ConfigNode::Null,
        "true" | "True" | "TRUE" => return ConfigNode::Bool(true),
        "false" | "False" | "FALSE" => return ConfigNode::Bool(false),
        _ => {}
    }
    if INT_LITERAL.is_match(trimmed) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return ConfigNode::Int(i);
        }
    }
    if FLOAT_LITERAL.is_match(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return ConfigNode::Float(f);
        }
    }
    ConfigNode::String(text.to_string())
}

/// Write `ov` into the tree, creating intermediate mappings as needed.
pub fn apply_override(root: &mut ConfigNode, ov: &Override, coerce: bool) -> Result<()> {
    let not_found = || ConfigError::PathNotFound { path: ov.path.to_string() };
    let Some((last, parents)) = ov.path.segments().split_last() else {
        return Err(not_found());
    };

    let mut node = root;
    for segment in parents {
        node = descend(node, segment).ok_or_else(not_found)?;
    }

    if matches!(node, ConfigNode::Null | ConfigNode::Missing) {
        *node = ConfigNode::Map(IndexMap::new());
    }

    match node {
        ConfigNode::Map(map) => {
            let value = if coerce {
                coerce_value(map.get(last.as_str()), ov)?
            } else {
                ov.value.clone()
            };
            map.insert(last.clone(), value);
        }
        ConfigNode::List(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(not_found)?;
            *slot = if coerce { coerce_value(Some(&*slot), ov)? } else { ov.value.clone() };
        }
        _ => return Err(not_found()),
    }

    tracing::debug!("Applied override {}={}", ov.path, ov.raw_value);
    Ok(())
}

fn descend<'a>(node: &'a mut ConfigNode, segment: &str) -> Option<&'a mut ConfigNode> {
    if matches!(node, ConfigNode::Null | ConfigNode::Missing) {
        *node = ConfigNode::Map(IndexMap::new());
    }
    match node {
        ConfigNode::Map(map) => Some(map.entry(segment.to_string()).or_default()),
        ConfigNode::List(items) => segment.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Keep the scalar type already stored at the override's path.
fn coerce_value(existing: Option<&ConfigNode>, ov: &Override) -> Result<ConfigNode> {
    let value = ov.value.clone();

    // Un-setting and late-bound references are always accepted.
    let passthrough = match &value {
        ConfigNode::Null | ConfigNode::Missing => true,
        ConfigNode::String(s) => s.contains("${"),
        _ => false,
    };
    if passthrough {
        return Ok(value);
    }

    let mismatch = |expected: &'static str| ConfigError::TypeCoercion {
        path: ov.path.to_string(),
        expected,
        value: ov.raw_value.clone(),
    };

    match (existing, value) {
        (Some(ConfigNode::Int(_)), ConfigNode::Int(i)) => Ok(ConfigNode::Int(i)),
        (Some(ConfigNode::Int(_)), ConfigNode::Float(f))
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 =>
        {
            Ok(ConfigNode::Int(f as i64))
        }
        (Some(ConfigNode::Int(_)), _) => Err(mismatch("int")),
        (Some(ConfigNode::Float(_)), ConfigNode::Int(i)) => Ok(ConfigNode::Float(i as f64)),
        (Some(ConfigNode::Float(_)), ConfigNode::Float(f)) => Ok(ConfigNode::Float(f)),
        (Some(ConfigNode::Float(_)), _) => Err(mismatch("float")),
        (Some(ConfigNode::Bool(_)), ConfigNode::Bool(b)) => Ok(ConfigNode::Bool(b)),
        (Some(ConfigNode::Bool(_)), ConfigNode::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "on" => Ok(ConfigNode::Bool(true)),
                "no" | "off" => Ok(ConfigNode::Bool(false)),
                _ => Err(mismatch("bool")),
            }
        }
        (Some(ConfigNode::Bool(_)), _) => Err(mismatch("bool")),
        (_, value) => Ok(value),
    }
}
