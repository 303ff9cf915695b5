//! `${...}` template parsing
//!
//! Grammar of a template body: `[transform:]*path`. Transforms are applied
//! right to left, so `${t2:t1:a.b}` runs `t1` first. A path with leading dots
//! is relative to the mapping holding the leaf (`${.sibling}`, `${..uncle}`).
//! `\${` is a literal `${`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ConfigPath;
use crate::error::{ConfigError, Result};

pub mod transforms;

pub use transforms::Transform;

static TRANSFORM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static PATH_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<dots>\.*)(?P<path>[^.\s:{}$]+(?:\.[^.\s:{}$]+)*)$").expect("valid regex")
});

/// A single `${...}` reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Absolute target path.
    pub path: ConfigPath,
    /// Transforms in application order.
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Ref(Reference),
}

/// A string leaf split into literal text and references.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse the string stored at `at`. Returns `None` for plain strings.
    pub fn parse(text: &str, at: &ConfigPath) -> Result<Option<Template>> {
        if !text.contains("${") {
            return Ok(None);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
                literal.push_str(&rest[..start - 1]);
                literal.push_str("${");
                rest = &rest[start + 2..];
                continue;
            }

            literal.push_str(&rest[..start]);
            let body_start = start + 2;
            let Some(len) = rest[body_start..].find('}') else {
                return Err(invalid(at, format!("unterminated interpolation in '{}'", text)));
            };
            let body = &rest[body_start..body_start + len];
            if body.contains("${") {
                return Err(invalid(at, format!("nested interpolation in '{}'", text)));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Ref(parse_reference(body, at)?));
            rest = &rest[body_start + len + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Some(Template { segments }))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The reference when the whole string is exactly one `${...}`.
    pub fn as_single_ref(&self) -> Option<&Reference> {
        match self.segments.as_slice() {
            [Segment::Ref(reference)] => Some(reference),
            _ => None,
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Ref(r) => Some(r),
            Segment::Literal(_) => None,
        })
    }
}

fn parse_reference(body: &str, at: &ConfigPath) -> Result<Reference> {
    let body = body.trim();
    if body.is_empty() {
        return Err(invalid(at, "empty interpolation '${}'".to_string()));
    }

    let mut parts: Vec<&str> = body.split(':').collect();
    let path_part = parts.pop().unwrap_or_default();

    let mut transforms = Vec::with_capacity(parts.len());
    for name in parts.iter().rev() {
        let name = name.trim();
        if !TRANSFORM_NAME.is_match(name) {
            return Err(invalid(at, format!("malformed transform name '{}'", name)));
        }
        let transform = Transform::from_name(name).ok_or_else(|| ConfigError::UnknownTransform {
            name: name.to_string(),
            path: at.to_string(),
        })?;
        transforms.push(transform);
    }

    let path_part = path_part.trim();
    let Some(caps) = PATH_BODY.captures(path_part) else {
        return Err(invalid(at, format!("malformed reference '{}'", path_part)));
    };
    let dots = caps.name("dots").map_or(0, |m| m.as_str().len());
    let relative = caps
        .name("path")
        .and_then(|m| ConfigPath::parse(m.as_str()))
        .ok_or_else(|| invalid(at, format!("malformed reference '{}'", path_part)))?;

    let path = if dots == 0 {
        relative
    } else {
        let base = at.ancestor(dots).ok_or_else(|| {
            invalid(at, format!("relative reference '{}' escapes the document root", path_part))
        })?;
        base.join(&relative)
    };

    Ok(Reference { path, transforms })
}

fn invalid(at: &ConfigPath, message: String) -> ConfigError {
    ConfigError::InvalidInterpolation { path: at.to_string(), message }
}
