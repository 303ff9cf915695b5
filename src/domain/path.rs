//! Dotted configuration paths

use std::fmt;

/// An absolute path into a configuration tree, e.g. `system.guidance.guidance_scale`.
///
/// Segments are mapping keys; a purely numeric segment also addresses a list element.
/// The empty path is the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a.b.c`. Returns `None` for empty segments (`a..b`, `.a`, `a.`).
    pub fn parse(dotted: &str) -> Option<Self> {
        if dotted.is_empty() {
            return Some(Self::root());
        }
        let mut segments = Vec::new();
        for segment in dotted.split('.') {
            if segment.is_empty() {
                return None;
            }
            segments.push(segment.to_string());
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn join(&self, other: &ConfigPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self { segments: self.segments[..self.segments.len() - 1].to_vec() })
    }

    /// Walk `levels` steps towards the root; `None` when that leaves the tree.
    pub fn ancestor(&self, levels: usize) -> Option<Self> {
        if levels > self.segments.len() {
            return None;
        }
        Some(Self { segments: self.segments[..self.segments.len() - levels].to_vec() })
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.segments.join("."))
    }
}
