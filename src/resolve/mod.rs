//! Interpolation resolution
//!
//! Every node is resolved at most once: results are memoized by absolute path,
//! and a visiting set turns reference cycles into errors instead of unbounded
//! recursion.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::domain::{ConfigNode, ConfigPath, ResolvedConfig};
use crate::error::{ConfigError, Result};
use crate::interp::{Reference, Segment, Template};

/// Resolve every interpolation in `root` and check that no required value is left.
pub fn resolve_tree(root: &ConfigNode) -> Result<ResolvedConfig> {
    let mut resolver = Resolver::new(root);
    let resolved = resolver.resolve_at(root, &ConfigPath::root())?;
    tracing::debug!(
        "Resolved {} interpolation(s) across {} memoized node(s)",
        resolver.interpolations,
        resolver.cache.len()
    );

    if let Some(path) = resolved.find_missing() {
        return Err(ConfigError::MissingRequiredField { path: path.to_string() });
    }
    Ok(ResolvedConfig::new(resolved))
}

struct Resolver<'a> {
    raw: &'a ConfigNode,
    cache: HashMap<ConfigPath, ConfigNode>,
    visiting: HashSet<ConfigPath>,
    /// Aliases currently being looked through.
    aliasing: HashSet<ConfigPath>,
    interpolations: usize,
}

impl<'a> Resolver<'a> {
    fn new(raw: &'a ConfigNode) -> Self {
        Self {
            raw,
            cache: HashMap::new(),
            visiting: HashSet::new(),
            aliasing: HashSet::new(),
            interpolations: 0,
        }
    }

    fn resolve_at(&mut self, node: &ConfigNode, path: &ConfigPath) -> Result<ConfigNode> {
        if let Some(done) = self.cache.get(path) {
            return Ok(done.clone());
        }
        if !self.visiting.insert(path.clone()) {
            return Err(ConfigError::Cycle { path: path.to_string() });
        }

        let result = self.resolve_node(node, path);
        self.visiting.remove(path);

        let value = result?;
        self.cache.insert(path.clone(), value.clone());
        Ok(value)
    }

    fn resolve_node(&mut self, node: &ConfigNode, path: &ConfigPath) -> Result<ConfigNode> {
        match node {
            ConfigNode::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.resolve_at(child, &path.child(key.as_str()))?);
                }
                Ok(ConfigNode::Map(out))
            }
            ConfigNode::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    out.push(self.resolve_at(child, &path.child(idx.to_string()))?);
                }
                Ok(ConfigNode::List(out))
            }
            ConfigNode::String(text) => match Template::parse(text, path)? {
                Some(template) => self.render(&template, path),
                None => Ok(node.clone()),
            },
            other => Ok(other.clone()),
        }
    }

    fn render(&mut self, template: &Template, at: &ConfigPath) -> Result<ConfigNode> {
        self.interpolations += 1;

        if let Some(reference) = template.as_single_ref() {
            let value = self.dereference(reference)?;
            if reference.transforms.is_empty() {
                return Ok(value);
            }
            return Ok(ConfigNode::String(apply_transforms(reference, &value, at)?));
        }

        let mut text = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Ref(reference) => {
                    let value = self.dereference(reference)?;
                    text.push_str(&apply_transforms(reference, &value, at)?);
                }
            }
        }
        Ok(ConfigNode::String(text))
    }

    /// Resolved value behind a reference; a required sentinel there is an error.
    fn dereference(&mut self, reference: &Reference) -> Result<ConfigNode> {
        let value = self.lookup(&reference.path)?;
        if value.is_missing() {
            return Err(ConfigError::MissingRequiredField { path: reference.path.to_string() });
        }
        Ok(value)
    }

    /// Find `target` in the raw tree, looking through interpolated containers on the way.
    fn lookup(&mut self, target: &ConfigPath) -> Result<ConfigNode> {
        let raw = self.raw;
        let mut node = raw;
        let mut current = ConfigPath::root();

        for (depth, segment) in target.segments().iter().enumerate() {
            if is_interpolated(node) {
                return self.lookup_below(node, &current, target, depth);
            }
            node = node
                .child(segment)
                .ok_or_else(|| ConfigError::PathNotFound { path: target.to_string() })?;
            current = current.child(segment.as_str());
        }

        self.resolve_at(node, target)
    }

    /// Continue a lookup of `target` below the interpolated node at `at`.
    ///
    /// A plain alias (`${other.path}`) redirects the lookup into its source, so
    /// only the requested leaf is resolved. Anything else is resolved whole.
    fn lookup_below(
        &mut self,
        node: &ConfigNode,
        at: &ConfigPath,
        target: &ConfigPath,
        depth: usize,
    ) -> Result<ConfigNode> {
        let rest = &target.segments()[depth..];
        let template = match node {
            ConfigNode::String(text) => Template::parse(text, at)?,
            _ => None,
        };
        let alias = template
            .as_ref()
            .and_then(Template::as_single_ref)
            .filter(|reference| reference.transforms.is_empty());

        if let Some(reference) = alias {
            if !self.aliasing.insert(at.clone()) {
                return Err(ConfigError::Cycle { path: at.to_string() });
            }
            let redirected = rest.iter().fold(reference.path.clone(), |p, s| p.child(s.as_str()));
            let result = self.lookup(&redirected);
            self.aliasing.remove(at);
            return result;
        }

        let resolved = self.resolve_at(node, at)?;
        rest.iter()
            .try_fold(&resolved, |n, s| n.child(s))
            .cloned()
            .ok_or_else(|| ConfigError::PathNotFound { path: target.to_string() })
    }
}

fn is_interpolated(node: &ConfigNode) -> bool {
    matches!(node, ConfigNode::String(s) if s.contains("${"))
}

/// Run the reference's transform chain over the scalar text of `value`.
fn apply_transforms(reference: &Reference, value: &ConfigNode, at: &ConfigPath) -> Result<String> {
    let Some(mut text) = value.scalar_text() else {
        return Err(ConfigError::InvalidInterpolation {
            path: at.to_string(),
            message: format!(
                "'{}' is a {} and cannot be used as text",
                reference.path,
                value.type_name()
            ),
        });
    };
    for transform in &reference.transforms {
        text = transform.apply(&text);
    }
    Ok(text)
}
