//! Named string transforms usable inside `${name:path}`

use std::fmt;

/// Fixed registry of pure, single-argument string transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Replace every space with an underscore.
    RmSpace,
    /// Trim surrounding whitespace.
    Strip,
    /// Final path component.
    Basename,
    /// Path without its final component.
    Dirname,
}

impl Transform {
    pub const ALL: [Transform; 4] =
        [Transform::RmSpace, Transform::Strip, Transform::Basename, Transform::Dirname];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Transform::RmSpace => "rmspace",
            Transform::Strip => "strip",
            Transform::Basename => "basename",
            Transform::Dirname => "dirname",
        }
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Transform::RmSpace => input.replace(' ', "_"),
            Transform::Strip => input.trim().to_string(),
            Transform::Basename => basename(input).to_string(),
            Transform::Dirname => dirname(input).to_string(),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text after the last `/`; empty when the path ends with a separator.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Text before the last `/`, without trailing separators unless it is only separators.
/// A trailing `/` is kept as a component boundary: `outputs/run/` gives `outputs/run`.
fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => {
            let head = &path[..=idx];
            let trimmed = head.trim_end_matches('/');
            if trimmed.is_empty() {
                head
            } else {
                trimmed
            }
        }
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Transform::from_name("rmspace"), Some(Transform::RmSpace));
        assert_eq!(Transform::from_name("basename"), Some(Transform::Basename));
        assert_eq!(Transform::from_name("shout"), None);
    }

    #[test]
    fn rmspace_replaces_spaces() {
        assert_eq!(Transform::RmSpace.apply("a DSLR photo of a cat"), "a_DSLR_photo_of_a_cat");
        assert_eq!(Transform::RmSpace.apply("x y"), "x_y");
    }

    #[test]
    fn strip_trims_whitespace() {
        assert_eq!(Transform::Strip.apply("  teddy bear \n"), "teddy bear");
    }

    #[test]
    fn basename_takes_last_component() {
        assert_eq!(Transform::Basename.apply("load/images/dragon2_rgba.png"), "dragon2_rgba.png");
        assert_eq!(Transform::Basename.apply("outputs/run/"), "");
        assert_eq!(Transform::Basename.apply("plain"), "plain");
        assert_eq!(Transform::Basename.apply("/"), "");
    }

    #[test]
    fn dirname_drops_last_component() {
        assert_eq!(Transform::Dirname.apply("load/images/dragon2_rgba.png"), "load/images");
        assert_eq!(Transform::Dirname.apply("/ckpt.pt"), "/");
        assert_eq!(Transform::Dirname.apply("ckpt.pt"), "");
        assert_eq!(Transform::Dirname.apply("a//b"), "a");
        assert_eq!(Transform::Dirname.apply("outputs/run/"), "outputs/run");
        assert_eq!(Transform::Dirname.apply("//ckpt.pt"), "//");
    }
}
