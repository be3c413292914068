use std::fmt;
use std::str::FromStr;

use crate::error::{PathError, PathResult};

/// An ordered sequence of keys addressing a location in a state tree.
///
/// `["a", "b"]` addresses `state["a"]["b"]`. The empty path addresses the
/// root. Segments may contain any characters, including `.`; the dotted
/// string form is a convenience for paths whose keys do not.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from any sequence of keys.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The keys of this path, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of keys in the path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Return this path extended by one key.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    /// Extend this path by one key in place.
    pub fn push(&mut self, key: impl Into<String>) {
        self.segments.push(key.into());
    }

    /// The path one level up, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Returns `true` if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Parse a dotted path. The empty string is the root.
impl FromStr for StatePath {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for (position, segment) in s.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: s.to_string(),
                    position,
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }
}

impl From<&StatePath> for StatePath {
    fn from(path: &StatePath) -> Self {
        path.clone()
    }
}

impl From<Vec<String>> for StatePath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<Vec<&str>> for StatePath {
    fn from(segments: Vec<&str>) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for StatePath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl From<&[String]> for StatePath {
    fn from(segments: &[String]) -> Self {
        Self::new(segments.iter().cloned())
    }
}

impl<const N: usize> From<[&str; N]> for StatePath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl<const N: usize> From<&[&str; N]> for StatePath {
    fn from(segments: &[&str; N]) -> Self {
        Self::new(segments.iter().copied())
    }
}
