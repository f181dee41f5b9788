use std::fmt;

use crate::error::{FrameError, FrameResult};

/// Location of a possibly nested column, outermost segment first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPath(Vec<String>);

impl ColumnPath {
    pub fn new<I, S>(segments: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments.into_iter().map(Into::into).collect::<Vec<_>>();
        if segments.is_empty() {
            return Err(FrameError::EmptyPath);
        }
        Ok(Self(segments))
    }

    /// Path of a top-level column.
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Splits `value` on `separator`, e.g. `"user.name"` with `'.'`.
    pub fn parse(value: &str, separator: char) -> FrameResult<Self> {
        Self::new(
            value
                .split(separator)
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn segment(&self, depth: usize) -> Option<&str> {
        self.0.get(depth).map(String::as_str)
    }

    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Path of the enclosing column group, `None` for top-level columns.
    pub fn parent(&self) -> Option<ColumnPath> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    pub fn child(&self, name: impl Into<String>) -> ColumnPath {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Replaces the last segment.
    pub fn with_last(&self, name: impl Into<String>) -> ColumnPath {
        let mut segments = self.0.clone();
        if let Some(last) = segments.last_mut() {
            *last = name.into();
        }
        Self(segments)
    }

    pub fn starts_with(&self, prefix: &ColumnPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The first `len` segments.
    pub(crate) fn prefix(&self, len: usize) -> String {
        self.0[..len.min(self.0.len())].join(".")
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for ColumnPath {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}
