//! Request-path addressing for nested entries.
//!
//! A [`Path`] is the ordered list of mapping keys that leads from the document
//! root to one entry. It is parsed from the resource path of a request:
//!
//! - Segments are separated by `/`
//! - Empty segments (leading, trailing, doubled slashes) are dropped
//! - Every other segment is kept verbatim, including `?`, `#` and spaces
//! - A path with no segments left is an error, never a valid `Path`
//!
//! # Usage
//!
//! ```rust
//! use docstash::doc::Path;
//!
//! let path = Path::parse("/alice//profile/")?;
//! assert_eq!(path.segments().collect::<Vec<_>>(), vec!["alice", "profile"]);
//! assert_eq!(path.to_string(), "alice/profile");
//!
//! assert!(Path::parse("/").is_err());
//! # Ok::<(), docstash::doc::PathError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Error type for path parsing failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The input contained no non-empty segments.
    #[error("Path '{input}' has no segments")]
    Empty { input: String },
}

impl PathError {
    /// Check if this error means there was nothing to address
    pub fn is_empty_path(&self) -> bool {
        matches!(self, PathError::Empty { .. })
    }
}

/// A non-empty, ordered list of mapping keys.
///
/// The last segment is stored apart from the rest so that a `Path` can never
/// be constructed empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    parents: Vec<String>,
    last: String,
}

impl Path {
    /// Parses a decoded resource path such as `/alice/profile`.
    ///
    /// # Errors
    /// Returns [`PathError::Empty`] if no non-empty segments remain.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        Self::from_segments(input.split('/')).map_err(|_| PathError::Empty {
            input: input.to_string(),
        })
    }

    /// Builds a path from already separated segments.
    ///
    /// Segments are used verbatim except that empty ones are skipped.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parents: Vec<String> = segments
            .into_iter()
            .map(Into::into)
            .filter(|segment: &String| !segment.is_empty())
            .collect();
        match parents.pop() {
            Some(last) => Ok(Self { parents, last }),
            None => Err(PathError::Empty {
                input: String::new(),
            }),
        }
    }

    /// Iterates over every segment, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.parents
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.last.as_str()))
    }

    /// The segments leading to the parent mapping of the addressed entry.
    pub fn parent_segments(&self) -> &[String] {
        &self.parents
    }

    /// The key of the addressed entry within its parent mapping.
    pub fn last(&self) -> &str {
        &self.last
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for parent in &self.parents {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}", self.last)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Path::parse(s)
    }
}
