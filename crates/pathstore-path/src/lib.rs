//! State path utilities.
//!
//! A state path addresses a location inside a nested state tree. It is either
//! a dot-delimited string (`"user.name"`) or an already split sequence of
//! segments (`["user", "name"]`). The empty string addresses the whole tree.
//!
//! # Example
//!
//! ```
//! use pathstore_path::{decode, format_path, overlaps};
//!
//! let path = decode("user.name");
//! assert_eq!(path, vec!["user".to_string(), "name".to_string()]);
//! assert_eq!(format_path(&path), "user.name");
//!
//! // A listener on `user` is interested in a change to `user.name`.
//! assert!(overlaps("user.name", "user"));
//! ```
//!
//! Segments are not escaped. A key that itself contains `.` can only be
//! addressed by passing the path as a pre-split sequence.

use thiserror::Error;

pub mod relation;
pub use relation::{ancestors, is_descendant, join, overlaps, parent, Ancestors};

mod value;
pub use value::decode_value;

/// Decoded path: ordered sequence of segments.
pub type Path = Vec<String>;

/// Separator between segments of a string path.
pub const SEPARATOR: char = '.';

/// Conversion of the accepted path shapes into decoded segments.
///
/// Strings are split on [`SEPARATOR`]; sequences are taken as they are.
pub trait IntoPath {
    fn into_path(self) -> Path;
}

impl IntoPath for &str {
    fn into_path(self) -> Path {
        split_path(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Path {
        split_path(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Path {
        split_path(self)
    }
}

impl IntoPath for Vec<String> {
    fn into_path(self) -> Path {
        self
    }
}

impl IntoPath for &Vec<String> {
    fn into_path(self) -> Path {
        self.clone()
    }
}

impl IntoPath for &[String] {
    fn into_path(self) -> Path {
        self.to_vec()
    }
}

impl IntoPath for Vec<&str> {
    fn into_path(self) -> Path {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl IntoPath for &[&str] {
    fn into_path(self) -> Path {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl<const N: usize> IntoPath for [&str; N] {
    fn into_path(self) -> Path {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl<const N: usize> IntoPath for &[&str; N] {
    fn into_path(self) -> Path {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

/// Decode a path into its segments.
///
/// # Example
///
/// ```
/// use pathstore_path::decode;
///
/// assert_eq!(decode(""), Vec::<String>::new());
/// assert_eq!(decode("a.b"), vec!["a", "b"]);
/// assert_eq!(decode(["a.b", "c"]), vec!["a.b", "c"]);
/// ```
pub fn decode(path: impl IntoPath) -> Path {
    path.into_path()
}

fn split_path(path: &str) -> Path {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SEPARATOR).map(str::to_owned).collect()
}

/// Join segments into a dot-delimited string.
///
/// The empty path formats as the empty string, which is the root marker.
///
/// # Example
///
/// ```
/// use pathstore_path::format_path;
///
/// assert_eq!(format_path(&[]), "");
/// assert_eq!(format_path(&["todos".to_string(), "0".to_string()]), "todos.0");
/// ```
pub fn format_path(path: &[String]) -> String {
    path.join(".")
}

/// Check if a decoded path addresses the whole tree.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed path: expected a string or a sequence of segments, found {found}")]
    Malformed { found: &'static str },
}
