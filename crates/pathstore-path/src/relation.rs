//! Relations between dot-joined path strings.
//!
//! These work on the formatted form because that is what listeners are keyed
//! by and what the change diff produces.

use crate::SEPARATOR;

/// Check if `path` lies strictly below `ancestor`.
///
/// True when `path` starts with `ancestor` followed by a separator. The root
/// marker `""` is not treated specially here: only paths beginning with `.`
/// descend from it.
///
/// # Example
///
/// ```
/// use pathstore_path::is_descendant;
///
/// assert!(is_descendant("user.name", "user"));
/// assert!(!is_descendant("username", "user"));
/// assert!(!is_descendant("user", "user"));
/// ```
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Decide whether a listener registered at `listener` must hear about a
/// change at `changed`.
///
/// Matches on equality, on either path descending from the other, and for
/// every change when the listener is at the root.
///
/// # Example
///
/// ```
/// use pathstore_path::overlaps;
///
/// assert!(overlaps("a.b", "a.b"));
/// assert!(overlaps("a.b.c", "a.b"));
/// assert!(overlaps("a", "a.b"));
/// assert!(overlaps("x", ""));
/// assert!(!overlaps("x", "a.b"));
/// ```
pub fn overlaps(changed: &str, listener: &str) -> bool {
    changed == listener
        || is_descendant(changed, listener)
        || is_descendant(listener, changed)
        || listener.is_empty()
}

/// Parent of a formatted path.
///
/// A top-level key has the root marker `""` as parent; the root has none.
pub fn parent(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind(SEPARATOR).map_or("", |idx| &path[..idx]))
}

/// Append `key` to `parent`, treating `""` as the root.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        return key.to_owned();
    }
    let mut out = String::with_capacity(parent.len() + 1 + key.len());
    out.push_str(parent);
    out.push(SEPARATOR);
    out.push_str(key);
    out
}

/// Strict ancestors of `path`, nearest first. The root marker is not yielded.
///
/// # Example
///
/// ```
/// use pathstore_path::ancestors;
///
/// let all: Vec<&str> = ancestors("a.b.c").collect();
/// assert_eq!(all, vec!["a.b", "a"]);
/// ```
pub fn ancestors(path: &str) -> Ancestors<'_> {
    Ancestors { rest: path }
}

/// Iterator returned by [`ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.rest.rfind(SEPARATOR)?;
        self.rest = &self.rest[..idx];
        Some(self.rest)
    }
}
