//! Dot-and-bracket field paths.
//!
//! Two renderings share the same grammar:
//!
//! - flat paths produced by flattening (`a.b[0].c`, no root marker), and
//! - normalized query paths produced by the diff engine (`$.a.b[0].c`).
//!
//! Tolerance is granted by the terminal segment of a path, which is the text
//! after its last `.`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root marker of a normalized path.
pub const ROOT: &str = "$";

/// One step in a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// An object member.
    Key(String),
    /// An array element.
    Index(usize),
}

/// A normalized path from the root of a tree, rendered as `$.a[0].b`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The path of the root node.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(Segment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    /// A copy of this path extended by `segment`.
    pub fn join(&self, segment: Segment) -> Self {
        let mut next = self.clone();
        next.segments.push(segment);
        next
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Extend `path` with an object member. An empty `path` yields the bare key.
pub fn child_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Extend `path` with an array index.
pub fn child_index(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// The text after the last `.` of `path` (the whole path if it has none).
pub fn terminal_segment(path: &str) -> &str {
    match path.rfind('.') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}
