//! Path model
//!
//! [`VPath`] is an immutable, absolute, slash-delimited path. Every backend
//! speaks in `VPath`s; whether a path names a file or a directory is only
//! known from backend responses.
//!
//! [`ObjectAddress`] is the (bucket, key) pair an object store derives from a
//! path's first segment and remainder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Path separator
pub const SEPARATOR: char = '/';

/// Normalized absolute path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VPath {
    // Always starts with '/', never ends with '/' unless it is the root
    repr: String,
}

impl VPath {
    /// The root path `/`
    pub fn root() -> Self {
        Self {
            repr: SEPARATOR.to_string(),
        }
    }

    /// Parse and normalize a path
    ///
    /// Repeated separators collapse, `.` segments are dropped and `..` pops a
    /// segment (never above the root). Relative input is rooted.
    pub fn parse(s: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in s.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self::from_segments(segments)
    }

    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut repr = String::new();
        for segment in segments {
            repr.push(SEPARATOR);
            repr.push_str(segment);
        }
        if repr.is_empty() {
            repr.push(SEPARATOR);
        }
        Self { repr }
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.repr.len() == 1
    }

    /// String form, always with a leading separator
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    /// String form without the leading separator (empty for the root)
    pub fn relative(&self) -> &str {
        &self.repr[1..]
    }

    /// Path segments, root has none
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative().split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.repr.rsplit(SEPARATOR).next()
        }
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<VPath> {
        if self.is_root() {
            return None;
        }
        let idx = self.repr.rfind(SEPARATOR).unwrap_or(0);
        if idx == 0 {
            Some(Self::root())
        } else {
            Some(Self {
                repr: self.repr[..idx].to_string(),
            })
        }
    }

    /// Child path composition (`dir / name`)
    ///
    /// `name` may itself contain separators; the result is normalized.
    pub fn join(&self, name: &str) -> VPath {
        Self::parse(&format!("{}{}{}", self.repr, SEPARATOR, name))
    }

    /// String-representation prefix test
    pub fn starts_with_str(&self, prefix: &str) -> bool {
        self.repr.starts_with(prefix)
    }

    /// Segment-wise prefix test
    pub fn starts_with(&self, base: &VPath) -> bool {
        base.is_root()
            || self.repr == base.repr
            || (self.repr.starts_with(&base.repr)
                && self.repr[base.repr.len()..].starts_with(SEPARATOR))
    }

    /// Remainder of this path below `base`, without a leading separator
    pub fn strip_prefix(&self, base: &VPath) -> Option<&str> {
        if !self.starts_with(base) {
            return None;
        }
        if base.is_root() {
            Some(self.relative())
        } else {
            Some(self.repr[base.repr.len()..].trim_start_matches(SEPARATOR))
        }
    }
}

impl Default for VPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for VPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl From<&str> for VPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl TryFrom<String> for VPath {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Ok(Self::parse(&s))
    }
}

impl From<VPath> for String {
    fn from(p: VPath) -> Self {
        p.repr
    }
}

impl std::ops::Div<&str> for &VPath {
    type Output = VPath;

    fn div(self, name: &str) -> VPath {
        self.join(name)
    }
}

/// Bucket and optional object key addressed by a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAddress {
    pub bucket: String,
    pub key: Option<String>,
}

impl ObjectAddress {
    /// Split a path into (bucket, key)
    ///
    /// The leading separator is stripped and the remainder split on the first
    /// separator: part 0 is the bucket, part 1 (if non-empty) the key. The
    /// root has no bucket and is rejected.
    pub fn split(path: &VPath) -> Result<Self> {
        let mut parts = path.relative().splitn(2, SEPARATOR);
        let bucket = match parts.next() {
            Some(b) if !b.is_empty() => b.to_string(),
            _ => {
                return Err(Error::InvalidPath(format!(
                    "'{path}' does not address a bucket"
                )));
            }
        };
        let key = parts.next().filter(|k| !k.is_empty()).map(str::to_string);
        Ok(Self { bucket, key })
    }

    /// Key, or an error naming the path when the address is bucket-only
    pub fn require_key(&self) -> Result<&str> {
        self.key.as_deref().ok_or_else(|| {
            Error::InvalidPath(format!(
                "'/{}' addresses a bucket, not an object",
                self.bucket
            ))
        })
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}/{}", self.bucket, key),
            None => write!(f, "{}", self.bucket),
        }
    }
}
