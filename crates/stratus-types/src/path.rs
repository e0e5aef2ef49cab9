use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Path separator used by object store keys.
pub const SEPARATOR: char = '/';

/// Address of a bucket, a key prefix, or an object in an object store.
///
/// The string form is `/` for the root, `/<bucket>/` for a bucket, and
/// `/<bucket>/<key>` below it. Keys ending in `/` denote prefixes
/// (virtual directories).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourcePath {
    bucket: String,
    key: String,
}

impl ResourcePath {
    /// The store root, above all buckets.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn bucket(name: impl Into<String>) -> Self {
        Self {
            bucket: name.into(),
            key: String::new(),
        }
    }

    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket
    }

    /// Key below the bucket; empty for the root and for bucket paths.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_root(&self) -> bool {
        self.bucket.is_empty()
    }

    /// Returns `true` for the root, bucket paths, and keys ending in `/`.
    pub fn is_container(&self) -> bool {
        self.key.is_empty() || self.key.ends_with(SEPARATOR)
    }

    /// Last path segment, without a trailing separator.
    pub fn name(&self) -> &str {
        if self.is_root() {
            return "";
        }
        if self.key.is_empty() {
            return &self.bucket;
        }
        let trimmed = self.key.trim_end_matches(SEPARATOR);
        trimmed.rsplit(SEPARATOR).next().unwrap_or(trimmed)
    }

    /// Append a segment. The current path is treated as a directory.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            let (bucket, rest) = name.split_once(SEPARATOR).unwrap_or((name, ""));
            return Self::object(bucket, rest);
        }
        let mut key = self.key.clone();
        if !key.is_empty() && !key.ends_with(SEPARATOR) {
            key.push(SEPARATOR);
        }
        key.push_str(name);
        Self::object(self.bucket.clone(), key)
    }

    /// Parse `/bucket/key`. The leading separator is optional; the empty
    /// string and `/` both denote the root.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.strip_prefix(SEPARATOR).unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let (bucket, key) = trimmed.split_once(SEPARATOR).unwrap_or((trimmed, ""));
        if bucket.is_empty() {
            return Err(TypeError::invalid_path(s, "empty bucket name"));
        }
        if key.contains("//") {
            return Err(TypeError::invalid_path(s, "empty path segment"));
        }
        if std::iter::once(bucket)
            .chain(key.split(SEPARATOR))
            .any(is_relative_segment)
        {
            return Err(TypeError::invalid_path(s, "relative path segment"));
        }
        Ok(Self::object(bucket, key))
    }
}

/// Returns `true` for the `.` and `..` segments.
pub fn is_relative_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

impl FromStr for ResourcePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{SEPARATOR}");
        }
        if self.key.is_empty() {
            write!(f, "{SEPARATOR}{}{SEPARATOR}", self.bucket)
        } else {
            write!(f, "{SEPARATOR}{}{SEPARATOR}{}", self.bucket, self.key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_forms() {
        assert!(ResourcePath::parse("").unwrap().is_root());
        assert!(ResourcePath::parse("/").unwrap().is_root());
    }

    #[test]
    fn parse_bucket_with_and_without_slash() {
        let a = ResourcePath::parse("/photos").unwrap();
        let b = ResourcePath::parse("/photos/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bucket_name(), "photos");
        assert!(a.key().is_empty());
        assert!(a.is_container());
    }

    #[test]
    fn parse_object_key() {
        let p = ResourcePath::parse("/photos/2024/cat.jpg").unwrap();
        assert_eq!(p.bucket_name(), "photos");
        assert_eq!(p.key(), "2024/cat.jpg");
        assert!(!p.is_container());
        assert_eq!(p.name(), "cat.jpg");
    }

    #[test]
    fn parse_without_leading_separator() {
        let p: ResourcePath = "photos/2024/".parse().unwrap();
        assert_eq!(p.key(), "2024/");
        assert!(p.is_container());
        assert_eq!(p.name(), "2024");
    }

    #[test]
    fn parse_rejects_empty_bucket() {
        assert!(matches!(
            ResourcePath::parse("//x"),
            Err(TypeError::InvalidPath { .. })
        ));
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(ResourcePath::parse("/b/x//y").is_err());
    }

    #[test]
    fn parse_rejects_relative_segments() {
        for s in ["/../", "/./", "/b/../../", "/b/x/./y", "/b/.."] {
            assert!(
                matches!(ResourcePath::parse(s), Err(TypeError::InvalidPath { .. })),
                "{s} should be rejected"
            );
        }
    }

    #[test]
    fn parse_allows_dots_inside_names() {
        let p = ResourcePath::parse("/b/.hidden/..x/a.b").unwrap();
        assert_eq!(p.key(), ".hidden/..x/a.b");
    }

    #[test]
    fn display_forms() {
        assert_eq!(ResourcePath::root().to_string(), "/");
        assert_eq!(ResourcePath::bucket("b").to_string(), "/b/");
        assert_eq!(ResourcePath::object("b", "x/y").to_string(), "/b/x/y");
    }

    #[test]
    fn child_joins_segments() {
        let root = ResourcePath::root();
        assert_eq!(root.child("b"), ResourcePath::bucket("b"));
        let bucket = ResourcePath::bucket("b");
        assert_eq!(bucket.child("x"), ResourcePath::object("b", "x"));
        let dir = ResourcePath::object("b", "x/");
        assert_eq!(dir.child("f"), ResourcePath::object("b", "x/f"));
        let plain = ResourcePath::object("b", "x");
        assert_eq!(plain.child("f"), ResourcePath::object("b", "x/f"));
    }

    #[test]
    fn display_parse_agree() {
        for s in ["/", "/b/", "/b/x/", "/b/x/y.txt"] {
            assert_eq!(ResourcePath::parse(s).unwrap().to_string(), s);
        }
    }
}
