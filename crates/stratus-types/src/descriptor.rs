use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::ResourcePath;

/// The UNIX epoch, used as the modification time of virtual prefixes.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// What a listing traversal enumerates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingScope {
    /// All top-level containers (buckets).
    Root,
    /// Objects and sub-prefixes directly below a container path.
    Container(ResourcePath),
}

impl ListingScope {
    /// Root scope for the root path, container scope otherwise.
    pub fn from_path(path: ResourcePath) -> Self {
        if path.is_root() {
            Self::Root
        } else {
            Self::Container(path)
        }
    }

    pub fn path(&self) -> ResourcePath {
        match self {
            Self::Root => ResourcePath::root(),
            Self::Container(path) => path.clone(),
        }
    }
}

/// Opaque continuation cursor returned by a paged listing call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One listed resource: a bucket, a virtual prefix, or an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub path: ResourcePath,
    pub is_container: bool,
    /// Size in bytes; zero for containers.
    pub size: i64,
    pub last_modified: DateTime<Utc>,
}

impl ResourceDescriptor {
    /// A bucket. Buckets carry their creation date when the store reports one.
    pub fn container(name: impl Into<String>, created: Option<DateTime<Utc>>) -> Self {
        Self {
            path: ResourcePath::bucket(name),
            is_container: true,
            size: 0,
            last_modified: created.unwrap_or_else(epoch),
        }
    }

    /// A common prefix returned by a delimited listing.
    pub fn prefix(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            path: ResourcePath::object(bucket, prefix),
            is_container: true,
            size: 0,
            last_modified: epoch(),
        }
    }

    /// A stored object. Directory markers (keys ending in `/`) are containers.
    pub fn object(
        bucket: impl Into<String>,
        key: impl Into<String>,
        size: i64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let path = ResourcePath::object(bucket, key);
        Self {
            is_container: path.is_container(),
            path,
            size,
            last_modified,
        }
    }
}
