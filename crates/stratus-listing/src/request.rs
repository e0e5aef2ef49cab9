use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stratus_types::{PageToken, ResourcePath, SEPARATOR};

/// Parameters of one delimited "list objects" call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub bucket: String,
    /// Only keys starting with this prefix are listed.
    pub prefix: String,
    /// Keys are rolled up into common prefixes at the first delimiter after
    /// `prefix`. Empty disables roll-up.
    pub delimiter: String,
    /// Only keys strictly greater than this are listed. Empty for none.
    pub start_after: String,
    pub continuation_token: Option<PageToken>,
}

impl ListRequest {
    /// Request for the direct children of a container path.
    ///
    /// The prefix is the path's key, normalized to end with the separator,
    /// and listing starts after it so a directory marker object for the
    /// container itself is not returned.
    pub fn for_container(path: &ResourcePath) -> Self {
        let mut prefix = path.key().to_string();
        if !prefix.is_empty() && !prefix.ends_with(SEPARATOR) {
            prefix.push(SEPARATOR);
        }
        Self {
            bucket: path.bucket_name().to_string(),
            start_after: prefix.clone(),
            prefix,
            delimiter: SEPARATOR.to_string(),
            continuation_token: None,
        }
    }

    pub fn with_token(mut self, token: Option<PageToken>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// A bucket as reported by a "list containers" call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEntry {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

impl ContainerEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: None,
        }
    }
}

/// An object as reported by a "list objects" call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: DateTime<Utc>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: i64, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified,
        }
    }
}

/// One page of a delimited listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPage {
    pub entries: Vec<ObjectEntry>,
    pub common_prefixes: Vec<String>,
    /// Present when more pages follow.
    pub next_token: Option<PageToken>,
}

/// Result of a "list objects" call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    Page(ObjectPage),
    /// The call was aborted by the caller.
    Aborted,
}

/// Result of a "list containers" call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerOutcome {
    Containers(Vec<ContainerEntry>),
    Aborted,
}
