use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A single attribute value, serialized in DynamoDB JSON form
/// (`{"S": "text"}`, `{"N": "42"}`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    #[serde(rename = "S")]
    S(String),
    /// Number, kept in its textual form to avoid precision loss.
    #[serde(rename = "N")]
    N(String),
    /// Binary, base64-encoded.
    #[serde(rename = "B")]
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    /// Ordered list of values.
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// Nested map.
    #[serde(rename = "M")]
    M(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn string(s: impl Into<String>) -> Self {
        Self::S(s.into())
    }

    pub fn number(n: impl fmt::Display) -> Self {
        Self::N(n.to_string())
    }

    pub fn null() -> Self {
        Self::Null(true)
    }
}

/// An attribute map: one table row, or the key part of one.
pub type Item = BTreeMap<String, AttributeValue>;

/// Project `item` onto the given key attributes.
///
/// Fails if any key attribute is absent.
pub fn project_key(item: &Item, key_attributes: &[String]) -> Result<Item, TypeError> {
    key_attributes
        .iter()
        .map(|name| {
            item.get(name)
                .map(|v| (name.clone(), v.clone()))
                .ok_or_else(|| TypeError::MissingKeyAttribute(name.clone()))
        })
        .collect()
}

/// Stable textual form of an attribute map, usable as a lookup key.
///
/// `Item` is a `BTreeMap`, so attribute order is deterministic.
pub fn canonical_key(key: &Item) -> Result<String, TypeError> {
    serde_json::to_string(key).map_err(|e| TypeError::Serialization(e.to_string()))
}

/// Which kind of write a batch carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    Put,
    Delete,
}

impl WriteKind {
    /// Name under which the consumed capacity of a batch run is published.
    pub fn capacity_variable(&self) -> &'static str {
        match self {
            Self::Put => "batchPutConsumedCapacity",
            Self::Delete => "batchDeleteConsumedCapacity",
        }
    }
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put => f.write_str("put"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// One write operation inside a batch. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchItem {
    /// Insert or overwrite a full item.
    Put { item: Item },
    /// Remove the item with the given primary key.
    Delete { key: Item },
}

impl BatchItem {
    pub fn put(item: Item) -> Self {
        Self::Put { item }
    }

    pub fn delete(key: Item) -> Self {
        Self::Delete { key }
    }

    pub fn kind(&self) -> WriteKind {
        match self {
            Self::Put { .. } => WriteKind::Put,
            Self::Delete { .. } => WriteKind::Delete,
        }
    }

    /// The attribute map this operation carries (full item or key).
    pub fn attributes(&self) -> &Item {
        match self {
            Self::Put { item } => item,
            Self::Delete { key } => key,
        }
    }
}
