//! Foundation types for Stratus.
//!
//! This crate provides the value types shared by the batch executor and the
//! paginated lister. It performs no I/O.
//!
//! # Key Types
//!
//! - [`AttributeValue`] / [`Item`]: DynamoDB-JSON style attribute maps
//! - [`BatchItem`]: a single put or delete inside a write batch
//! - [`WriteKind`]: which kind of write a batch performs
//! - [`ResourcePath`]: `/<bucket>/<key>` addressing for object stores
//! - [`ListingScope`]: root (all buckets) or one container prefix
//! - [`ResourceDescriptor`]: one listed bucket, prefix, or object
//! - [`PageToken`]: opaque continuation cursor

pub mod descriptor;
pub mod error;
pub mod item;
pub mod path;

pub use descriptor::{epoch, ListingScope, PageToken, ResourceDescriptor};
pub use error::TypeError;
pub use item::{canonical_key, project_key, AttributeValue, BatchItem, Item, WriteKind};
pub use path::{is_relative_segment, ResourcePath, SEPARATOR};
