//! Lazy, paginated listing of object store buckets and prefixes.
//!
//! A [`Lister`] walks one [`ListingScope`](stratus_types::ListingScope):
//!
//! - **Root**: a single "list containers" call, one descriptor per bucket.
//! - **Container**: delimited "list objects" calls below a bucket or prefix.
//!   Each page yields its objects first, then its common prefixes, and the
//!   next page is only fetched once the current one is consumed.
//!
//! The remote endpoint is injected through [`PageSource`]. Two sources ship
//! with the crate: [`InMemoryObjectSource`] for tests and [`LocalDirSource`],
//! which presents a directory tree as buckets and keys.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod lister;
pub mod local;
pub mod memory;
pub mod paginate;
pub mod request;
pub mod traits;

pub use cache::AttributeCache;
pub use config::{ListerConfig, DEFAULT_PAGE_SIZE};
pub use error::{ListingError, ListingResult};
pub use filter::{AcceptAll, ContainersOnly, DescriptorFilter, ObjectsOnly};
pub use lister::{list, Lister};
pub use local::LocalDirSource;
pub use memory::{InMemoryObjectSource, ScriptedFetch};
pub use paginate::paginate;
pub use request::{
    ContainerEntry, ContainerOutcome, ListRequest, ObjectEntry, ObjectPage, PageOutcome,
};
pub use traits::PageSource;
