use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{ListingError, ListingResult};
use crate::paginate::paginate;
use crate::request::{ContainerEntry, ContainerOutcome, ListRequest, ObjectEntry, PageOutcome};
use crate::traits::PageSource;

/// Scripted outcome for one call against an [`InMemoryObjectSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedFetch {
    Abort,
    /// Fail with a transport error carrying this message.
    Fail(String),
}

#[derive(Clone, Debug, Default)]
struct Bucket {
    created: Option<DateTime<Utc>>,
    objects: BTreeMap<String, ObjectEntry>,
}

/// In-memory object store for tests and embedding.
///
/// Calls (container listings and page fetches alike) are numbered from 1;
/// a scripted outcome can be attached to any call number.
#[derive(Debug)]
pub struct InMemoryObjectSource {
    buckets: BTreeMap<String, Bucket>,
    page_size: usize,
    script: Mutex<HashMap<usize, ScriptedFetch>>,
    calls: AtomicUsize,
}

impl InMemoryObjectSource {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            script: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Maximum entries plus common prefixes per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn add_bucket(&mut self, name: impl Into<String>, created: Option<DateTime<Utc>>) {
        self.buckets.entry(name.into()).or_default().created = created;
    }

    /// Store an object, creating the bucket if needed.
    pub fn put_object(
        &mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        size: i64,
        last_modified: DateTime<Utc>,
    ) {
        let key = key.into();
        self.buckets
            .entry(bucket.into())
            .or_default()
            .objects
            .insert(key.clone(), ObjectEntry::new(key, size, last_modified));
    }

    /// Attach an outcome to the `call`-th call (1-based).
    pub fn script(&self, call: usize, outcome: ScriptedFetch) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(call, outcome);
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Count the call and return its scripted outcome, if any.
    fn begin_call(&self) -> Option<ScriptedFetch> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&call)
    }
}

impl Default for InMemoryObjectSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for InMemoryObjectSource {
    fn list_containers(&self) -> ListingResult<ContainerOutcome> {
        match self.begin_call() {
            Some(ScriptedFetch::Abort) => return Ok(ContainerOutcome::Aborted),
            Some(ScriptedFetch::Fail(message)) => return Err(ListingError::transport(message)),
            None => {}
        }
        let containers = self
            .buckets
            .iter()
            .map(|(name, bucket)| ContainerEntry {
                name: name.clone(),
                created: bucket.created,
            })
            .collect();
        Ok(ContainerOutcome::Containers(containers))
    }

    fn fetch_page(&self, request: &ListRequest) -> ListingResult<PageOutcome> {
        match self.begin_call() {
            Some(ScriptedFetch::Abort) => return Ok(PageOutcome::Aborted),
            Some(ScriptedFetch::Fail(message)) => return Err(ListingError::transport(message)),
            None => {}
        }
        let bucket = self
            .buckets
            .get(&request.bucket)
            .ok_or_else(|| ListingError::ContainerMissing(request.bucket.clone()))?;
        Ok(PageOutcome::Page(paginate(
            bucket.objects.values(),
            request,
            self.page_size,
        )))
    }
}
