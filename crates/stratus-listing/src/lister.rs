use std::collections::VecDeque;

use stratus_types::{ListingScope, PageToken, ResourceDescriptor};
use tracing::debug;

use crate::cache::AttributeCache;
use crate::error::{ListingError, ListingResult};
use crate::filter::{AcceptAll, DescriptorFilter};
use crate::request::{ContainerOutcome, ListRequest, PageOutcome};
use crate::traits::PageSource;

/// Traversal state.
#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    /// Nothing fetched yet.
    Start,
    /// The current page is buffered; the token fetches the next one.
    Paging(PageToken),
    Done,
}

/// Lazy, forward-only listing of one scope.
///
/// A [`ListingScope::Root`] traversal issues a single "list containers" call
/// and yields one descriptor per bucket. A [`ListingScope::Container`]
/// traversal issues delimited "list objects" calls, yielding the objects of
/// each page followed by its common prefixes, and follows continuation
/// tokens one page at a time as the consumer asks for more.
///
/// An aborted call ends the traversal without an error. Any other failure is
/// yielded once, after which the lister is exhausted. A finished lister
/// cannot be restarted; build a new one for the same scope instead.
pub struct Lister<S, F = AcceptAll> {
    source: S,
    scope: ListingScope,
    filter: F,
    cache: Option<AttributeCache>,
    state: State,
    page: VecDeque<ResourceDescriptor>,
    peeked: Option<ResourceDescriptor>,
    pages_fetched: usize,
}

impl<S: PageSource> Lister<S, AcceptAll> {
    pub fn new(source: S, scope: ListingScope) -> ListingResult<Self> {
        Self::with_filter(source, scope, AcceptAll)
    }
}

impl<S: PageSource, F: DescriptorFilter> Lister<S, F> {
    pub fn with_filter(source: S, scope: ListingScope, filter: F) -> ListingResult<Self> {
        if let ListingScope::Container(path) = &scope {
            if path.is_root() {
                return Err(ListingError::InvalidScope(
                    "container scope needs a bucket".into(),
                ));
            }
        }
        Ok(Self {
            source,
            scope,
            filter,
            cache: None,
            state: State::Start,
            page: VecDeque::new(),
            peeked: None,
            pages_fetched: 0,
        })
    }

    /// Record every descriptor built during the traversal in `cache`.
    pub fn with_cache(mut self, cache: AttributeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn scope(&self) -> &ListingScope {
        &self.scope
    }

    /// Number of remote calls that returned a page.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Returns `true` if another accepted descriptor is available, fetching
    /// pages as needed.
    pub fn has_next(&mut self) -> ListingResult<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        match self.advance() {
            Some(Ok(descriptor)) => {
                self.peeked = Some(descriptor);
                Ok(true)
            }
            Some(Err(e)) => Err(e),
            None => Ok(false),
        }
    }

    fn advance(&mut self) -> Option<ListingResult<ResourceDescriptor>> {
        loop {
            while let Some(descriptor) = self.page.pop_front() {
                if self.filter.accept(&descriptor) {
                    return Some(Ok(descriptor));
                }
            }
            match self.load_next_page() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Fetch the next page into the buffer. Returns `false` once done.
    fn load_next_page(&mut self) -> ListingResult<bool> {
        let token = match std::mem::replace(&mut self.state, State::Done) {
            State::Done => return Ok(false),
            State::Start => None,
            State::Paging(token) => Some(token),
        };
        match self.scope.clone() {
            ListingScope::Root => self.load_containers(),
            ListingScope::Container(path) => {
                let request = ListRequest::for_container(&path).with_token(token);
                self.load_objects(&request)
            }
        }
    }

    fn load_containers(&mut self) -> ListingResult<bool> {
        match self.source.list_containers()? {
            ContainerOutcome::Aborted => {
                debug!("container listing aborted");
                Ok(false)
            }
            ContainerOutcome::Containers(containers) => {
                self.pages_fetched += 1;
                debug!(containers = containers.len(), "containers listed");
                for container in containers {
                    self.buffer(ResourceDescriptor::container(container.name, container.created));
                }
                Ok(true)
            }
        }
    }

    fn load_objects(&mut self, request: &ListRequest) -> ListingResult<bool> {
        match self.source.fetch_page(request)? {
            PageOutcome::Aborted => {
                debug!(bucket = %request.bucket, prefix = %request.prefix, "object listing aborted");
                Ok(false)
            }
            PageOutcome::Page(page) => {
                self.pages_fetched += 1;
                debug!(
                    bucket = %request.bucket,
                    prefix = %request.prefix,
                    page = self.pages_fetched,
                    entries = page.entries.len(),
                    prefixes = page.common_prefixes.len(),
                    more = page.next_token.is_some(),
                    "object page fetched"
                );
                for entry in page.entries {
                    self.buffer(ResourceDescriptor::object(
                        request.bucket.as_str(),
                        entry.key,
                        entry.size,
                        entry.last_modified,
                    ));
                }
                for prefix in page.common_prefixes {
                    self.buffer(ResourceDescriptor::prefix(request.bucket.as_str(), prefix));
                }
                if let Some(next) = page.next_token {
                    self.state = State::Paging(next);
                }
                Ok(true)
            }
        }
    }

    fn buffer(&mut self, descriptor: ResourceDescriptor) {
        if let Some(cache) = &self.cache {
            cache.insert(descriptor.clone());
        }
        self.page.push_back(descriptor);
    }
}

impl<S: PageSource, F: DescriptorFilter> Iterator for Lister<S, F> {
    type Item = ListingResult<ResourceDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(descriptor) = self.peeked.take() {
            return Some(Ok(descriptor));
        }
        self.advance()
    }
}

/// List `scope` through `source`, yielding descriptors accepted by `filter`.
pub fn list<S, F>(source: S, scope: ListingScope, filter: F) -> ListingResult<Lister<S, F>>
where
    S: PageSource,
    F: DescriptorFilter,
{
    Lister::with_filter(source, scope, filter)
}
