use crate::error::ListingResult;
use crate::request::{ContainerOutcome, ListRequest, PageOutcome};

/// Remote listing endpoint.
///
/// Implementations report an aborted call through the `Aborted` outcome and
/// reserve `Err` for real failures.
pub trait PageSource {
    /// List all top-level containers in one page.
    fn list_containers(&self) -> ListingResult<ContainerOutcome>;

    /// Fetch one page of a delimited object listing.
    fn fetch_page(&self, request: &ListRequest) -> ListingResult<PageOutcome>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn list_containers(&self) -> ListingResult<ContainerOutcome> {
        (**self).list_containers()
    }

    fn fetch_page(&self, request: &ListRequest) -> ListingResult<PageOutcome> {
        (**self).fetch_page(request)
    }
}
