use serde::{Deserialize, Serialize};

/// Maximum keys per page, matching the object store default.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Configuration for local page sources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListerConfig {
    /// Maximum entries plus common prefixes per page. Zero is treated as 1.
    pub page_size: usize,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListerConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}
