//! Paginated popup state.
//!
//! A popup exists only between `open` and drop; opening with no content is
//! rejected before any state is created. Navigation wraps in both
//! directions. Pagination affordances are only warranted when there is more
//! than one page; [`Popup::has_pagination`] tells the renderer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeoFieldError, GeoFieldResult};

/// An open popup: ordered content pages plus the current page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pages: Vec<String>,
    page: usize,
}

impl Popup {
    /// Open a popup on the first of the given pages.
    ///
    /// Fails with [`GeoFieldError::EmptyContent`] when `pages` is empty.
    pub fn open(pages: Vec<String>) -> GeoFieldResult<Self> {
        if pages.is_empty() {
            return Err(GeoFieldError::EmptyContent);
        }
        debug!("opened popup with {} page(s)", pages.len());
        Ok(Self { pages, page: 0 })
    }

    /// Advance to the next page, wrapping from last to first.
    pub fn next(&mut self) -> usize {
        self.page = (self.page + 1) % self.pages.len();
        self.page
    }

    /// Step back to the previous page, wrapping from first to last.
    pub fn previous(&mut self) -> usize {
        self.page = (self.page + self.pages.len() - 1) % self.pages.len();
        self.page
    }

    /// The content of the current page.
    pub fn current_content(&self) -> &str {
        &self.pages[self.page]
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Total number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether navigation controls should be shown.
    pub fn has_pagination(&self) -> bool {
        self.pages.len() > 1
    }

    /// Human-readable position label, e.g. `"1 of 3"`.
    pub fn page_label(&self, separator: &str) -> String {
        format!("{}{}{}", self.page + 1, separator, self.pages.len())
    }
}
