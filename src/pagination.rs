use crate::types::{PageRequest, PageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    #[default]
    Scrollable,
    Loading,
}

/// Page counters plus the scroll gate that keeps one fetch in flight.
///
/// `current_page` never exceeds `total_pages`. `total_pages` is only
/// updated from successful results.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub state: ScrollState,
    rollback_page: u32,
    loaded: bool,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 0,
            page_size: page_size.max(1),
            total_pages: 0,
            state: ScrollState::Scrollable,
            rollback_page: 0,
            loaded: false,
        }
    }

    pub fn can_scroll(&self) -> bool {
        self.state == ScrollState::Scrollable
    }

    pub fn is_loading(&self) -> bool {
        self.state == ScrollState::Loading
    }

    /// The final page has been loaded and nothing is in flight.
    pub fn at_end(&self) -> bool {
        self.loaded && self.can_scroll() && self.current_page >= self.total_pages
    }

    /// Scroll event hook. Starts the next page only when the viewport is at
    /// the bottom and nothing is in flight.
    pub fn on_scroll(&mut self, at_bottom: bool) -> Option<PageRequest> {
        if self.can_scroll() && at_bottom {
            Some(self.next_page())
        } else {
            None
        }
    }

    pub fn next_page(&mut self) -> PageRequest {
        let page = if self.current_page >= self.total_pages {
            self.total_pages
        } else {
            self.current_page + 1
        };
        self.begin(page)
    }

    pub fn previous_page(&mut self) -> PageRequest {
        self.begin(self.current_page.saturating_sub(1))
    }

    /// Forget all progress and load page 0.
    pub fn restart(&mut self) -> PageRequest {
        self.current_page = 0;
        self.total_pages = 0;
        self.loaded = false;
        self.begin(0)
    }

    /// Settle the in-flight load. A failed page is rolled back so the next
    /// scroll asks for it again.
    pub fn finish(&mut self, result: &PageResult) {
        if result.is_ok() {
            self.total_pages = result.total / self.page_size;
            self.current_page = self.current_page.min(self.total_pages);
            self.loaded = true;
        } else {
            self.current_page = self.rollback_page;
        }
        self.state = ScrollState::Scrollable;
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page + 1, self.total_pages)
    }

    fn begin(&mut self, page: u32) -> PageRequest {
        self.rollback_page = self.current_page;
        self.current_page = page;
        self.state = ScrollState::Loading;
        PageRequest {
            page,
            offset: page * self.page_size,
            limit: self.page_size,
        }
    }
}
