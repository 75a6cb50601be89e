use async_trait::async_trait;

use crate::types::{PageRequest, PageResult};

/// A paginated collection the list can scroll through.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Fetch one page. Failures are reported through `PageResult::error`.
    async fn fetch_page(&self, request: &PageRequest) -> PageResult;
}
