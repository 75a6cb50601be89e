/// One entry of the collection: a display name and the resource it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub url: String,
}

/// A single page fetch, already translated into API offset/limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub offset: u32,
    pub limit: u32,
}

/// Outcome of one page fetch. `error` is set instead of returning `Err`
/// so the list can keep going after a failed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<Item>,
    pub total: u32,
    pub offset: u32,
    pub limit: u32,
    pub error: Option<String>,
}

impl PageResult {
    pub fn failed(request: &PageRequest, error: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset: request.offset,
            limit: request.limit,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
