use serde::Deserialize;

use crate::{
    schemas::{MovieListItem, MovieListResponse},
    validation::{Checker, ValidationError},
};

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 20;
/// Largest row offset the database drivers accept as a signed 64-bit bind.
const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// A validated, 1-indexed page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Result<Self, ValidationError> {
        let mut checker = Checker::new();
        if page < 1 {
            checker.push("page", "must be greater than or equal to 1");
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            checker.push("per_page", format!("must be between 1 and {MAX_PER_PAGE}"));
        } else if page >= 1 && (page - 1).checked_mul(per_page).is_none_or(|o| o > MAX_OFFSET) {
            checker.push("page", "is too large for the requested page size");
        }
        checker.finish(Self { page, per_page }).map(|v| v.into_inner())
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Rows skipped before this page. Never above `i64::MAX` for a constructed request.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl TryFrom<PageParams> for PageRequest {
    type Error = ValidationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        Self::new(params.page.unwrap_or(1), params.per_page.unwrap_or(DEFAULT_PER_PAGE))
    }
}

pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    total_items.div_ceil(per_page)
}

/// Page references are relative URLs the list endpoint understands.
pub fn page_ref(base_path: &str, page: u64, per_page: u64) -> String {
    format!("{base_path}?page={page}&per_page={per_page}")
}

impl MovieListResponse {
    pub fn new(
        movies: Vec<MovieListItem>,
        request: PageRequest,
        total_items: u64,
        base_path: &str,
    ) -> Self {
        let total_pages = total_pages(total_items, request.per_page);
        let prev_page = (request.page > 1)
            .then(|| page_ref(base_path, request.page - 1, request.per_page));
        let next_page = (request.page < total_pages)
            .then(|| page_ref(base_path, request.page + 1, request.per_page));

        Self { movies, prev_page, next_page, total_pages, total_items }
    }
}
