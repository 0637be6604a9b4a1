//! State behind a list page: filters, debounced search, rows and the
//! server-supplied pagination.

use std::time::{Duration, Instant};

use shared::protocol::StudentPage;
use tracing::debug;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub total_records: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            limit: 10,
            total_records: 0,
        }
    }
}

impl Pagination {
    /// `(first, last, total)` for "Showing X to Y of Z".
    pub fn showing_range(&self) -> (u64, u64, u64) {
        if self.total_records == 0 {
            return (0, 0, 0);
        }
        let page = u64::from(self.current_page.max(1));
        let limit = u64::from(self.limit);
        let first = (page - 1) * limit + 1;
        let last = (page * limit).min(self.total_records);
        (first, last, self.total_records)
    }

    pub fn can_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<R> {
    pub rows: Vec<R>,
    pub pagination: Pagination,
}

impl<R> ListPage<R> {
    /// A whole collection returned in one response.
    pub fn unpaged(rows: Vec<R>) -> Self {
        let count = rows.len();
        Self {
            rows,
            pagination: Pagination {
                current_page: 1,
                total_pages: u32::from(count > 0),
                limit: u32::try_from(count).unwrap_or(u32::MAX),
                total_records: count as u64,
            },
        }
    }
}

impl From<StudentPage> for ListPage<shared::domain::Student> {
    fn from(page: StudentPage) -> Self {
        Self {
            pagination: Pagination {
                current_page: page.current_page,
                total_pages: page.total_pages,
                limit: page.limit,
                total_records: page.total_records_count,
            },
            rows: page.data,
        }
    }
}

/// One fetch to perform. Its generation must be handed back with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<F> {
    pub generation: u64,
    pub filter: F,
    pub search: String,
    pub page: u32,
}

impl<F> FetchTicket<F> {
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

#[derive(Debug, Clone)]
pub struct ListController<F, R> {
    filter: F,
    search_text: String,
    debounce_deadline: Option<Instant>,
    requested_search: String,
    page: u32,
    rows: Vec<R>,
    pagination: Pagination,
    loading: bool,
    last_error: Option<String>,
    issued: u64,
}

impl<F: Clone + PartialEq, R> ListController<F, R> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            search_text: String::new(),
            debounce_deadline: None,
            requested_search: String::new(),
            page: 1,
            rows: Vec::new(),
            pagination: Pagination::default(),
            loading: false,
            last_error: None,
            issued: 0,
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued
    }

    /// Records a keystroke and re-arms the debounce deadline.
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search_text = text.into();
        self.debounce_deadline = Some(now + SEARCH_DEBOUNCE);
    }

    pub fn search_pending(&self) -> bool {
        self.debounce_deadline.is_some()
    }

    /// Fires once the search box has been idle for the debounce window.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket<F>> {
        let deadline = self.debounce_deadline?;
        if now < deadline {
            return None;
        }
        self.debounce_deadline = None;
        if self.search_text.trim() == self.requested_search.trim() {
            return None;
        }
        self.page = 1;
        Some(self.issue())
    }

    /// Dropdown filters fetch immediately, folding in any pending search text.
    pub fn set_filter(&mut self, filter: F) -> Option<FetchTicket<F>> {
        if filter == self.filter && !self.search_pending() {
            return None;
        }
        self.filter = filter;
        self.page = 1;
        self.debounce_deadline = None;
        Some(self.issue())
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<FetchTicket<F>> {
        if page == 0 || page == self.pagination.current_page {
            return None;
        }
        if self.pagination.total_pages > 0 && page > self.pagination.total_pages {
            return None;
        }
        self.page = page;
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket<F>> {
        if !self.pagination.can_next() {
            return None;
        }
        self.go_to_page(self.pagination.current_page + 1)
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket<F>> {
        if !self.pagination.can_prev() {
            return None;
        }
        self.go_to_page(self.pagination.current_page - 1)
    }

    /// Re-fetch with the current filter, search and page.
    pub fn refresh(&mut self) -> FetchTicket<F> {
        self.debounce_deadline = None;
        self.issue()
    }

    /// Applies a fetch result unless a newer ticket has been issued since.
    /// Returns whether the result was applied.
    pub fn apply_response(
        &mut self,
        generation: u64,
        result: Result<ListPage<R>, String>,
    ) -> bool {
        if generation != self.issued {
            debug!(generation, latest = self.issued, "list: dropping stale response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page.rows;
                self.pagination = page.pagination;
                self.page = self.pagination.current_page.max(1);
                self.last_error = None;
            }
            Err(message) => {
                self.last_error = Some(message);
            }
        }
        true
    }

    fn issue(&mut self) -> FetchTicket<F> {
        self.issued += 1;
        self.loading = true;
        self.requested_search = self.search_text.clone();
        FetchTicket {
            generation: self.issued,
            filter: self.filter.clone(),
            search: self.search_text.trim().to_string(),
            page: self.page,
        }
    }
}
