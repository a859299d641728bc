//! Client-side list view: search → sort → paginate over an in-memory set of rows.
//!
//! The full record set is never mutated by searching or sorting; every read
//! recomputes the visible rows from it. Server-backed paging lives in `remote`.

pub mod pagination;
pub mod remote;
pub mod sort;

pub use pagination::{PageWindow, Pagination};
pub use sort::{SortDirection, SortKey, SortSpec};

/// A row that can be shown in a `ListView`.
pub trait TableRow {
    /// Closed set of sortable columns for this row type.
    type Field: Copy + PartialEq;

    fn sort_key(&self, field: Self::Field) -> SortKey<'_>;

    /// The fixed subset of fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;
}

type RowFilter<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

pub struct ListView<R: TableRow> {
    records: Vec<R>,
    search_term: String,
    sort: Option<SortSpec<R::Field>>,
    filter: Option<RowFilter<R>>,
    pagination: Pagination,
}

/// The rows visible on the current page plus what the pager needs to render.
#[derive(Debug)]
pub struct Page<'a, R> {
    pub rows: Vec<&'a R>,
    pub current_page: usize,
    pub total_pages: usize,
    pub window: PageWindow,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<R> Page<'_, R> {
    /// True when nothing matches; callers show a "no records" state instead of an empty table.
    pub fn is_empty(&self) -> bool {
        self.window.total == 0
    }
}

impl<R: TableRow> ListView<R> {
    pub fn new(records: Vec<R>, page_size: usize) -> Self {
        Self {
            records,
            search_term: String::new(),
            sort: None,
            filter: None,
            pagination: Pagination::new(page_size),
        }
    }

    pub fn with_sort(mut self, spec: SortSpec<R::Field>) -> Self {
        self.sort = Some(spec);
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_spec(&self) -> Option<SortSpec<R::Field>> {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.pagination.clamp(self.pagination.current_page(), self.filtered_len())
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
        self.pagination.reset();
    }

    /// Header click on `field`.
    pub fn set_sort(&mut self, field: R::Field) -> SortSpec<R::Field> {
        let spec = SortSpec::toggled(self.sort, field);
        self.sort = Some(spec);
        spec
    }

    /// Adds a predicate on top of the search term (status dropdowns and the like).
    pub fn set_filter(&mut self, filter: impl Fn(&R) -> bool + Send + Sync + 'static) {
        self.filter = Some(Box::new(filter));
        self.pagination.reset();
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.pagination.reset();
    }

    pub fn go_to_page(&mut self, page: usize) -> usize {
        let total = self.filtered_len();
        self.pagination.go_to(page, total)
    }

    pub fn next_page(&mut self) -> usize {
        let page = self.current_page() + 1;
        self.go_to_page(page)
    }

    pub fn prev_page(&mut self) -> usize {
        let page = self.current_page().saturating_sub(1);
        self.go_to_page(page)
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.filtered_len())
    }

    /// Swaps in a freshly fetched set. The cursor is kept and clamped on read.
    pub fn replace_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    /// Drops rows after the server confirmed their deletion. Returns how many were removed.
    pub fn remove_where(&mut self, pred: impl Fn(&R) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !pred(r));
        let total = self.filtered_len();
        self.pagination.go_to(self.pagination.current_page(), total);
        before - self.records.len()
    }

    /// Search + extra filter + sort, without pagination.
    pub fn filtered(&self) -> Vec<&R> {
        let needle = self.search_term.to_lowercase();
        let mut rows: Vec<&R> = self
            .records
            .iter()
            .filter(|r| matches_search(*r, &needle))
            .filter(|r| self.filter.as_ref().map_or(true, |f| f(*r)))
            .collect();

        if let Some(spec) = self.sort {
            rows.sort_by(|a, b| {
                spec.direction
                    .apply(a.sort_key(spec.field).compare(&b.sort_key(spec.field)))
            });
        }
        rows
    }

    pub fn filtered_len(&self) -> usize {
        let needle = self.search_term.to_lowercase();
        self.records
            .iter()
            .filter(|r| matches_search(*r, &needle))
            .filter(|r| self.filter.as_ref().map_or(true, |f| f(*r)))
            .count()
    }

    pub fn page(&self) -> Page<'_, R> {
        let rows = self.filtered();
        let total = rows.len();
        let range = self.pagination.range(total);
        let window = self.pagination.window(total);
        let current_page = self.pagination.clamp(self.pagination.current_page(), total);
        Page {
            rows: rows[range].to_vec(),
            current_page,
            total_pages: self.pagination.total_pages(total),
            window,
            has_prev: self.pagination.has_prev(total),
            has_next: self.pagination.has_next(total),
        }
    }

    pub fn visible(&self) -> Vec<&R> {
        self.page().rows
    }
}

fn matches_search<R: TableRow>(row: &R, needle: &str) -> bool {
    needle.is_empty()
        || row
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}
