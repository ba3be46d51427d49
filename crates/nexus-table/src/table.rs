//! The table query engine.
//!
//! [`TableQuery`] owns a record set together with the state a table view
//! edits: search term, filters, sort, pagination window and row selection.
//! The visible page is never stored; it is derived on demand:
//!
//! ```text
//! records ─ search(debounced term) ─ filters (AND) ─ sort ─ page window
//! ```
//!
//! Every mutation emits a [`TableEvent`] to subscribed listeners.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::TableConfig;
use crate::debounce::{Debouncer, Scheduler};
use crate::error::Result;
use crate::export::{write_csv, write_plain, CsvColumn};
use crate::filter::{Filter, FilterValue};
use crate::op::FilterOp;
use crate::paging::Pagination;
use crate::record::Record;
use crate::search::Search;
use crate::selection::Selection;
use crate::sort::{sort_records, SortSpec};
use crate::source::RecordSource;
use crate::storage::{load_sort, save_sort, PreferenceStore};

/// A change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// The raw search term changed; the debounced term has not caught up yet.
    SearchChanged(String),
    /// The debounced search term settled to a new value.
    SearchSettled(String),
    /// A filter was added or removed.
    FiltersChanged,
    /// The sort changed (`None` when cleared).
    SortChanged(Option<SortSpec>),
    /// The page or page size changed.
    PageChanged { page: usize, page_size: usize },
    /// The selection changed.
    SelectionChanged,
    /// Records were removed.
    RecordsChanged { removed: usize },
}

/// Handle returned by [`TableQuery::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&TableEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// Shared so the debounce timer can notify from its own thread.
#[derive(Clone, Default)]
struct Registry {
    inner: Arc<Mutex<Listeners>>,
}

impl Registry {
    fn add(&self, listener: Listener) -> SubscriptionId {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, listener));
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|(entry, _)| *entry != id);
        inner.entries.len() != before
    }

    fn emit(&self, event: TableEvent) {
        // Snapshot first so a listener may subscribe or unsubscribe
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

/// Client-side query engine over an in-memory record set.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use nexus_table::{
///     mock_users, FilterOp, ManualScheduler, MemoryStore, TableConfig, TableQuery,
/// };
///
/// let clock = ManualScheduler::new();
/// let mut table = TableQuery::new(
///     mock_users(100),
///     TableConfig::default(),
///     Arc::new(MemoryStore::new()),
///     Arc::new(clock.clone()),
/// );
///
/// table.add_filter("role", FilterOp::Equals, "admin");
/// table.set_sort("name");
/// assert_eq!(table.total(), 25);
/// assert_eq!(table.visible().len(), 10);
///
/// table.set_search_term("user 1");
/// clock.advance(Duration::from_millis(300));
/// assert_eq!(table.debounced_search_term(), "user 1");
/// ```
pub struct TableQuery<R> {
    records: Vec<R>,
    config: TableConfig,
    search: Search,
    search_term: String,
    debounced: Debouncer<String>,
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
    pagination: Pagination,
    selection: Selection,
    store: Arc<dyn PreferenceStore>,
    columns: Vec<CsvColumn<R>>,
    listeners: Registry,
}

impl<R: Record> TableQuery<R> {
    /// Starts a session over `records`.
    ///
    /// The sort persisted under [`TableConfig::sort_storage_key`] is read
    /// back here; an absent or unreadable preference means no sort.
    pub fn new(
        records: Vec<R>,
        config: TableConfig,
        store: Arc<dyn PreferenceStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let listeners = Registry::default();
        let notify = listeners.clone();
        let debounced = Debouncer::new(String::new(), config.debounce(), scheduler)
            .on_settle(move |term: &String| {
                tracing::debug!(term = %term, "search term settled");
                notify.emit(TableEvent::SearchSettled(term.clone()));
            });

        let sort = load_sort(store.as_ref(), &config.sort_storage_key);
        if let Some(spec) = &sort {
            tracing::debug!(field = %spec.field, direction = %spec.direction, "restored sort");
        }

        TableQuery {
            search: Search::new(config.search_fields.iter().cloned()),
            pagination: Pagination::new(config.page_size),
            records,
            config,
            search_term: String::new(),
            debounced,
            filters: Vec::new(),
            sort,
            selection: Selection::new(),
            store,
            columns: Vec::new(),
            listeners,
        }
    }

    /// Starts a session over the snapshot fetched from `source`.
    pub fn from_source(
        source: &dyn RecordSource<R>,
        config: TableConfig,
        store: Arc<dyn PreferenceStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        let records = source.fetch()?;
        tracing::debug!(count = records.len(), "loaded records");
        Ok(Self::new(records, config, store, scheduler))
    }

    /// Sets the columns [`TableQuery::export_csv`] writes.
    pub fn with_csv_columns(mut self, columns: Vec<CsvColumn<R>>) -> Self {
        self.columns = columns;
        self
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Updates the raw search term.
    ///
    /// The term that filters rows follows after the debounce delay; another
    /// call inside the delay restarts it.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.search_term {
            return;
        }
        self.search_term = term.clone();
        self.debounced.push(term.clone());
        self.listeners.emit(TableEvent::SearchChanged(term));
    }

    /// The raw search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The settled search term the pipeline filters by.
    pub fn debounced_search_term(&self) -> String {
        self.debounced.settled()
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Appends a filter. Fields are not validated; an unknown field matches
    /// nothing.
    pub fn add_filter(&mut self, field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) {
        let filter = Filter::new(field, op, value);
        tracing::debug!(filter = %filter, "adding filter");
        self.filters.push(filter);
        self.listeners.emit(TableEvent::FiltersChanged);
    }

    /// Removes the filter at `index`. Out-of-range indexes are ignored.
    pub fn remove_filter(&mut self, index: usize) {
        if index >= self.filters.len() {
            tracing::debug!(index, len = self.filters.len(), "ignoring filter removal out of range");
            return;
        }
        let removed = self.filters.remove(index);
        tracing::debug!(filter = %removed, "removed filter");
        self.listeners.emit(TableEvent::FiltersChanged);
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear();
        self.listeners.emit(TableEvent::FiltersChanged);
    }

    /// Active filters in insertion order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    // ========================================================================
    // Sort
    // ========================================================================

    /// Column-header click: sorts by `field` ascending, or flips the
    /// direction if `field` is already the sort key. The result is persisted.
    pub fn set_sort(&mut self, field: &str) {
        let spec = SortSpec::toggle(self.sort.as_ref(), field);
        tracing::debug!(field = %spec.field, direction = %spec.direction, "sorting");
        save_sort(self.store.as_ref(), &self.config.sort_storage_key, Some(&spec));
        self.sort = Some(spec.clone());
        self.listeners.emit(TableEvent::SortChanged(Some(spec)));
    }

    /// Drops the sort and its persisted preference, restoring record order.
    pub fn clear_sort(&mut self) {
        if self.sort.take().is_none() {
            return;
        }
        save_sort(self.store.as_ref(), &self.config.sort_storage_key, None);
        self.listeners.emit(TableEvent::SortChanged(None));
    }

    /// The active sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Moves to `page`. Not clamped: a page past the end shows no rows.
    pub fn set_page(&mut self, page: usize) {
        self.pagination.page = page;
        self.emit_page();
    }

    /// Changes the page size and returns to the first page.
    ///
    /// A size of zero is ignored.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            tracing::warn!("ignoring page size of zero");
            return;
        }
        self.pagination = Pagination::new(page_size);
        self.emit_page();
    }

    fn emit_page(&self) {
        self.listeners.emit(TableEvent::PageChanged {
            page: self.pagination.page,
            page_size: self.pagination.page_size,
        });
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.pagination.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.pagination.page_size
    }

    /// Page sizes offered to the user.
    pub fn page_size_options(&self) -> &[usize] {
        &self.config.page_size_options
    }

    /// Number of rows matching search and filters, across all pages.
    pub fn total(&self) -> usize {
        self.derive_filtered().len()
    }

    /// Number of pages at the current page size.
    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.total())
    }

    // ========================================================================
    // Derivations
    // ========================================================================

    /// Records matching the debounced search term and every filter, in
    /// record order.
    pub fn derive_filtered(&self) -> Vec<&R> {
        let needle = self.debounced.settled().to_lowercase();
        let rows: Vec<&R> = self
            .records
            .iter()
            .filter(|r| needle.is_empty() || self.search.matches_lowered(*r, &needle))
            .filter(|r| {
                self.filters
                    .iter()
                    .all(|f| f.matches(r.field_value(&f.field).as_ref()))
            })
            .collect();
        tracing::debug!(
            matched = rows.len(),
            total = self.records.len(),
            filters = self.filters.len(),
            "filtered records"
        );
        rows
    }

    /// Orders `rows` by the active sort; without one the order is kept.
    pub fn derive_sorted<'a>(&self, mut rows: Vec<&'a R>) -> Vec<&'a R> {
        if let Some(spec) = &self.sort {
            sort_records(&mut rows, spec);
        }
        rows
    }

    /// The current page window of `rows`.
    pub fn derive_page<'a>(&self, rows: &[&'a R]) -> Vec<&'a R> {
        self.pagination.slice(rows).to_vec()
    }

    /// The rows on the current page.
    pub fn visible(&self) -> Vec<&R> {
        let sorted = self.derive_sorted(self.derive_filtered());
        self.derive_page(&sorted)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Header checkbox.
    ///
    /// Checking selects exactly the rows on the current page, replacing any
    /// earlier selection. Unchecking clears the whole selection, including
    /// ids from other pages.
    pub fn toggle_select_all(&mut self, checked: bool) {
        if checked {
            let ids: Vec<String> = self.visible().iter().map(|r| r.id().to_string()).collect();
            self.selection.replace_with(ids);
        } else {
            self.selection.clear();
        }
        tracing::debug!(checked, selected = self.selection.len(), "toggled select all");
        self.listeners.emit(TableEvent::SelectionChanged);
    }

    /// Row checkbox.
    pub fn toggle_select(&mut self, id: &str, checked: bool) {
        let changed = if checked {
            self.selection.insert(id)
        } else {
            self.selection.remove(id)
        };
        if changed {
            self.listeners.emit(TableEvent::SelectionChanged);
        }
    }

    /// Selected ids in selection order.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns `true` if `id` is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Header checkbox state: as many ids selected as rows on the page, and
    /// the page is not empty.
    pub fn all_visible_selected(&self) -> bool {
        let visible = self.visible().len();
        visible > 0 && self.selection.len() == visible
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// The full record set in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Deletes every selected record and clears the selection.
    ///
    /// The page is left alone even if it is now past the end. Returns the
    /// number of records removed.
    pub fn bulk_delete(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }

        let selected: HashSet<String> = self.selection.iter().map(str::to_owned).collect();
        let before = self.records.len();
        self.records.retain(|r| !selected.contains(r.id()));
        let removed = before - self.records.len();
        self.selection.clear();

        tracing::debug!(removed, remaining = self.records.len(), "bulk delete");
        self.listeners.emit(TableEvent::RecordsChanged { removed });
        self.listeners.emit(TableEvent::SelectionChanged);
        removed
    }

    /// Deletes the record with `id`, returning it. Other selected ids stay
    /// selected.
    pub fn delete_record(&mut self, id: &str) -> Option<R> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        let record = self.records.remove(index);
        tracing::debug!(id, "deleted record");
        self.listeners.emit(TableEvent::RecordsChanged { removed: 1 });
        if self.selection.remove(id) {
            self.listeners.emit(TableEvent::SelectionChanged);
        }
        Some(record)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Renders every filtered and sorted row (not just the current page) as
    /// CSV, header first.
    pub fn export_csv(&self) -> String {
        let rows = self.derive_sorted(self.derive_filtered());
        let csv_config = &self.config.csv;
        match write_csv(&rows, &self.columns, csv_config) {
            Ok(text) => {
                tracing::debug!(rows = rows.len(), style = ?csv_config.style, "exported csv");
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "csv writer failed, falling back to plain output");
                write_plain(&rows, &self.columns, csv_config)
            }
        }
    }

    /// Suggested file name for an export.
    pub fn export_filename(&self) -> &str {
        &self.config.csv.filename
    }

    // ========================================================================
    // Observers and teardown
    // ========================================================================

    /// Registers `listener` for every [`TableEvent`].
    ///
    /// [`TableEvent::SearchSettled`] is delivered on the scheduler's thread.
    pub fn subscribe(&self, listener: impl Fn(&TableEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.listeners.add(Arc::new(listener))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// The session configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Ends the session: a pending search update is dropped and later search
    /// input is no longer debounced.
    pub fn close(&mut self) {
        self.debounced.close();
        tracing::debug!("table closed");
    }

    /// Returns `true` once [`TableQuery::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.debounced.is_closed()
    }
}

impl<R> fmt::Debug for TableQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableQuery")
            .field("records", &self.records.len())
            .field("search_term", &self.search_term)
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
