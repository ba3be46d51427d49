//! Nexus Table - client-side query engine for admin data tables.
//!
//! A [`TableQuery`] owns an in-memory record set plus the state a table view
//! edits, and derives the visible page from it:
//!
//! - Debounced free-text search over configured fields
//! - Field filters combined with AND
//! - A single sort key, persisted across sessions
//! - Pagination with a fixed page size
//! - Row selection, bulk delete and CSV export
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nexus_table::{
//!     mock_users, user_csv_columns, FilterOp, ManualScheduler, MemoryStore, TableConfig,
//!     TableQuery,
//! };
//!
//! let clock = ManualScheduler::new();
//! let mut table = TableQuery::new(
//!     mock_users(100),
//!     TableConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(clock.clone()),
//! )
//! .with_csv_columns(user_csv_columns());
//!
//! // Search applies once input has been quiet for 300ms
//! table.set_search_term("user 5");
//! clock.advance(Duration::from_millis(300));
//! assert_eq!(table.total(), 11);
//!
//! table.add_filter("status", FilterOp::Equals, "active");
//! table.set_sort("name");
//! assert_eq!(table.visible()[0].id, "user-5");
//!
//! let csv = table.export_csv();
//! assert!(csv.starts_with("Name,Email,Role,Status,Created,Last Login\n"));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! visible = page( sort( filters( search(records, debounced term) ) ) )
//! ```
//!
//! - **Search**: case-insensitive substring over the search fields; an empty
//!   term matches everything
//! - **Filters**: every filter must match; a filter on an unknown field
//!   matches nothing
//! - **Sort**: stable, nulls last in either direction
//! - **Page**: `[page * size, page * size + size)` clamped to the result
//!
//! # Operators
//!
//! | Operator | Meaning |
//! |----------|---------|
//! | `equals`, `not_equals` | Exact match on the raw value |
//! | `contains`, `not_contains`, `starts_with`, `ends_with` | Case-insensitive text match |
//! | `greater_than`, `less_than`, `greater_equal`, `less_equal` | Numbers, timestamps, text |
//! | `in`, `not_in` | Membership in a list |
//! | `is_null`, `is_not_null` | Presence |

mod config;
mod debounce;
mod error;
mod export;
mod filter;
mod op;
mod paging;
mod record;
mod search;
mod selection;
mod sort;
mod source;
mod storage;
mod table;
mod users;
mod value;

// Re-export public API
pub use config::{CsvConfig, CsvStyle, TableConfig};
#[cfg(feature = "tokio")]
pub use debounce::TokioScheduler;
pub use debounce::{CancelToken, Debouncer, ManualScheduler, Scheduler, Task, ThreadScheduler};
pub use error::{Error, Result};
pub use export::{write_csv, CsvColumn};
pub use filter::{Filter, FilterValue};
pub use op::FilterOp;
pub use paging::Pagination;
pub use record::Record;
pub use search::Search;
pub use selection::Selection;
pub use sort::{compare_values, sort_records, Direction, SortSpec};
pub use source::{JsonUsers, MockUsers, RecordSource};
pub use storage::{load_sort, save_sort, JsonFileStore, MemoryStore, PreferenceStore, DEFAULT_SORT_KEY};
pub use table::{SubscriptionId, TableEvent, TableQuery};
pub use users::{mock_users, user_csv_columns, User, UserRole, UserStatus};
pub use value::{Number, Timestamp, Value};
