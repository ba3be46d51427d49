//! Property-based tests for the table pipeline using proptest.

use std::sync::Arc;
use std::time::Duration;

use nexus_table::{
    mock_users, user_csv_columns, FilterOp, ManualScheduler, MemoryStore, Record, TableConfig,
    TableQuery, User,
};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

fn table_over(users: Vec<User>) -> TableQuery<User> {
    clocked_table(users).0
}

fn clocked_table(users: Vec<User>) -> (TableQuery<User>, Arc<ManualScheduler>) {
    let clock = Arc::new(ManualScheduler::new());
    let table = TableQuery::new(
        users,
        TableConfig::default(),
        Arc::new(MemoryStore::new()),
        clock.clone(),
    )
    .with_csv_columns(user_csv_columns());
    (table, clock)
}

/// Seed users with some last-login dates knocked out.
fn users_strategy() -> impl Strategy<Value = Vec<User>> {
    (1usize..60).prop_flat_map(|n| {
        prop::collection::vec(any::<bool>(), n).prop_map(move |drop_login| {
            let mut users = mock_users(n);
            for (user, drop) in users.iter_mut().zip(drop_login) {
                if drop {
                    user.last_login_at = None;
                }
            }
            users
        })
    })
}

#[derive(Debug, Clone)]
struct FilterSpec {
    field: &'static str,
    op: FilterOp,
    value: String,
}

fn filter_strategy() -> impl Strategy<Value = FilterSpec> {
    let field = prop::sample::select(vec!["name", "email", "role", "status", "lastLoginAt", "nope"]);
    let op = prop::sample::select(FilterOp::ALL.to_vec());
    let value = prop_oneof![
        Just("admin".to_string()),
        Just("active".to_string()),
        Just("2024-12-05T00:00:00.000Z".to_string()),
        "[a-z0-9 ]{0,6}",
    ];
    (field, op, value).prop_map(|(field, op, value)| FilterSpec { field, op, value })
}

fn search_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("user 1".to_string()),
        Just("example".to_string()),
        "[a-z0-9 ]{0,4}",
    ]
}

fn ids(rows: &[&User]) -> Vec<String> {
    rows.iter().map(|u| u.id.clone()).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filter order never changes which rows match.
    #[test]
    fn filters_commute(
        users in users_strategy(),
        filters in prop::collection::vec(filter_strategy(), 0..4),
    ) {
        let mut forward = table_over(users.clone());
        let mut backward = table_over(users);
        for f in &filters {
            forward.add_filter(f.field, f.op, f.value.as_str());
        }
        for f in filters.iter().rev() {
            backward.add_filter(f.field, f.op, f.value.as_str());
        }

        prop_assert_eq!(ids(&forward.derive_filtered()), ids(&backward.derive_filtered()));
    }

    /// Rows with equal sort keys keep their record order.
    #[test]
    fn sort_is_stable(users in users_strategy(), field in prop::sample::select(vec!["role", "status"])) {
        let mut table = table_over(users.clone());
        table.set_sort(field);
        let sorted = table.derive_sorted(table.derive_filtered());

        let position = |id: &str| users.iter().position(|u| u.id == id);
        for pair in sorted.windows(2) {
            if pair[0].field_value(field) == pair[1].field_value(field) {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }

    /// Missing values sort after every defined value in both directions.
    #[test]
    fn nulls_sort_last(users in users_strategy(), descending in any::<bool>()) {
        let mut table = table_over(users);
        table.set_sort("lastLoginAt");
        if descending {
            table.set_sort("lastLoginAt");
        }
        let sorted = table.derive_sorted(table.derive_filtered());

        let first_null = sorted.iter().position(|u| u.last_login_at.is_none());
        if let Some(first_null) = first_null {
            prop_assert!(sorted[first_null..].iter().all(|u| u.last_login_at.is_none()));
        }
    }

    /// A page never exceeds the page size and is empty past the end.
    #[test]
    fn page_bounds(
        users in users_strategy(),
        size in prop::sample::select(vec![5usize, 10, 25, 50]),
        page in 0usize..20,
    ) {
        let total = users.len();
        let mut table = table_over(users);
        table.set_page_size(size);
        table.set_page(page);

        let visible = table.visible();
        prop_assert!(visible.len() <= size);
        if page * size >= total {
            prop_assert!(visible.is_empty());
        } else {
            prop_assert_eq!(visible.len(), size.min(total - page * size));
        }
    }

    /// Export writes one line per matching row plus the header.
    #[test]
    fn export_is_complete(
        users in users_strategy(),
        filters in prop::collection::vec(filter_strategy(), 0..3),
        search in search_strategy(),
        sort in prop::option::of(prop::sample::select(vec![
            "name", "email", "role", "status", "createdAt", "lastLoginAt", "nope",
        ])),
        page in 0usize..5,
    ) {
        let (mut table, clock) = clocked_table(users);
        for f in &filters {
            table.add_filter(f.field, f.op, f.value.as_str());
        }
        table.set_search_term(&search);
        clock.advance(Duration::from_millis(300));
        prop_assert_eq!(table.debounced_search_term(), search.as_str());
        if let Some(field) = sort {
            table.set_sort(field);
        }
        table.set_page(page);

        let csv = table.export_csv();
        let lines: Vec<&str> = csv.split('\n').collect();
        prop_assert_eq!(lines.len(), table.total() + 1);

        // Export order follows the sorted view across every page
        let sorted = table.derive_sorted(table.derive_filtered());
        for (line, user) in lines[1..].iter().zip(&sorted) {
            let prefix = format!("{},", user.name);
            prop_assert!(line.starts_with(&prefix));
        }
    }
}
