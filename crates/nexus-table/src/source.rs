//! Record sources: where a table session gets its initial snapshot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::users::{mock_users, User};

/// Produces the records a table session starts from.
pub trait RecordSource<R> {
    /// Fetches a full snapshot.
    fn fetch(&self) -> Result<Vec<R>>;
}

/// The deterministic demo seed (see [`mock_users`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUsers {
    count: usize,
}

impl MockUsers {
    pub fn new(count: usize) -> Self {
        MockUsers { count }
    }
}

impl Default for MockUsers {
    /// The 100-user seed the admin view ships with.
    fn default() -> Self {
        MockUsers::new(100)
    }
}

impl RecordSource<User> for MockUsers {
    fn fetch(&self) -> Result<Vec<User>> {
        Ok(mock_users(self.count))
    }
}

/// Users read from a JSON array file.
///
/// Keys are camelCase and timestamps ISO-8601, matching [`User`]'s serde
/// form. Ids must be unique.
#[derive(Debug, Clone)]
pub struct JsonUsers {
    path: PathBuf,
}

impl JsonUsers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonUsers { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses a JSON array of users.
    pub fn parse(text: &str) -> Result<Vec<User>> {
        let users: Vec<User> = serde_json::from_str(text)?;
        let mut seen = HashSet::with_capacity(users.len());
        for user in &users {
            if !seen.insert(user.id.as_str()) {
                return Err(Error::source_failed(format!("duplicate user id '{}'", user.id)));
            }
        }
        Ok(users)
    }
}

impl RecordSource<User> for JsonUsers {
    fn fetch(&self) -> Result<Vec<User>> {
        let text = fs::read_to_string(&self.path)?;
        let users = Self::parse(&text)?;
        tracing::debug!(path = %self.path.display(), count = users.len(), "read users");
        Ok(users)
    }
}
