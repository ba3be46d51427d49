//! The user record the admin table manages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::CsvColumn;
use crate::record::Record;
use crate::value::Value;

/// Access level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    User,
    Guest,
}

impl UserRole {
    /// All roles, in the order the seed data cycles through them.
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Manager,
        UserRole::User,
        UserRole::Guest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

/// Account state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl UserStatus {
    /// All statuses, in the order the seed data cycles through them.
    pub const ALL: [UserStatus; 4] = [
        UserStatus::Active,
        UserStatus::Inactive,
        UserStatus::Suspended,
        UserStatus::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
            UserStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::source_failed(format!("unknown user role '{s}'")))
    }
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UserStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::source_failed(format!("unknown user status '{s}'")))
    }
}

/// A user account as the admin table shows it.
///
/// Serializes with camelCase keys and ISO-8601 timestamps:
///
/// ```json
/// {"id": "user-1", "name": "User 1", "email": "user1@example.com",
///  "role": "admin", "status": "active",
///  "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z",
///  "lastLoginAt": "2024-12-01T00:00:00Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn field_value(&self, field: &str) -> Option<Value<'_>> {
        let value = match field {
            "id" => Value::String(&self.id),
            "name" => Value::String(&self.name),
            "email" => Value::String(&self.email),
            "avatar" => self.avatar.as_deref().map_or(Value::Null, Value::String),
            "role" => Value::Enum(self.role.as_str()),
            "status" => Value::Enum(self.status.as_str()),
            "createdAt" => Value::Timestamp(self.created_at.into()),
            "updatedAt" => Value::Timestamp(self.updated_at.into()),
            "lastLoginAt" => self
                .last_login_at
                .map_or(Value::Null, |at| Value::Timestamp(at.into())),
            _ => return None,
        };
        Some(value)
    }
}

/// Export columns: `Name,Email,Role,Status,Created,Last Login`.
pub fn user_csv_columns() -> Vec<CsvColumn<User>> {
    vec![
        CsvColumn::field("Name", "name"),
        CsvColumn::field("Email", "email"),
        CsvColumn::field("Role", "role"),
        CsvColumn::field("Status", "status"),
        CsvColumn::date("Created", "createdAt"),
        CsvColumn::date("Last Login", "lastLoginAt"),
    ]
}

const DAY_MS: i64 = 86_400_000;
// 2024-01-01T00:00:00Z
const SEED_CREATED_MS: i64 = 1_704_067_200_000;
// 2024-12-01T00:00:00Z
const SEED_LOGIN_MS: i64 = 1_733_011_200_000;

fn utc_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Deterministic demo users.
///
/// User `i` (zero-based) is `user-{i+1}` / `User {i+1}` /
/// `user{i+1}@example.com`; role and status cycle every four users, accounts
/// are created one per day from 2024-01-01 and last logged in during
/// December 2024.
///
/// ```
/// use nexus_table::{mock_users, UserRole};
///
/// let users = mock_users(5);
/// assert_eq!(users[4].id, "user-5");
/// assert_eq!(users[4].role, UserRole::Admin);
/// ```
pub fn mock_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| {
            let n = i + 1;
            let day = i as i64;
            let created = utc_millis(SEED_CREATED_MS + day * DAY_MS);
            User {
                id: format!("user-{n}"),
                name: format!("User {n}"),
                email: format!("user{n}@example.com"),
                avatar: Some(format!("https://api.dicebear.com/7.x/avataaars/svg?seed={i}")),
                role: UserRole::ALL[i % 4],
                status: UserStatus::ALL[i % 4],
                created_at: created,
                updated_at: created,
                last_login_at: Some(utc_millis(SEED_LOGIN_MS + (day % 30) * DAY_MS)),
            }
        })
        .collect()
}
