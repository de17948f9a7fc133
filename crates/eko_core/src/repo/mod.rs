//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define resource-oriented data access contracts (profiles, prospects,
//!   blogs) in place of a generic remote data provider.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Profile list writes are revision-checked; a stale writer gets
//!   `RepoError::RevisionConflict` instead of overwriting newer data.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use serde::Serialize;

pub mod blog_repo;
pub mod error;
pub mod profile_repo;
pub mod prospect_repo;

pub use error::{RepoError, RepoResult};

/// Page of rows plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Drops sub-millisecond precision so values survive an epoch-ms round trip.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}

pub(crate) fn from_epoch_ms(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Escapes `%`, `_` and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Registers `casefold(text)`, a Unicode lowercase, on `conn`.
///
/// SQLite's own `lower()` and `LIKE` only fold ASCII letters.
pub(crate) fn register_casefold(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )?;
    Ok(())
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
