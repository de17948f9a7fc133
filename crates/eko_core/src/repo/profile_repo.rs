//! Profile repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the per-user aggregate that owns sections, tasks and notes.
//! - Replace lists as whole JSON documents under a revision check.
//!
//! # Invariants
//! - Write paths call `ProfileUpdate::validate()` before SQL mutations.
//! - A write succeeds only when `expected_revision` equals the stored
//!   revision; the stored revision then increases by exactly one.

use crate::model::note::Note;
use crate::model::profile::{ProfileRecord, ProfileUpdate};
use crate::model::section::Section;
use crate::model::task::Task;
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;

const PROFILE_ENTITY: &str = "profile";

/// Repository interface for the profile aggregate.
pub trait ProfileRepository {
    /// Loads one profile; lists are returned exactly as stored.
    fn get_profile(&self, profile_id: &str) -> RepoResult<Option<ProfileRecord>>;
    /// Inserts an empty profile, or returns the existing one unchanged.
    fn ensure_profile(&self, profile_id: &str) -> RepoResult<ProfileRecord>;
    /// Replaces the given lists and returns the new revision.
    fn update_lists(
        &self,
        profile_id: &str,
        expected_revision: i64,
        update: ProfileUpdate<'_>,
    ) -> RepoResult<i64>;
}

impl<T: ProfileRepository + ?Sized> ProfileRepository for &T {
    fn get_profile(&self, profile_id: &str) -> RepoResult<Option<ProfileRecord>> {
        (**self).get_profile(profile_id)
    }

    fn ensure_profile(&self, profile_id: &str) -> RepoResult<ProfileRecord> {
        (**self).ensure_profile(profile_id)
    }

    fn update_lists(
        &self,
        profile_id: &str,
        expected_revision: i64,
        update: ProfileUpdate<'_>,
    ) -> RepoResult<i64> {
        (**self).update_lists(profile_id, expected_revision, update)
    }
}

/// SQLite-backed profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["profiles"])?;
        Ok(Self { conn })
    }

    fn current_revision(&self, profile_id: &str) -> RepoResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT revision FROM profiles WHERE id = ?1;",
                [profile_id],
                |row| row.get(0),
            )
            .optional()?)
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn get_profile(&self, profile_id: &str) -> RepoResult<Option<ProfileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sections, tasks, notes, revision
             FROM profiles
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([profile_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_profile_row(row)?));
        }
        Ok(None)
    }

    fn ensure_profile(&self, profile_id: &str) -> RepoResult<ProfileRecord> {
        if profile_id.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "profile id must not be blank".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO profiles (id) VALUES (?1);",
            [profile_id],
        )?;
        self.get_profile(profile_id)?
            .ok_or_else(|| RepoError::not_found(PROFILE_ENTITY, profile_id))
    }

    fn update_lists(
        &self,
        profile_id: &str,
        expected_revision: i64,
        update: ProfileUpdate<'_>,
    ) -> RepoResult<i64> {
        update.validate()?;

        let mut assignments = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(sections) = update.sections {
            assignments.push("sections = ?");
            bind_values.push(Value::Text(serde_json::to_string(sections)?));
        }
        if let Some(tasks) = update.tasks {
            assignments.push("tasks = ?");
            bind_values.push(Value::Text(serde_json::to_string(tasks)?));
        }
        if let Some(notes) = update.notes {
            assignments.push("notes = ?");
            bind_values.push(Value::Text(serde_json::to_string(notes)?));
        }
        assignments.push("revision = revision + 1");
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE profiles SET {} WHERE id = ? AND revision = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Text(profile_id.to_string()));
        bind_values.push(Value::Integer(expected_revision));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 1 {
            return Ok(expected_revision + 1);
        }

        match self.current_revision(profile_id)? {
            None => Err(RepoError::not_found(PROFILE_ENTITY, profile_id)),
            Some(actual) => Err(RepoError::RevisionConflict {
                profile_id: profile_id.to_string(),
                expected: expected_revision,
                actual,
            }),
        }
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<ProfileRecord> {
    let sections: Vec<Section> = parse_json_column(row, "sections")?;
    let tasks: Vec<Task> = parse_json_column(row, "tasks")?;
    let notes: Vec<Note> = parse_json_column(row, "notes")?;
    Ok(ProfileRecord {
        id: row.get("id")?,
        sections,
        tasks,
        notes,
        revision: row.get("revision")?,
    })
}

fn parse_json_column<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> RepoResult<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in profiles.{column}: {err}")))
}

