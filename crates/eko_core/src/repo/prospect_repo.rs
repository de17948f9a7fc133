//! Prospect repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete over the `prospects` table.
//! - Translate list filters (company-name contains, status equals) and
//!   pagination into SQL.
//!
//! # Invariants
//! - List ordering is deterministic: `created_at DESC, id ASC`.
//! - Status is stored as its stage label.
//! - Company search folds case with Unicode rules on both sides.

use crate::model::prospect::{Prospect, ProspectId, ProspectStatus};
use crate::repo::{
    bool_to_int, ensure_tables, escape_like, from_epoch_ms, int_to_bool, register_casefold,
    ListPage, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const PROSPECT_ENTITY: &str = "prospect";

const PROSPECT_SELECT_SQL: &str = "SELECT
    id,
    company_name,
    contact_name,
    email,
    phone,
    website,
    status,
    notes,
    is_migrated,
    converted_at,
    created_at,
    updated_at
FROM prospects";

/// Filter and pagination options for prospect lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProspectListQuery {
    /// Case-insensitive substring match on `company_name`.
    pub search: Option<String>,
    /// Exact stage match.
    pub status: Option<ProspectStatus>,
    pub limit: u32,
    pub offset: u32,
}

/// Repository interface for prospect CRUD.
pub trait ProspectRepository {
    fn create_prospect(&self, prospect: &Prospect) -> RepoResult<ProspectId>;
    /// Replaces every editable column of an existing row.
    fn update_prospect(&self, prospect: &Prospect) -> RepoResult<()>;
    /// Changes only `status` and `updated_at`.
    fn update_status(
        &self,
        id: ProspectId,
        status: ProspectStatus,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<()>;
    fn get_prospect(&self, id: ProspectId) -> RepoResult<Option<Prospect>>;
    fn list_prospects(&self, query: &ProspectListQuery) -> RepoResult<ListPage<Prospect>>;
    fn delete_prospect(&self, id: ProspectId) -> RepoResult<()>;
}

/// SQLite-backed prospect repository.
pub struct SqliteProspectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProspectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["prospects"])?;
        register_casefold(conn)?;
        Ok(Self { conn })
    }
}

impl ProspectRepository for SqliteProspectRepository<'_> {
    fn create_prospect(&self, prospect: &Prospect) -> RepoResult<ProspectId> {
        self.conn.execute(
            "INSERT INTO prospects (
                id,
                company_name,
                contact_name,
                email,
                phone,
                website,
                status,
                notes,
                is_migrated,
                converted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                prospect.id.to_string(),
                prospect.company_name.as_str(),
                prospect.contact_name.as_deref(),
                prospect.email.as_str(),
                prospect.phone.as_deref(),
                prospect.website.as_deref(),
                prospect.status.label(),
                prospect.notes.as_deref(),
                bool_to_int(prospect.is_migrated),
                prospect.converted_at.map(|value| value.timestamp_millis()),
                prospect.created_at.timestamp_millis(),
                prospect.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(prospect.id)
    }

    fn update_prospect(&self, prospect: &Prospect) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE prospects
             SET
                company_name = ?2,
                contact_name = ?3,
                email = ?4,
                phone = ?5,
                website = ?6,
                status = ?7,
                notes = ?8,
                is_migrated = ?9,
                converted_at = ?10,
                updated_at = ?11
             WHERE id = ?1;",
            params![
                prospect.id.to_string(),
                prospect.company_name.as_str(),
                prospect.contact_name.as_deref(),
                prospect.email.as_str(),
                prospect.phone.as_deref(),
                prospect.website.as_deref(),
                prospect.status.label(),
                prospect.notes.as_deref(),
                bool_to_int(prospect.is_migrated),
                prospect.converted_at.map(|value| value.timestamp_millis()),
                prospect.updated_at.timestamp_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(PROSPECT_ENTITY, prospect.id));
        }
        Ok(())
    }

    fn update_status(
        &self,
        id: ProspectId,
        status: ProspectStatus,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE prospects SET status = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), status.label(), updated_at.timestamp_millis()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(PROSPECT_ENTITY, id));
        }
        Ok(())
    }

    fn get_prospect(&self, id: ProspectId) -> RepoResult<Option<Prospect>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROSPECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_prospect_row(row)?));
        }
        Ok(None)
    }

    fn list_prospects(&self, query: &ProspectListQuery) -> RepoResult<ListPage<Prospect>> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                where_sql
                    .push_str(" AND casefold(company_name) LIKE '%' || ? || '%' ESCAPE '\\'");
                bind_values.push(Value::Text(escape_like(&search.to_lowercase())));
            }
        }
        if let Some(status) = query.status {
            where_sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.label().to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM prospects{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "{PROSPECT_SELECT_SQL}{where_sql} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?;"
        );
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_prospect_row(row)?);
        }

        Ok(ListPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    fn delete_prospect(&self, id: ProspectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM prospects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(PROSPECT_ENTITY, id));
        }
        Ok(())
    }
}

fn parse_prospect_row(row: &Row<'_>) -> RepoResult<Prospect> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in prospects.id"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ProspectStatus::parse_label(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid prospect status `{status_text}` in prospects.status"
        ))
    })?;

    let converted_at = match row.get::<_, Option<i64>>("converted_at")? {
        Some(value) => Some(from_epoch_ms(value, "prospects.converted_at")?),
        None => None,
    };

    Ok(Prospect {
        id,
        company_name: row.get("company_name")?,
        contact_name: row.get("contact_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        website: row.get("website")?,
        status,
        notes: row.get("notes")?,
        is_migrated: int_to_bool(row.get("is_migrated")?, "prospects.is_migrated")?,
        converted_at,
        created_at: from_epoch_ms(row.get("created_at")?, "prospects.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "prospects.updated_at")?,
    })
}
