//! Blog repository contracts and SQLite implementation.
//!
//! # Invariants
//! - List ordering is newest first: `created_at DESC, id ASC`.

use crate::model::blog::{BlogId, BlogPost};
use crate::repo::{ensure_tables, from_epoch_ms, ListPage, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const BLOG_ENTITY: &str = "blog post";

const BLOG_SELECT_SQL: &str = "SELECT
    id,
    profile_id,
    title,
    content,
    image_link,
    created_at,
    updated_at
FROM blogs";

/// Repository interface for blog CRUD.
pub trait BlogRepository {
    fn create_post(&self, post: &BlogPost) -> RepoResult<BlogId>;
    /// Replaces title, content, image link and `updated_at`.
    fn update_post(&self, post: &BlogPost) -> RepoResult<()>;
    fn get_post(&self, id: BlogId) -> RepoResult<Option<BlogPost>>;
    fn list_posts(&self, limit: u32, offset: u32) -> RepoResult<ListPage<BlogPost>>;
    fn delete_post(&self, id: BlogId) -> RepoResult<()>;
}

/// SQLite-backed blog repository.
pub struct SqliteBlogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["blogs"])?;
        Ok(Self { conn })
    }
}

impl BlogRepository for SqliteBlogRepository<'_> {
    fn create_post(&self, post: &BlogPost) -> RepoResult<BlogId> {
        self.conn.execute(
            "INSERT INTO blogs (
                id,
                profile_id,
                title,
                content,
                image_link,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                post.id.to_string(),
                post.profile_id.as_str(),
                post.title.as_str(),
                post.content.as_str(),
                post.image_link.as_deref(),
                post.created_at.timestamp_millis(),
                post.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(post.id)
    }

    fn update_post(&self, post: &BlogPost) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE blogs
             SET title = ?2, content = ?3, image_link = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                post.id.to_string(),
                post.title.as_str(),
                post.content.as_str(),
                post.image_link.as_deref(),
                post.updated_at.timestamp_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(BLOG_ENTITY, post.id));
        }
        Ok(())
    }

    fn get_post(&self, id: BlogId) -> RepoResult<Option<BlogPost>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BLOG_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_blog_row(row)?));
        }
        Ok(None)
    }

    fn list_posts(&self, limit: u32, offset: u32) -> RepoResult<ListPage<BlogPost>> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM blogs;", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(&format!(
            "{BLOG_SELECT_SQL} ORDER BY created_at DESC, id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![i64::from(limit), i64::from(offset)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_blog_row(row)?);
        }

        Ok(ListPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    fn delete_post(&self, id: BlogId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM blogs WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(BLOG_ENTITY, id));
        }
        Ok(())
    }
}

fn parse_blog_row(row: &Row<'_>) -> RepoResult<BlogPost> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in blogs.id"))
    })?;

    Ok(BlogPost {
        id,
        profile_id: row.get("profile_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        image_link: row.get("image_link")?,
        created_at: from_epoch_ms(row.get("created_at")?, "blogs.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "blogs.updated_at")?,
    })
}
