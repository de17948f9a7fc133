//! Prospect CRM and blog entry points.

use super::{parse_id, respond, with_connection, ApiResponse};
use eko_core::service::{is_owner, ProspectListRequest};
use eko_core::{
    BlogDraft, BlogPost, BlogService, ProspectDraft, ProspectService, ProspectStatus,
    SqliteBlogRepository, SqliteProspectRepository, StaticIdentity, SystemClock,
};
use serde::Serialize;

type SqliteProspectService<'conn> = ProspectService<SqliteProspectRepository<'conn>, SystemClock>;
type SqliteBlogService<'conn> = BlogService<SqliteBlogRepository<'conn>, SystemClock>;

/// Prospect create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProspectInput {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Stage label such as `4. interested`. Absent keeps the current stage
    /// on edit and means `1. new` on create.
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Blog create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogInput {
    pub title: String,
    pub content: String,
    pub image_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct BlogIndex {
    latest: Vec<BlogPost>,
    older: Vec<BlogPost>,
}

/// Stage labels in pipeline order, for the status picker.
#[flutter_rust_bridge::frb(sync)]
pub fn prospect_statuses() -> Vec<String> {
    ProspectStatus::ALL
        .into_iter()
        .map(|status| status.label().to_string())
        .collect()
}

/// Payload carries the stored prospect and the show-page navigation.
#[flutter_rust_bridge::frb(sync)]
pub fn prospect_create(input: ProspectInput) -> ApiResponse {
    let result = prospect_draft(input).and_then(|draft| {
        with_prospect_service(|service| service.create(&draft).map_err(|err| err.to_string()))
    });
    respond("prospect_create", "Prospect created.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn prospect_update(prospect_id: String, input: ProspectInput) -> ApiResponse {
    let result = parse_id(&prospect_id, "prospect_id").and_then(|id| {
        let draft = prospect_draft(input)?;
        with_prospect_service(|service| service.update(id, &draft).map_err(|err| err.to_string()))
    });
    respond("prospect_update", "Prospect updated.", result)
}

/// Inline stage change from the list page.
#[flutter_rust_bridge::frb(sync)]
pub fn prospect_update_status(prospect_id: String, status: String) -> ApiResponse {
    let result = parse_id(&prospect_id, "prospect_id").and_then(|id| {
        let status = parse_status(&status)?;
        with_prospect_service(|service| {
            service
                .update_status(id, status)
                .map_err(|err| err.to_string())
        })
    });
    respond("prospect_update_status", "Status updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn prospect_mark_converted(prospect_id: String) -> ApiResponse {
    let result = parse_id(&prospect_id, "prospect_id").and_then(|id| {
        with_prospect_service(|service| service.mark_converted(id).map_err(|err| err.to_string()))
    });
    respond("prospect_mark_converted", "Prospect converted.", result)
}

/// Payload is the prospect, or `null` when it does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn prospect_get(prospect_id: String) -> ApiResponse {
    let result = parse_id(&prospect_id, "prospect_id").and_then(|id| {
        with_prospect_service(|service| service.get(id).map_err(|err| err.to_string()))
    });
    respond("prospect_get", "Prospect loaded.", result)
}

/// Company-name search plus stage filter; `page` is 1-based.
#[flutter_rust_bridge::frb(sync)]
pub fn prospect_list(
    search: Option<String>,
    status: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> ApiResponse {
    let defaults = ProspectListRequest::default();
    let result = status
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(parse_status)
        .transpose()
        .and_then(|status| {
            let request = ProspectListRequest {
                search,
                status,
                page: page.unwrap_or(defaults.page),
                page_size: page_size.unwrap_or(defaults.page_size),
            };
            with_prospect_service(|service| service.list(&request).map_err(|err| err.to_string()))
        });
    respond("prospect_list", "Prospects loaded.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn prospect_delete(prospect_id: String) -> ApiResponse {
    let result = parse_id(&prospect_id, "prospect_id").and_then(|id| {
        with_prospect_service(|service| service.delete(id).map_err(|err| err.to_string()))
    });
    respond("prospect_delete", "Prospect deleted.", result)
}

/// Publishes a post authored by `user_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn blog_create(user_id: String, input: BlogInput) -> ApiResponse {
    let identity = StaticIdentity::signed_in(user_id);
    let result = with_blog_service(|service| {
        service
            .create(&identity, &blog_draft(input))
            .map_err(|err| err.to_string())
    });
    respond("blog_create", "Post published.", result)
}

/// Only the author may edit a post.
#[flutter_rust_bridge::frb(sync)]
pub fn blog_update(user_id: String, blog_id: String, input: BlogInput) -> ApiResponse {
    let identity = StaticIdentity::signed_in(user_id);
    let result = parse_id(&blog_id, "blog_id").and_then(|id| {
        with_blog_service(|service| {
            let post = owned_post(service, id, &identity)?;
            service
                .update(post.id, &blog_draft(input))
                .map_err(|err| err.to_string())
        })
    });
    respond("blog_update", "Post updated.", result)
}

/// Payload is the post, or `null` when it does not exist.
#[flutter_rust_bridge::frb(sync)]
pub fn blog_get(blog_id: String) -> ApiResponse {
    let result = parse_id(&blog_id, "blog_id").and_then(|id| {
        with_blog_service(|service| service.get(id).map_err(|err| err.to_string()))
    });
    respond("blog_get", "Post loaded.", result)
}

/// Blog index: the newest posts as feature cards, then the rest of the
/// first batch.
#[flutter_rust_bridge::frb(sync)]
pub fn blog_index() -> ApiResponse {
    let result = with_blog_service(|service| {
        let latest = service.latest().map_err(|err| err.to_string())?;
        let older = service.older().map_err(|err| err.to_string())?;
        Ok(BlogIndex { latest, older })
    });
    respond("blog_index", "Posts loaded.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn blog_list(page: Option<u32>, page_size: Option<u32>) -> ApiResponse {
    let result = with_blog_service(|service| {
        service
            .list(page.unwrap_or(1), page_size.unwrap_or(10))
            .map_err(|err| err.to_string())
    });
    respond("blog_list", "Posts loaded.", result)
}

/// Only the author may delete a post.
#[flutter_rust_bridge::frb(sync)]
pub fn blog_delete(user_id: String, blog_id: String) -> ApiResponse {
    let identity = StaticIdentity::signed_in(user_id);
    let result = parse_id(&blog_id, "blog_id").and_then(|id| {
        with_blog_service(|service| {
            owned_post(service, id, &identity)?;
            service.delete(id).map_err(|err| err.to_string())
        })
    });
    respond("blog_delete", "Post deleted.", result)
}

fn with_prospect_service<T>(
    f: impl FnOnce(&SqliteProspectService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteProspectRepository::try_new(conn)
            .map_err(|err| format!("repo init failed: {err}"))?;
        f(&ProspectService::new(repo, SystemClock))
    })
}

fn with_blog_service<T>(
    f: impl FnOnce(&SqliteBlogService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteBlogRepository::try_new(conn)
            .map_err(|err| format!("repo init failed: {err}"))?;
        f(&BlogService::new(repo, SystemClock))
    })
}

fn owned_post(
    service: &SqliteBlogService<'_>,
    id: uuid::Uuid,
    identity: &StaticIdentity,
) -> Result<BlogPost, String> {
    let post = service
        .get(id)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("blog post not found: {id}"))?;
    if !is_owner(&post, identity) {
        return Err("only the author may change this post".to_string());
    }
    Ok(post)
}

fn prospect_draft(input: ProspectInput) -> Result<ProspectDraft, String> {
    let status = input
        .status
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(parse_status)
        .transpose()?;
    Ok(ProspectDraft {
        company_name: input.company_name,
        contact_name: input.contact_name,
        email: input.email,
        phone: input.phone,
        website: input.website,
        status,
        notes: input.notes,
    })
}

fn blog_draft(input: BlogInput) -> BlogDraft {
    BlogDraft {
        title: input.title,
        content: input.content,
        image_link: input.image_link,
    }
}

fn parse_status(raw: &str) -> Result<ProspectStatus, String> {
    ProspectStatus::parse_label(raw).ok_or_else(|| format!("invalid prospect status: `{raw}`"))
}
