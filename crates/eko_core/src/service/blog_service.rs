//! Blog use-cases.
//!
//! The blog index shows the newest posts as feature cards and the rest of
//! the first fifty as a compact list.

use crate::clock::Clock;
use crate::identity::IdentityProvider;
use crate::model::blog::{BlogDraft, BlogId, BlogPost};
use crate::model::field::FieldError;
use crate::navigation::NavigationRequest;
use crate::repo::blog_repo::BlogRepository;
use crate::repo::{truncate_to_millis, ListPage, RepoError};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Feature cards on the blog index.
pub const LATEST_COUNT: u32 = 3;
/// Posts loaded for the blog index in total.
pub const INDEX_LOAD_SIZE: u32 = 50;

const RESOURCE: &str = "blogs";

#[derive(Debug)]
pub enum BlogServiceError {
    MissingIdentity,
    Validation(FieldError),
    NotFound(BlogId),
    Repo(RepoError),
}

impl Display for BlogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "no signed-in user"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "blog post not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BlogServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<FieldError> for BlogServiceError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogWrite {
    pub post: BlogPost,
    pub navigation: Option<NavigationRequest>,
}

pub struct BlogService<R: BlogRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: BlogRepository, C: Clock> BlogService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Publishes a post owned by the signed-in user.
    pub fn create(
        &self,
        owner: &dyn IdentityProvider,
        draft: &BlogDraft,
    ) -> Result<BlogWrite, BlogServiceError> {
        let profile_id = owner
            .current_user_id()
            .ok_or(BlogServiceError::MissingIdentity)?;
        draft.validate()?;
        let draft = draft.normalized();
        let now = truncate_to_millis(self.clock.now());
        let post = BlogPost {
            id: Uuid::new_v4(),
            profile_id,
            title: draft.title,
            content: draft.content,
            image_link: draft.image_link,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_post(&post)?;
        info!(
            "event=blog_write module=service status=ok action=create blog_id={}",
            post.id
        );
        Ok(BlogWrite {
            navigation: NavigationRequest::show(RESOURCE, post.id),
            post,
        })
    }

    pub fn update(&self, id: BlogId, draft: &BlogDraft) -> Result<BlogWrite, BlogServiceError> {
        draft.validate()?;
        let draft = draft.normalized();
        let current = self.require(id)?;
        let post = BlogPost {
            title: draft.title,
            content: draft.content,
            image_link: draft.image_link,
            updated_at: truncate_to_millis(self.clock.now()),
            ..current
        };
        self.repo.update_post(&post)?;
        info!("event=blog_write module=service status=ok action=update blog_id={id}");
        Ok(BlogWrite {
            navigation: NavigationRequest::show(RESOURCE, id),
            post,
        })
    }

    pub fn get(&self, id: BlogId) -> Result<Option<BlogPost>, BlogServiceError> {
        Ok(self.repo.get_post(id)?)
    }

    /// Newest posts for the feature cards.
    pub fn latest(&self) -> Result<Vec<BlogPost>, BlogServiceError> {
        Ok(self.repo.list_posts(LATEST_COUNT, 0)?.items)
    }

    /// Posts after the feature cards, up to the index load size.
    pub fn older(&self) -> Result<Vec<BlogPost>, BlogServiceError> {
        Ok(self
            .repo
            .list_posts(INDEX_LOAD_SIZE - LATEST_COUNT, LATEST_COUNT)?
            .items)
    }

    /// Plain paginated listing; `page` is 1-based.
    pub fn list(&self, page: u32, page_size: u32) -> Result<ListPage<BlogPost>, BlogServiceError> {
        let page_size = page_size.max(1);
        let offset = page.max(1).saturating_sub(1).saturating_mul(page_size);
        Ok(self.repo.list_posts(page_size, offset)?)
    }

    pub fn delete(&self, id: BlogId) -> Result<(), BlogServiceError> {
        self.repo.delete_post(id).map_err(|err| match err {
            RepoError::NotFound { .. } => BlogServiceError::NotFound(id),
            other => BlogServiceError::Repo(other),
        })?;
        info!("event=blog_write module=service status=ok action=delete blog_id={id}");
        Ok(())
    }

    fn require(&self, id: BlogId) -> Result<BlogPost, BlogServiceError> {
        self.repo.get_post(id)?.ok_or(BlogServiceError::NotFound(id))
    }
}

/// Whether `identity` authored `post` and may edit or delete it.
pub fn is_owner(post: &BlogPost, identity: &dyn IdentityProvider) -> bool {
    identity
        .current_user_id()
        .is_some_and(|user_id| user_id == post.profile_id)
}
