//! Path-identifier resolution: node slugs and thread ids.

use actix_web::dev::ServiceRequest;
use async_trait::async_trait;

use crate::context::{RequestContext, Resolver};
use crate::error::ApiError;
use crate::models::{Node, ThreadRef};
use crate::repo::{Repo, TabRepo, ThreadRepo};
use crate::routes::AppState;

/// Look up a node by slug. Empty, unknown, or unreadable all mean `NotFound`.
pub async fn resolve_node(repo: &dyn Repo, slug: Option<&str>) -> Result<Node, ApiError> {
    let slug = slug.filter(|s| !s.is_empty()).ok_or(ApiError::NotFound)?;
    match repo.find_node(slug).await {
        Ok(Some(node)) => Ok(node),
        Ok(None) => Err(ApiError::NotFound),
        Err(e) => {
            log::error!("node lookup for '{slug}' failed: {e}");
            Err(ApiError::NotFound)
        }
    }
}

/// Parse a thread id and confirm the thread exists.
pub async fn resolve_thread(repo: &dyn Repo, raw_id: Option<&str>) -> Result<ThreadRef, ApiError> {
    let id = match raw_id.map(str::parse::<i64>) {
        Some(Ok(id)) if id >= 1 => id,
        other => {
            log::debug!("rejected thread id {raw_id:?}: {other:?}");
            return Err(ApiError::NotFound);
        }
    };
    match repo.thread_exists(id).await {
        Ok(true) => Ok(ThreadRef { id }),
        Ok(false) => Err(ApiError::NotFound),
        Err(e) => {
            log::error!("thread lookup for {id} failed: {e}");
            Err(ApiError::NotFound)
        }
    }
}

/// Resolves the `{nodeSlug}` path segment.
#[derive(Clone, Copy, Default)]
pub struct NodeCtx;

#[async_trait(?Send)]
impl Resolver for NodeCtx {
    async fn resolve(
        &self,
        state: &AppState,
        req: &ServiceRequest,
        ctx: &mut RequestContext,
    ) -> Result<(), ApiError> {
        let node = resolve_node(state.repo.as_ref(), req.match_info().get("nodeSlug")).await?;
        ctx.node = Some(node);
        Ok(())
    }
}

/// Resolves the `{threadId}` path segment.
#[derive(Clone, Copy, Default)]
pub struct ThreadCtx;

#[async_trait(?Send)]
impl Resolver for ThreadCtx {
    async fn resolve(
        &self,
        state: &AppState,
        req: &ServiceRequest,
        ctx: &mut RequestContext,
    ) -> Result<(), ApiError> {
        let thread = resolve_thread(state.repo.as_ref(), req.match_info().get("threadId")).await?;
        ctx.thread = Some(thread);
        Ok(())
    }
}
