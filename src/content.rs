//! Thread and post reads/writes on top of the store.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::*;
use crate::repo::{PostRepo, Repo, RepoError, ThreadRepo};

/// Create a thread together with its opening post. The thread id is returned
/// only when both rows were written.
pub async fn create_thread(
    repo: &dyn Repo,
    author: &AuthUser,
    req: NewThreadRequest,
) -> Result<Id, ApiError> {
    if req.node_id < 1 || req.title.is_empty() || req.content.is_empty() {
        return Err(ApiError::invalid("invalid id/title/post"));
    }
    let new = NewThread {
        node_id: req.node_id,
        title: req.title,
        user_id: author.id,
        content: req.content,
    };
    match repo.create_thread(new).await {
        Ok(id) => {
            log::info!("user {} opened thread {id} in node {}", author.id, req.node_id);
            Ok(id)
        }
        Err(RepoError::NotFound) => Err(ApiError::invalid("no such node or user")),
        Err(e) => {
            log::error!("create_thread failed: {e}");
            Err(e.into())
        }
    }
}

/// Append a post. The thread id is not checked against the store here; HTTP
/// callers resolve it first.
pub async fn create_post(
    repo: &dyn Repo,
    author: &AuthUser,
    req: NewPostRequest,
) -> Result<Id, ApiError> {
    if req.content.is_empty() || req.thread_id < 1 {
        return Err(ApiError::invalid("empty content or bad thread id"));
    }
    let new = NewPost { thread_id: req.thread_id, user_id: author.id, content: req.content };
    repo.create_post(new).await.map_err(|e| {
        log::error!("create_post failed: {e}");
        e.into()
    })
}

pub async fn list_threads(repo: &dyn Repo, node: &Node) -> Result<Vec<ThreadSummary>, ApiError> {
    let threads = repo.list_threads(node.id).await?;
    Ok(threads.into_iter().map(ThreadSummary::from).collect())
}

/// Posts in display order. A thread that vanished after resolution simply
/// yields an empty list.
pub async fn list_posts(repo: &dyn Repo, thread: ThreadRef) -> Result<Vec<PostView>, ApiError> {
    let posts = repo.list_posts(thread.id).await?;
    Ok(posts.into_iter().map(PostView::from).collect())
}
