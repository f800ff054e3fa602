use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Id = i64;

/// Top-level grouping of nodes, built from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Tab {
    pub slug: String,
    pub name: String,
    pub nodes: Vec<String>, // canonical display order
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow, PartialEq, Eq)]
pub struct Node {
    pub id: Id,
    pub tab_id: Id,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Thread {
    pub id: Id,
    pub title: String,
    pub node_id: Id,
}

/// A thread whose existence has been confirmed for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRef {
    pub id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Post {
    pub id: Id,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub thread_id: Id,
    pub user_id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub username: String,
}

/// Stored user row, including the password hash. Never serialized to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Id,
    pub username: String,
    pub passhash: String,
}

// Store inputs

#[derive(Debug, Clone)]
pub struct NewThread {
    pub node_id: Id,
    pub title: String,
    pub user_id: Id,
    pub content: String, // opening post
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub thread_id: Id,
    pub user_id: Id,
    pub content: String,
}

// Request bodies. Fields default so that validation, not deserialization,
// decides what an incomplete body means.

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewThreadRequest {
    pub node_id: Id,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewPostRequest {
    pub thread_id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Response bodies

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ThreadSummary {
    pub id: Id,
    pub title: String,
}

impl From<Thread> for ThreadSummary {
    fn from(t: Thread) -> Self {
        Self { id: t.id, title: t.title }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostView {
    pub created: DateTime<Utc>,
    pub user_id: Id,
    pub content: String,
}

impl From<Post> for PostView {
    fn from(p: Post) -> Self {
        Self { created: p.created, user_id: p.user_id, content: p.content }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Created {
    pub id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub id: Id,
    pub username: String,
    pub token: String,
}
