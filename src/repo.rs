use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    /// A referenced row (e.g. the node of a new thread) does not exist.
    #[error("not found")] NotFound,
    /// A unique constraint rejected the write.
    #[error("conflict")] Conflict,
    #[error("{0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait TabRepo: Send + Sync {
    /// Insert or rename a tab; returns its id either way.
    async fn upsert_tab(&self, slug: &str, name: &str) -> RepoResult<Id>;
    /// Insert a node, or move an existing one under `tab_id`.
    async fn upsert_node(&self, tab_id: Id, slug: &str) -> RepoResult<Id>;
    async fn find_node(&self, slug: &str) -> RepoResult<Option<Node>>;
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn thread_exists(&self, id: Id) -> RepoResult<bool>;
    /// Threads of a node, oldest id first.
    async fn list_threads(&self, node_id: Id) -> RepoResult<Vec<Thread>>;
    /// Insert the thread and its opening post as one unit.
    async fn create_thread(&self, new: NewThread) -> RepoResult<Id>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Posts of a thread by creation time, ties broken by id.
    async fn list_posts(&self, thread_id: Id) -> RepoResult<Vec<Post>>;
    async fn create_post(&self, new: NewPost) -> RepoResult<Id>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, username: &str, passhash: &str) -> RepoResult<User>;
    async fn find_user(&self, id: Id) -> RepoResult<Option<User>>;
    async fn find_user_by_name(&self, username: &str) -> RepoResult<Option<UserRecord>>;
}

pub trait Repo: TabRepo + ThreadRepo + PostRepo + UserRepo {}

impl<T> Repo for T where T: TabRepo + ThreadRepo + PostRepo + UserRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

    #[derive(Debug, Clone)]
    struct TabRow {
        id: Id,
        slug: String,
        #[allow(dead_code)]
        name: String,
    }

    #[derive(Default)]
    struct State {
        tabs:    BTreeMap<Id, TabRow>,
        nodes:   BTreeMap<Id, Node>,
        threads: BTreeMap<Id, Thread>,
        posts:   BTreeMap<Id, Post>,
        users:   BTreeMap<Id, UserRecord>,
        next_id: Id,
    }

    impl State {
        fn next_id(&mut self) -> Id {
            self.next_id += 1;
            self.next_id
        }
    }

    /// Process-local store for development and tests. Every mutation runs
    /// under a single write lock, so multi-row writes are all-or-nothing.
    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
    }

    impl InMemRepo {
        pub fn new() -> Self { Self::default() }

        fn read(&self) -> RepoResult<RwLockReadGuard<'_, State>> {
            self.state.read().map_err(|_| RepoError::Internal("store lock poisoned".into()))
        }

        fn write(&self) -> RepoResult<RwLockWriteGuard<'_, State>> {
            self.state.write().map_err(|_| RepoError::Internal("store lock poisoned".into()))
        }

        /// Test hook: drop a user row, as an out-of-band deletion would.
        pub fn remove_user(&self, id: Id) -> RepoResult<bool> {
            Ok(self.write()?.users.remove(&id).is_some())
        }

        /// Test hook: rename a user in place.
        pub fn rename_user(&self, id: Id, username: &str) -> RepoResult<()> {
            let mut s = self.write()?;
            let user = s.users.get_mut(&id).ok_or(RepoError::NotFound)?;
            user.username = username.to_string();
            Ok(())
        }

        pub fn node_count(&self) -> RepoResult<usize> {
            Ok(self.read()?.nodes.len())
        }

        pub fn tab_count(&self) -> RepoResult<usize> {
            Ok(self.read()?.tabs.len())
        }
    }

    #[async_trait]
    impl TabRepo for InMemRepo {
        async fn upsert_tab(&self, slug: &str, name: &str) -> RepoResult<Id> {
            let mut s = self.write()?;
            if let Some(tab) = s.tabs.values_mut().find(|t| t.slug == slug) {
                tab.name = name.to_string();
                return Ok(tab.id);
            }
            let id = s.next_id();
            s.tabs.insert(id, TabRow { id, slug: slug.to_string(), name: name.to_string() });
            Ok(id)
        }

        async fn upsert_node(&self, tab_id: Id, slug: &str) -> RepoResult<Id> {
            let mut s = self.write()?;
            if !s.tabs.contains_key(&tab_id) { return Err(RepoError::NotFound); }
            if let Some(node) = s.nodes.values_mut().find(|n| n.slug == slug) {
                node.tab_id = tab_id;
                return Ok(node.id);
            }
            let id = s.next_id();
            s.nodes.insert(id, Node { id, tab_id, slug: slug.to_string() });
            Ok(id)
        }

        async fn find_node(&self, slug: &str) -> RepoResult<Option<Node>> {
            let s = self.read()?;
            Ok(s.nodes.values().find(|n| n.slug == slug).cloned())
        }
    }

    #[async_trait]
    impl ThreadRepo for InMemRepo {
        async fn thread_exists(&self, id: Id) -> RepoResult<bool> {
            Ok(self.read()?.threads.contains_key(&id))
        }

        async fn list_threads(&self, node_id: Id) -> RepoResult<Vec<Thread>> {
            let s = self.read()?;
            // BTreeMap iteration is already id-ascending
            Ok(s.threads.values().filter(|t| t.node_id == node_id).cloned().collect())
        }

        async fn create_thread(&self, new: NewThread) -> RepoResult<Id> {
            let mut s = self.write()?;
            if !s.nodes.contains_key(&new.node_id) { return Err(RepoError::NotFound); }
            if !s.users.contains_key(&new.user_id) { return Err(RepoError::NotFound); }
            let thread_id = s.next_id();
            let post_id = s.next_id();
            let now = Utc::now();
            s.threads.insert(thread_id, Thread { id: thread_id, title: new.title, node_id: new.node_id });
            s.posts.insert(post_id, Post {
                id: post_id,
                created: now,
                updated: now,
                thread_id,
                user_id: new.user_id,
                content: new.content,
            });
            Ok(thread_id)
        }
    }

    #[async_trait]
    impl PostRepo for InMemRepo {
        async fn list_posts(&self, thread_id: Id) -> RepoResult<Vec<Post>> {
            let s = self.read()?;
            let mut v: Vec<_> = s.posts.values().filter(|p| p.thread_id == thread_id).cloned().collect();
            v.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
            Ok(v)
        }

        async fn create_post(&self, new: NewPost) -> RepoResult<Id> {
            let mut s = self.write()?;
            // thread_id is not checked; posts.thread_id carries no foreign key either
            if !s.users.contains_key(&new.user_id) { return Err(RepoError::NotFound); }
            let id = s.next_id();
            let now = Utc::now();
            s.posts.insert(id, Post {
                id,
                created: now,
                updated: now,
                thread_id: new.thread_id,
                user_id: new.user_id,
                content: new.content,
            });
            Ok(id)
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn create_user(&self, username: &str, passhash: &str) -> RepoResult<User> {
            let mut s = self.write()?;
            if s.users.values().any(|u| u.username == username) {
                return Err(RepoError::Conflict);
            }
            let id = s.next_id();
            s.users.insert(id, UserRecord { id, username: username.to_string(), passhash: passhash.to_string() });
            Ok(User { id, username: username.to_string() })
        }

        async fn find_user(&self, id: Id) -> RepoResult<Option<User>> {
            let s = self.read()?;
            Ok(s.users.get(&id).map(|u| User { id: u.id, username: u.username.clone() }))
        }

        async fn find_user_by_name(&self, username: &str) -> RepoResult<Option<UserRecord>> {
            let s = self.read()?;
            Ok(s.users.values().find(|u| u.username == username).cloned())
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    /// Map driver errors onto the store taxonomy, keeping the driver message.
    fn db_err(e: sqlx::Error) -> RepoError {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() { return RepoError::Conflict; }
            if db.is_foreign_key_violation() { return RepoError::NotFound; }
        }
        RepoError::Internal(e.to_string())
    }

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }

        /// Apply the bundled schema migrations.
        pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
            sqlx::migrate!("./migrations").run(&self.pool).await
        }
    }

    #[async_trait]
    impl TabRepo for PgRepo {
        async fn upsert_tab(&self, slug: &str, name: &str) -> RepoResult<Id> {
            sqlx::query_scalar::<_, Id>(
                "INSERT INTO tabs (name, slug) VALUES ($1,$2) ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name RETURNING id"
            )
            .bind(name).bind(slug)
            .fetch_one(&self.pool).await.map_err(db_err)
        }

        async fn upsert_node(&self, tab_id: Id, slug: &str) -> RepoResult<Id> {
            sqlx::query_scalar::<_, Id>(
                "INSERT INTO nodes (tab_id, slug) VALUES ($1,$2) ON CONFLICT (slug) DO UPDATE SET tab_id = EXCLUDED.tab_id RETURNING id"
            )
            .bind(tab_id).bind(slug)
            .fetch_one(&self.pool).await.map_err(db_err)
        }

        async fn find_node(&self, slug: &str) -> RepoResult<Option<Node>> {
            sqlx::query_as::<_, Node>("SELECT id, tab_id, slug FROM nodes WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool).await.map_err(db_err)
        }
    }

    #[async_trait]
    impl ThreadRepo for PgRepo {
        async fn thread_exists(&self, id: Id) -> RepoResult<bool> {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM threads WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool).await.map_err(db_err)
        }

        async fn list_threads(&self, node_id: Id) -> RepoResult<Vec<Thread>> {
            sqlx::query_as::<_, Thread>("SELECT id, title, node_id FROM threads WHERE node_id = $1 ORDER BY id")
                .bind(node_id)
                .fetch_all(&self.pool).await.map_err(db_err)
        }

        async fn create_thread(&self, new: NewThread) -> RepoResult<Id> {
            // dropping `tx` on any early return rolls both inserts back
            let mut tx = self.pool.begin().await.map_err(db_err)?;
            let thread_id = sqlx::query_scalar::<_, Id>(
                "INSERT INTO threads (title, node_id) VALUES ($1,$2) RETURNING id"
            )
            .bind(&new.title).bind(new.node_id)
            .fetch_one(&mut *tx).await.map_err(db_err)?;
            sqlx::query("INSERT INTO posts (thread_id, user_id, content) VALUES ($1,$2,$3)")
                .bind(thread_id).bind(new.user_id).bind(&new.content)
                .execute(&mut *tx).await.map_err(db_err)?;
            tx.commit().await.map_err(db_err)?;
            Ok(thread_id)
        }
    }

    #[async_trait]
    impl PostRepo for PgRepo {
        async fn list_posts(&self, thread_id: Id) -> RepoResult<Vec<Post>> {
            sqlx::query_as::<_, Post>(
                "SELECT id, created, updated, thread_id, user_id, content FROM posts WHERE thread_id = $1 ORDER BY created, id"
            )
            .bind(thread_id)
            .fetch_all(&self.pool).await.map_err(db_err)
        }

        async fn create_post(&self, new: NewPost) -> RepoResult<Id> {
            sqlx::query_scalar::<_, Id>(
                "INSERT INTO posts (thread_id, user_id, content) VALUES ($1,$2,$3) RETURNING id"
            )
            .bind(new.thread_id).bind(new.user_id).bind(&new.content)
            .fetch_one(&self.pool).await.map_err(db_err)
        }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn create_user(&self, username: &str, passhash: &str) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "INSERT INTO users (username, passhash) VALUES ($1,$2) RETURNING id, username"
            )
            .bind(username).bind(passhash)
            .fetch_one(&self.pool).await.map_err(db_err)
        }

        async fn find_user(&self, id: Id) -> RepoResult<Option<User>> {
            sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool).await.map_err(db_err)
        }

        async fn find_user_by_name(&self, username: &str) -> RepoResult<Option<UserRecord>> {
            sqlx::query_as::<_, UserRecord>("SELECT id, username, passhash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool).await.map_err(db_err)
        }
    }
}
