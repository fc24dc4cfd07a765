//! In-memory store - used as fallback when no database is configured.
//!
//! All three repositories share one table set behind a `tokio::sync::Mutex`.
//! An engagement unit of work holds the lock for its whole lifetime, which
//! serializes toggles the way a row lock does in Postgres. Data is lost on
//! process restart.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use agora_core::domain::{Pagination, Post, Reaction, ReactionCounts, User};
use agora_core::error::RepoError;
use agora_core::ports::{
    BaseRepository, EngagementRepository, EngagementUnitOfWork, PostRepository, UserRepository,
};

/// `(user_id, post_id)` pairs, ordered by user first.
type Relation = BTreeSet<(Uuid, Uuid)>;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    likes: Relation,
    dislikes: Relation,
}

impl Tables {
    fn relation(&self, reaction: Reaction) -> &Relation {
        match reaction {
            Reaction::Like => &self.likes,
            Reaction::Dislike => &self.dislikes,
        }
    }

    fn relation_mut(&mut self, reaction: Reaction) -> &mut Relation {
        match reaction {
            Reaction::Like => &mut self.likes,
            Reaction::Dislike => &mut self.dislikes,
        }
    }

    fn count(&self, post_id: Uuid, reaction: Reaction) -> u64 {
        self.relation(reaction)
            .iter()
            .filter(|(_, post)| *post == post_id)
            .count() as u64
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

fn by_creation(post: &Post) -> (DateTime<Utc>, Uuid) {
    (post.created_at, post.id)
}

/// Shared in-memory table set. Hand out repositories with [`users`](Self::users),
/// [`posts`](Self::posts) and [`engagement`](Self::engagement).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn engagement(&self) -> InMemoryEngagementRepository {
        InMemoryEngagementRepository {
            tables: self.tables.clone(),
        }
    }
}

pub struct InMemoryUserRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.users.contains_key(&user.id) || tables.username_taken(&user.username, None) {
            return Err(RepoError::Constraint("users_username_key".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables.username_taken(&user.username, Some(user.id)) {
            return Err(RepoError::Constraint("users_username_key".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

pub struct InMemoryPostRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.lock().await.posts.get(&id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&post.user_id) {
            return Err(RepoError::Constraint("posts_user_id_fkey".to_string()));
        }
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.lock().await;
        match tables.posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.lock().await;
        let mut posts: Vec<&Post> = tables.posts.values().collect();
        posts.sort_by_key(|p| by_creation(p));

        Ok(posts
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.lock().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by_key(by_creation);
        Ok(posts)
    }
}

pub struct InMemoryEngagementRepository {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn begin(&self) -> Result<Box<dyn EngagementUnitOfWork>, RepoError> {
        let tables = self.tables.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            tables,
            journal: Vec::new(),
        }))
    }

    async fn counts(&self, post_id: Uuid) -> Result<ReactionCounts, RepoError> {
        let tables = self.tables.lock().await;
        Ok(ReactionCounts {
            likes: tables.count(post_id, Reaction::Like),
            dislikes: tables.count(post_id, Reaction::Dislike),
        })
    }

    async fn reacted_post_ids(
        &self,
        user_id: Uuid,
        reaction: Reaction,
    ) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .relation(reaction)
            .range((user_id, Uuid::nil())..=(user_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, post)| *post)
            .collect())
    }
}

/// A change applied inside a unit of work, kept so it can be undone.
struct JournalEntry {
    reaction: Reaction,
    key: (Uuid, Uuid),
    inserted: bool,
}

/// Holds the store lock until dropped. Changes are applied eagerly and
/// reverted from the journal unless the unit was committed.
pub struct InMemoryUnitOfWork {
    tables: OwnedMutexGuard<Tables>,
    journal: Vec<JournalEntry>,
}

#[async_trait]
impl EngagementUnitOfWork for InMemoryUnitOfWork {
    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.posts.get(&post_id).cloned())
    }

    async fn has_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError> {
        Ok(self.tables.relation(reaction).contains(&(user_id, post_id)))
    }

    async fn add_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<(), RepoError> {
        if !self.tables.users.contains_key(&user_id) || !self.tables.posts.contains_key(&post_id) {
            return Err(RepoError::Constraint(format!("post_{reaction}s_fkey")));
        }
        if !self.tables.relation_mut(reaction).insert((user_id, post_id)) {
            return Err(RepoError::Constraint(format!("post_{reaction}s_pkey")));
        }
        self.journal.push(JournalEntry {
            reaction,
            key: (user_id, post_id),
            inserted: true,
        });
        Ok(())
    }

    async fn remove_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError> {
        let removed = self
            .tables
            .relation_mut(reaction)
            .remove(&(user_id, post_id));
        if removed {
            self.journal.push(JournalEntry {
                reaction,
                key: (user_id, post_id),
                inserted: false,
            });
        }
        Ok(removed)
    }

    async fn count_reactions(
        &mut self,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<u64, RepoError> {
        Ok(self.tables.count(post_id, reaction))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        let mut this = self;
        this.journal.clear();
        Ok(())
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        if self.journal.is_empty() {
            return;
        }
        tracing::debug!(changes = self.journal.len(), "Rolling back engagement changes");
        while let Some(entry) = self.journal.pop() {
            let relation = self.tables.relation_mut(entry.reaction);
            if entry.inserted {
                relation.remove(&entry.key);
            } else {
                relation.insert(entry.key);
            }
        }
    }
}
