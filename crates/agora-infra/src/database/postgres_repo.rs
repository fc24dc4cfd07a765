//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use agora_core::domain::{Pagination, Post, Reaction, ReactionCounts, User};
use agora_core::error::RepoError;
use agora_core::ports::{
    EngagementRepository, EngagementUnitOfWork, PostRepository, UserRepository,
};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_dislike::{self, Entity as DislikeEntity};
use super::entity::post_like::{self, Entity as LikeEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL engagement repository over the `post_likes` / `post_dislikes` tables.
pub struct PostgresEngagementRepository {
    db: DbConn,
}

impl PostgresEngagementRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn begin(&self) -> Result<Box<dyn EngagementUnitOfWork>, RepoError> {
        let txn = self.db.begin().await.map_err(repo_error)?;
        Ok(Box::new(PostgresEngagementUnitOfWork { txn }))
    }

    async fn counts(&self, post_id: Uuid) -> Result<ReactionCounts, RepoError> {
        let likes = LikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(repo_error)?;
        let dislikes = DislikeEntity::find()
            .filter(post_dislike::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(ReactionCounts { likes, dislikes })
    }

    async fn reacted_post_ids(
        &self,
        user_id: Uuid,
        reaction: Reaction,
    ) -> Result<Vec<Uuid>, RepoError> {
        let ids = match reaction {
            Reaction::Like => LikeEntity::find()
                .select_only()
                .column(post_like::Column::PostId)
                .filter(post_like::Column::UserId.eq(user_id))
                .order_by_asc(post_like::Column::CreatedAt)
                .into_tuple::<Uuid>()
                .all(&self.db)
                .await,
            Reaction::Dislike => DislikeEntity::find()
                .select_only()
                .column(post_dislike::Column::PostId)
                .filter(post_dislike::Column::UserId.eq(user_id))
                .order_by_asc(post_dislike::Column::CreatedAt)
                .into_tuple::<Uuid>()
                .all(&self.db)
                .await,
        };

        ids.map_err(repo_error)
    }
}

/// One engagement toggle inside a database transaction.
///
/// `find_post` takes `FOR UPDATE` on the post row, so concurrent toggles on
/// the same post queue behind each other. Dropping the unit without commit
/// rolls the transaction back.
pub struct PostgresEngagementUnitOfWork {
    txn: DatabaseTransaction,
}

#[async_trait]
impl EngagementUnitOfWork for PostgresEngagementUnitOfWork {
    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn has_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError> {
        let found = match reaction {
            Reaction::Like => LikeEntity::find_by_id((user_id, post_id))
                .one(&self.txn)
                .await
                .map(|m| m.is_some()),
            Reaction::Dislike => DislikeEntity::find_by_id((user_id, post_id))
                .one(&self.txn)
                .await
                .map(|m| m.is_some()),
        };

        found.map_err(repo_error)
    }

    async fn add_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<(), RepoError> {
        let created_at: DateTimeWithTimeZone = Utc::now().into();
        let inserted = match reaction {
            Reaction::Like => LikeEntity::insert(post_like::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(post_id),
                created_at: Set(created_at),
            })
            .exec_without_returning(&self.txn)
            .await,
            Reaction::Dislike => DislikeEntity::insert(post_dislike::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(post_id),
                created_at: Set(created_at),
            })
            .exec_without_returning(&self.txn)
            .await,
        };

        inserted.map(|_| ()).map_err(repo_error)
    }

    async fn remove_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError> {
        let deleted = match reaction {
            Reaction::Like => LikeEntity::delete_by_id((user_id, post_id))
                .exec(&self.txn)
                .await,
            Reaction::Dislike => DislikeEntity::delete_by_id((user_id, post_id))
                .exec(&self.txn)
                .await,
        };

        deleted
            .map(|res| res.rows_affected > 0)
            .map_err(repo_error)
    }

    async fn count_reactions(
        &mut self,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<u64, RepoError> {
        let count = match reaction {
            Reaction::Like => LikeEntity::find()
                .filter(post_like::Column::PostId.eq(post_id))
                .count(&self.txn)
                .await,
            Reaction::Dislike => DislikeEntity::find()
                .filter(post_dislike::Column::PostId.eq(post_id))
                .count(&self.txn)
                .await,
        };

        count.map_err(repo_error)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        self.txn.commit().await.map_err(repo_error)
    }
}
