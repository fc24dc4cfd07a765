//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{EngagementRepository, PasswordService, PostRepository, UserRepository};
use agora_core::services::{EngagementEngine, PostService, UserService};
use agora_infra::{DatabaseConfig, DatabaseConnections, InMemoryStore};

#[cfg(feature = "postgres")]
use agora_infra::{PostgresEngagementRepository, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
    pub engagement: EngagementEngine,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store when
    /// no database is configured or reachable.
    pub async fn new(
        db_config: Option<&DatabaseConfig>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        #[cfg(feature = "postgres")]
        let state = match db_config {
            Some(config) => match DatabaseConnections::init(config).await {
                Ok(connections) => {
                    let conn = connections.main.clone();
                    Self::from_parts(
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn.clone())),
                        Arc::new(PostgresEngagementRepository::new(conn)),
                        passwords,
                        Some(Arc::new(connections)),
                    )
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(passwords)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(passwords)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory store");
            Self::in_memory(passwords)
        };

        tracing::info!(persistent = state.db.is_some(), "Application state initialized");
        state
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(passwords: Arc<dyn PasswordService>) -> Self {
        let store = InMemoryStore::new();
        Self::from_parts(
            Arc::new(store.users()),
            Arc::new(store.posts()),
            Arc::new(store.engagement()),
            passwords,
            None,
        )
    }

    fn from_parts(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        engagement: Arc<dyn EngagementRepository>,
        passwords: Arc<dyn PasswordService>,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let engagement = EngagementEngine::new(engagement);
        Self {
            users: UserService::new(users, passwords, engagement.clone()),
            posts: PostService::new(posts, engagement.clone()),
            engagement,
            db,
        }
    }
}
