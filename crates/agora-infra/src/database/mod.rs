//! Persistence: connection management, Postgres repositories and the in-memory fallback.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use memory::{
    InMemoryEngagementRepository, InMemoryPostRepository, InMemoryStore, InMemoryUnitOfWork,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresEngagementRepository, PostgresEngagementUnitOfWork, PostgresPostRepository,
    PostgresUserRepository,
};
