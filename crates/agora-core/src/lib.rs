//! # Agora Core
//!
//! The domain layer of the Agora backend: entities, ports and services.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
