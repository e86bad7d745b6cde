//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - `urls` storage on PostgreSQL
//! - [`PgClickRepository`] - `url_analytics` storage on PostgreSQL
//! - [`MemoryStore`] - both tables in process memory

pub mod memory_store;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_store::MemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
