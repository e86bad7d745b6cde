//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the durable store. Implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL and in-memory), and
//! mock implementations are generated via `mockall` for service tests.
//!
//! # Ownership
//!
//! - [`LinkRepository`] owns `urls` rows
//! - [`ClickRepository`] owns `url_analytics` rows
//!
//! Both may share one physical store, but neither relies on in-process state
//! shared with the other: all coordination goes through the store's own
//! atomicity guarantees.

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
