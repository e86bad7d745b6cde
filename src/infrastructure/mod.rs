//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`change_feed`] - In-process change notifications for analytics refresh

pub mod change_feed;
pub mod persistence;
