//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and change notifications.
//! They consume repository traits and give HTTP handlers and the admin CLI a
//! single API regardless of the storage backend.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, lookup and deletion
//! - [`services::redirect_service::RedirectService`] - Redirect resolution and click accounting
//! - [`services::click_recorder::ClickRecorder`] - Click event log writes with retry
//! - [`services::analytics_service::AnalyticsService`] - Dashboard aggregates

pub mod services;
