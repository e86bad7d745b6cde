//! Domain layer containing business entities and rules.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Request metadata captured for click accounting
//! - [`analytics`] - Pure referrer, device and time-series rules
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])
//!
//! # Redirect Flow
//!
//! 1. HTTP handler receives a short code and builds a [`click_event::ClickContext`]
//! 2. The redirect resolver looks the code up via [`repositories::LinkRepository`]
//! 3. The click counter is incremented atomically by the store
//! 4. A click event is appended via [`repositories::ClickRepository`]

pub mod analytics;
pub mod click_event;
pub mod entities;
pub mod repositories;
