//! Business logic services for the application layer.

pub mod analytics_service;
pub mod click_recorder;
pub mod link_service;
pub mod redirect_service;

pub use analytics_service::{AnalyticsReport, AnalyticsService};
pub use click_recorder::ClickRecorder;
pub use link_service::LinkService;
pub use redirect_service::{RedirectService, Resolved};
