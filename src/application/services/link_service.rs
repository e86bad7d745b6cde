//! Link creation, lookup, listing and deletion.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::change_feed::{ChangeFeed, ChangeKind, Table};
use crate::utils::code_generator::{
    first_unreserved, generate_random_code, is_reserved_code, validate_custom_code, validate_url,
};
use crate::utils::store_timeout::with_timeout;
use serde_json::json;

/// Default number of random draws before giving up on a new link.
pub const DEFAULT_CODE_ATTEMPTS: usize = 5;

/// Default deadline applied to each store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Service for creating and managing short links.
///
/// Conflict detection always ends at the store's uniqueness constraint. The
/// existence check on the custom-code path only produces a friendlier error
/// earlier; a concurrent insert that slips past it still fails with
/// [`AppError::Conflict`].
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    feed: Arc<ChangeFeed>,
    max_attempts: usize,
    store_timeout: Duration,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            repository,
            feed,
            max_attempts: DEFAULT_CODE_ATTEMPTS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Sets how many random codes are tried before [`AppError::ExhaustedRetries`].
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the deadline applied to each store call.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Creates a short link.
    ///
    /// # Arguments
    ///
    /// - `original_url` - must match `^https?://\S+$`
    /// - `custom_code` - optional code; blank values count as absent
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or custom code,
    /// before any store call.
    ///
    /// Returns [`AppError::Conflict`] if the custom code is taken. Custom
    /// codes are never retried.
    ///
    /// Returns [`AppError::ExhaustedRetries`] if every random draw collided.
    pub async fn create_link(
        &self,
        original_url: String,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        let original_url = original_url.trim().to_string();
        if !validate_url(&original_url) {
            return Err(AppError::bad_request(
                "Please enter a valid URL starting with http:// or https://",
                json!({ "url": original_url }),
            ));
        }

        let custom_code = custom_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let link = match custom_code {
            Some(code) => self.create_with_custom_code(original_url, code).await?,
            None => self.create_with_random_code(original_url).await?,
        };

        tracing::info!(id = link.id, short_code = %link.short_code, "Short link created");
        self.feed.publish(Table::Urls, ChangeKind::Insert, link.id);

        Ok(link)
    }

    async fn create_with_custom_code(
        &self,
        original_url: String,
        code: String,
    ) -> Result<Link, AppError> {
        if !validate_custom_code(&code) {
            return Err(AppError::bad_request(
                "Custom code must be 3-20 characters (letters, numbers, - or _)",
                json!({ "code": code }),
            ));
        }

        if is_reserved_code(&code) {
            return Err(AppError::bad_request(
                "This code is reserved",
                json!({ "code": code }),
            ));
        }

        let existing = with_timeout(
            self.store_timeout,
            "find_by_code",
            self.repository.find_by_code(&code),
        )
        .await?;

        if existing.is_some() {
            return Err(custom_code_taken(&code));
        }

        let new_link = NewLink {
            short_code: code.clone(),
            original_url,
        };

        with_timeout(self.store_timeout, "create", self.repository.create(new_link))
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => custom_code_taken(&code),
                other => other,
            })
    }

    async fn create_with_random_code(&self, original_url: String) -> Result<Link, AppError> {
        for attempt in 1..=self.max_attempts {
            let new_link = NewLink {
                short_code: first_unreserved(generate_random_code),
                original_url: original_url.clone(),
            };

            match with_timeout(self.store_timeout, "create", self.repository.create(new_link))
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => {
                    tracing::debug!(attempt, "Random short code collided, drawing again");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::exhausted_retries(
            "Failed to generate a unique short code",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches.
    pub async fn get_by_code(&self, short_code: &str) -> Result<Link, AppError> {
        with_timeout(
            self.store_timeout,
            "find_by_code",
            self.repository.find_by_code(short_code),
        )
        .await?
        .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": short_code })))
    }

    /// Lists every link, newest first.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        with_timeout(self.store_timeout, "list", self.repository.list()).await
    }

    /// Deletes a link and its click history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete_link(&self, id: i64) -> Result<(), AppError> {
        with_timeout(self.store_timeout, "delete", self.repository.delete(id)).await?;

        tracing::info!(id, "Short link deleted");
        self.feed.publish(Table::Urls, ChangeKind::Delete, id);

        Ok(())
    }

    /// Total clicks and link count across the store.
    pub async fn totals(&self) -> Result<LinkTotals, AppError> {
        with_timeout(self.store_timeout, "totals", self.repository.totals()).await
    }

    /// Round-trips to the store within the configured deadline.
    pub async fn check_store(&self) -> Result<(), AppError> {
        with_timeout(self.store_timeout, "ping", self.repository.ping()).await
    }
}

fn custom_code_taken(code: &str) -> AppError {
    AppError::conflict(
        "This custom code is already taken. Please choose another one.",
        json!({ "code": code }),
    )
}
