//! Request metadata captured for click accounting.

use axum::http::{HeaderMap, header};

/// Client metadata attached to a redirect, as received from the request.
///
/// Values are kept raw: an empty or malformed `Referer` is stored verbatim
/// and only interpreted later by the analytics rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickContext {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl ClickContext {
    /// Creates a new click context.
    pub fn new(referrer: Option<&str>, user_agent: Option<&str>) -> Self {
        Self {
            referrer: referrer.map(|s| s.to_string()),
            user_agent: user_agent.map(|s| s.to_string()),
        }
    }

    /// Reads `Referer` and `User-Agent` from request headers.
    ///
    /// Headers that are not valid visible ASCII are treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(
            headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
            headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers_full() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("https://google.com"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let ctx = ClickContext::from_headers(&headers);

        assert_eq!(ctx.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_from_headers_missing() {
        let ctx = ClickContext::from_headers(&HeaderMap::new());
        assert_eq!(ctx, ClickContext::default());
    }

    #[test]
    fn test_empty_referrer_is_kept_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(""));

        let ctx = ClickContext::from_headers(&headers);
        assert_eq!(ctx.referrer.as_deref(), Some(""));
    }
}
