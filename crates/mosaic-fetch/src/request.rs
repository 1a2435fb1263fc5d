//! Outbound request builder.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in query components.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A transport-neutral outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: http::Method,
    /// Absolute URL including the query string.
    pub url: String,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Total timeout, when the caller wants one tighter than the client's.
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: http::Method::GET,
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Append a percent-encoded query parameter.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        self.url.push(separator);
        self.url
            .extend(utf8_percent_encode(name, QUERY_COMPONENT));
        self.url.push('=');
        self.url
            .extend(utf8_percent_encode(value, QUERY_COMPONENT));
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the `Cookie` header, replacing any previous one.
    pub fn cookies(mut self, cookie_header: impl Into<String>) -> Self {
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("cookie"));
        self.headers.push(("Cookie".to_string(), cookie_header.into()));
        self
    }

    /// Set a total timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_appends_separators() {
        let req = FetchRequest::get("http://bff/product")
            .query("__renderMode", "stream")
            .query("id", "42");
        assert_eq!(req.url, "http://bff/product?__renderMode=stream&id=42");
    }

    #[test]
    fn test_query_encodes_values() {
        let req = FetchRequest::get("http://bff/p").query("q", "a b&c=d");
        assert_eq!(req.url, "http://bff/p?q=a%20b%26c%3Dd");
    }

    #[test]
    fn test_query_after_existing_query() {
        let req = FetchRequest::get("http://bff/p?x=1").query("y", "2");
        assert_eq!(req.url, "http://bff/p?x=1&y=2");
    }

    #[test]
    fn test_cookies_replace_previous() {
        let req = FetchRequest::get("http://bff/")
            .header("cookie", "a=1")
            .cookies("b=2");
        assert_eq!(req.header_value("Cookie"), Some("b=2"));
        assert_eq!(req.headers.len(), 1);
    }
}
