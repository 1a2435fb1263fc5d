//! Inbound request context with cookies and query parameters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use percent_encoding::percent_decode_str;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static SEQUENCE: AtomicU32 = AtomicU32::new(0);

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = BTreeMap<String, String>;

/// Request cookies.
pub type Cookies = BTreeMap<String, String>;

/// Request context handed to fragment handlers and the composer.
#[derive(Debug, Clone)]
pub struct FragmentRequest {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Request path without the query string.
    pub path: String,
    /// Decoded query parameters.
    pub query: QueryParams,
    /// Headers with lowercased names.
    pub headers: BTreeMap<String, String>,
    /// Cookies parsed from the `Cookie` header.
    pub cookies: Cookies,
}

impl FragmentRequest {
    /// Create an empty request for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }

    /// Build from an `http` request.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let mut ctx = Self::new(req.uri().path());

        if let Some(query) = req.uri().query() {
            ctx.query = parse_query(query);
        }

        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                ctx.headers.insert(name.as_str().to_lowercase(), value.to_string());
            }
        }

        if let Some(cookie) = ctx.headers.get("cookie") {
            ctx.cookies = parse_cookies(cookie);
        }

        if let Some(id) = ctx.headers.get("x-request-id") {
            ctx.request_id = RequestId::from_string(id.clone());
        }

        ctx
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a cookie, keeping the `Cookie` header in sync.
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self.headers.insert("cookie".to_string(), format_cookies(&self.cookies));
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Get a cookie by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|s| s.as_str())
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }
}

/// Parse a query string into decoded parameters. Later duplicates win.
pub fn parse_query(query: &str) -> QueryParams {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(name), decode(value))
        })
        .collect()
}

/// Parse a `Cookie` header value.
pub fn parse_cookies(header: &str) -> Cookies {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}

/// Format cookies as a `Cookie` header value.
pub fn format_cookies(cookies: &Cookies) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
