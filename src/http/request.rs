use bytes::Bytes;
use std::collections::HashMap;

/// HTTP request methods.
///
/// Only GET is served. Every other token, well-formed or not, is kept as
/// `Unsupported` so the caller can log it before answering 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
    /// Any other method token
    Unsupported(String),
}

impl Method {
    /// Maps a method token onto a `Method`. Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use warden::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::Get);
    /// assert_eq!(Method::from_token("get"), Method::Unsupported("get".into()));
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            other => Method::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Unsupported(token) => token,
        }
    }
}

/// The parsed head of a request, plus whatever body bytes arrived with it.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// The request method
    pub method: Method,
    /// The request target as received, always starting with `/`
    pub target: String,
    /// Protocol version token from the request line
    pub version: String,
    /// Header fields; lines without a colon are skipped
    pub headers: HashMap<String, String>,
    /// Raw header block, terminator included
    pub header: Bytes,
    /// Body bytes that were read together with the header
    pub body: Bytes,
}

impl RequestHead {
    /// Retrieves a header value by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn header_len(&self) -> usize {
        self.header.len()
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}
