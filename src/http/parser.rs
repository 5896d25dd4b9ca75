use crate::http::request::{Method, RequestHead};
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Header terminator separating the request head from the body.
pub const HEADER_TERMINATOR: &[u8; 4] = b"\r\n\r\n";

const SUPPORTED_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request does not mention HTTP/1.1")]
    UnsupportedVersion,
    #[error("request line has no method token")]
    InvalidRequestLine,
    #[error("request target missing or not absolute")]
    InvalidTarget,
}

/// Returns the offset of the first header terminator in `buf`.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Splits a buffer at the first terminator into `(header, body)`.
///
/// The header keeps the terminator; the body is everything after it.
pub fn split_head(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = find_headers_end(buf)? + HEADER_TERMINATOR.len();
    Some(buf.split_at(end))
}

/// Parses a complete request head.
///
/// The version check is a plain substring search for `HTTP/1.1` anywhere in
/// the head, not only on the request line. The method is the leading run of
/// word characters; the target must follow it after exactly one space and
/// start with `/`.
pub fn parse_request_head(header: Bytes, body: Bytes) -> Result<RequestHead, ParseError> {
    let text = String::from_utf8_lossy(&header).into_owned();

    if !text.contains(SUPPORTED_VERSION) {
        return Err(ParseError::UnsupportedVersion);
    }

    let method_len = text
        .find(|c: char| !is_word_char(c))
        .unwrap_or(text.len());
    if method_len == 0 {
        return Err(ParseError::InvalidRequestLine);
    }
    let method_token = &text[..method_len];

    let target = text[method_len..]
        .strip_prefix(' ')
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| {
            let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            &rest[..len]
        })
        .ok_or(ParseError::InvalidTarget)?;

    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let version = request_line
        .split_whitespace()
        .nth(2)
        .unwrap_or_default()
        .to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    Ok(RequestHead {
        method: Method::from_token(method_token),
        target: target.to_string(),
        version,
        headers,
        header,
        body,
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &'static [u8]) -> Result<RequestHead, ParseError> {
        let (header, body) = split_head(raw).unwrap();
        parse_request_head(Bytes::copy_from_slice(header), Bytes::copy_from_slice(body))
    }

    #[test]
    fn parse_simple_get() {
        let parsed = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();

        assert_eq!(parsed.method, Method::Get);
        assert_eq!(parsed.target, "/");
        assert_eq!(parsed.header("Host"), Some("example.com"));
    }

    #[test]
    fn word_chars_include_underscore_and_digits() {
        assert!(is_word_char('_'));
        assert!(is_word_char('7'));
        assert!(!is_word_char('-'));
        assert!(!is_word_char(' '));
    }

    #[test]
    fn target_stops_at_carriage_return() {
        let parsed = parse(b"GET /a/b\r\nX: HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(parsed.target, "/a/b");
        assert_eq!(parsed.version, "");
    }
}
