//! Cookie pairs and cookie-header serialization.
//!
//! The cookie string produced here is used as a bearer credential for
//! subsequent API calls, so cookie values are treated as sensitive and
//! redacted from Debug output.

use std::fmt;

use chromiumoxide::cdp::browser_protocol::network::Cookie as CdpCookie;

/// A single `name=value` cookie pair collected from the browser session.
///
/// The value field is intentionally redacted in Debug output to prevent
/// accidental logging of sensitive session data.
#[derive(Clone)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive — never log).
    value: String,
}

impl Cookie {
    /// Creates a new cookie pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl From<CdpCookie> for Cookie {
    fn from(cookie: CdpCookie) -> Self {
        Self {
            name: cookie.name,
            value: cookie.value,
        }
    }
}

/// Joins cookies as `name=value` pairs separated by `; `.
///
/// The browser session's ordering is preserved. An empty slice yields an
/// empty string; there is never a trailing separator.
#[must_use]
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_empty_slice_yields_empty_string() {
        assert_eq!(cookie_header(&[]), "");
    }

    #[test]
    fn test_cookie_header_single_cookie_has_no_separator() {
        let cookies = vec![Cookie::new("session_id", "abc123")];
        assert_eq!(cookie_header(&cookies), "session_id=abc123");
    }

    #[test]
    fn test_cookie_header_joins_pairs_in_order() {
        let cookies = vec![
            Cookie::new("session_id", "abc123"),
            Cookie::new("csrf", "xyz789"),
        ];
        assert_eq!(cookie_header(&cookies), "session_id=abc123; csrf=xyz789");
    }

    #[test]
    fn test_cookie_header_preserves_empty_values() {
        let cookies = vec![Cookie::new("a", ""), Cookie::new("b", "2")];
        assert_eq!(cookie_header(&cookies), "a=; b=2");
    }

    #[test]
    fn test_debug_redacts_cookie_value() {
        let cookie = Cookie::new("session_id", "super-secret");
        let debug = format!("{cookie:?}");
        assert!(debug.contains("session_id"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
