//! HTTP response representation
//!
//! The capability boundary hands back a plain data struct so the session
//! controller and login probe never touch transport types directly.

use std::collections::HashMap;

/// A completed HTTP response: status, headers and body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers. Header names are lowercased; values that are not
    /// valid UTF-8 are skipped.
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is a redirect (3xx).
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Case-insensitive check whether the body contains the given marker.
    pub fn body_contains_ignore_case(&self, marker: &str) -> bool {
        self.body.to_lowercase().contains(&marker.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let ok = HttpResponse::new(200, HashMap::new(), "");
        assert!(ok.is_success());
        assert!(!ok.is_redirect());

        let found = HttpResponse::new(302, HashMap::new(), "");
        assert!(found.is_redirect());
        assert!(!found.is_success());
    }

    #[test]
    fn test_body_marker_case_insensitive() {
        let res = HttpResponse::new(200, HashMap::new(), "<a href=\"/logout\">Log Out</a>");
        assert!(res.body_contains_ignore_case("log out"));
        assert!(res.body_contains_ignore_case("LOG OUT"));
        assert!(!res.body_contains_ignore_case("sign in"));
    }
}
