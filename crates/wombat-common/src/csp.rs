//! Content Security Policy allow-list.
//!
//! [CSP Level 3 § 6.1.3 default-src](https://www.w3.org/TR/CSP3/#directive-default-src)
//!
//! Only the `default-src` directive with a list of origins is understood:
//!
//! ```text
//! Content-Security-Policy: default-src http://a.test:8000 http://cdn.test
//! ```
//!
//! Anything else leaves the document unrestricted.

use std::collections::HashSet;

use crate::net::Headers;
use crate::url::{Url, origin, parse_url};

/// Name of the response header carrying the policy.
pub const CSP_HEADER: &str = "content-security-policy";

/// The set of origins a document may load sub-resources from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    /// `None` means unrestricted.
    allowed_origins: Option<HashSet<String>>,
}

impl ContentSecurityPolicy {
    /// A policy that allows every origin.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Parse a header value of the form `default-src origin1 origin2 ...`.
    ///
    /// Origins are normalized through [`origin`], so `http://a.test` and
    /// `http://a.test:80/` denote the same entry. Sources that are not URLs
    /// (keywords such as `'self'`) are kept verbatim and never match.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut words = value.split_whitespace();
        if words.next() != Some("default-src") {
            return Self::unrestricted();
        }
        let allowed = words
            .map(|source| parse_url(source).map_or_else(|_| source.to_string(), |url| origin(&url)))
            .collect();
        Self {
            allowed_origins: Some(allowed),
        }
    }

    /// Build the policy from a document's response headers.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Self {
        headers
            .get(CSP_HEADER)
            .map_or_else(Self::unrestricted, |value| Self::parse(value))
    }

    /// Whether the policy places no restriction at all.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.allowed_origins.is_none()
    }

    /// True iff the policy is unrestricted or `url`'s origin is allow-listed.
    #[must_use]
    pub fn allowed(&self, url: &Url) -> bool {
        self.allowed_origins
            .as_ref()
            .is_none_or(|origins| origins.contains(&origin(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_is_unrestricted() {
        let csp = ContentSecurityPolicy::from_headers(&Headers::new());
        assert!(csp.is_unrestricted());
        assert!(csp.allowed(&parse_url("http://anything.test/x.js").unwrap()));
    }

    #[test]
    fn test_default_src_allow_list() {
        let csp = ContentSecurityPolicy::parse("default-src http://a.test:8000 https://cdn.test");
        assert!(csp.allowed(&parse_url("http://a.test:8000/script.js").unwrap()));
        assert!(csp.allowed(&parse_url("https://cdn.test/lib.css").unwrap()));
        assert!(!csp.allowed(&parse_url("http://a.test:9000/script.js").unwrap()));
        assert!(!csp.allowed(&parse_url("http://evil.test/").unwrap()));
    }

    #[test]
    fn test_other_directives_are_ignored() {
        let csp = ContentSecurityPolicy::parse("script-src http://a.test");
        assert!(csp.is_unrestricted());
    }
}
