//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Parsing and joining are delegated to the `url` crate; this module adds the
//! pieces the engine needs on top of it: resolving `href`s found in markup and
//! computing the origin string used by the same-origin and CSP checks.

pub use url::Url;

use crate::net::NetworkError;

/// Parse an absolute URL.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidUrl`] if `text` is not an absolute URL.
pub fn parse_url(text: &str) -> Result<Url, NetworkError> {
    Url::parse(text.trim()).map_err(|e| NetworkError::InvalidUrl(format!("{text}: {e}")))
}

/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// Resolve a potentially relative URL against a base URL.
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// Relative paths are joined with the base directory, `../` segments walk up,
/// and paths starting with `/` replace the base path entirely.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidUrl`] if the joined URL cannot be parsed.
pub fn resolve(base: &Url, href: &str) -> Result<Url, NetworkError> {
    base.join(href.trim())
        .map_err(|e| NetworkError::InvalidUrl(format!("{href}: {e}")))
}

/// [§ 7.5 Origin](https://html.spec.whatwg.org/multipage/browsers.html#origin)
///
/// The tuple origin of a URL serialized as `scheme://host:port`.
///
/// The port is always spelled out (the scheme default is used when the URL
/// omits it) so that `http://a.test` and `http://a.test:80` compare equal.
#[must_use]
pub fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port_or_known_default() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(text: &str) -> Url {
        parse_url(text).unwrap()
    }

    #[test]
    fn test_origin_spells_out_default_port() {
        assert_eq!(origin(&url("http://example.org/a/b.html")), "http://example.org:80");
        assert_eq!(origin(&url("https://example.org/")), "https://example.org:443");
        assert_eq!(origin(&url("http://localhost:8000/x")), "http://localhost:8000");
    }

    #[test]
    fn test_resolve_relative_and_parent_paths() {
        let base = url("http://example.org/dir/sub/page.html");
        assert_eq!(resolve(&base, "style.css").unwrap().as_str(), "http://example.org/dir/sub/style.css");
        assert_eq!(resolve(&base, "../up.js").unwrap().as_str(), "http://example.org/dir/up.js");
        assert_eq!(resolve(&base, "/root.css").unwrap().as_str(), "http://example.org/root.css");
        assert_eq!(
            resolve(&base, "https://other.test/x").unwrap().as_str(),
            "https://other.test/x"
        );
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert!(parse_url("just/a/path").is_err());
    }
}
