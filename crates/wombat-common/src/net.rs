//! Network collaborator for the Wombat engine.
//!
//! The rendering core never touches sockets. Everything it loads (documents,
//! stylesheets, scripts, XHR bodies) goes through the [`Fetcher`] contract:
//!
//! ```text
//! fetch(resolved_url, top_level_url, payload) -> (headers, body)
//! ```
//!
//! [`HttpFetcher`] is the production implementation: a blocking `reqwest`
//! client plus an in-memory cookie jar. `file:` URLs are read from disk so
//! local documents can be rendered with the same pipeline.
//!
//! TODO: Implement proper Fetch Standard (<https://fetch.spec.whatwg.org/>)

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{COOKIE, USER_AGENT};
use thiserror::Error;

use crate::url::{Url, origin};

/// User-Agent header sent with all requests.
const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) Wombat/0.1";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Response headers this engine refuses to handle.
///
/// Bodies must arrive unencoded and non-chunked.
const FORBIDDEN_HEADERS: &[&str] = &["transfer-encoding", "content-encoding"];

/// Response header map, keyed by lowercased header name.
pub type Headers = HashMap<String, String>;

/// Failure to obtain a resource from the network collaborator.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The URL could not be parsed or resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// The URL scheme is neither `http`, `https` nor `file`.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    /// The connection could not be established or was interrupted.
    #[error("request failed: {0}")]
    Connection(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP error: {0}")]
    Status(u16),
    /// The response carried a header the engine cannot process.
    #[error("response uses unsupported header '{0}'")]
    ForbiddenHeader(String),
    /// The response body could not be read as text.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// A `file:` URL could not be read.
    #[error("failed to read '{path}': {message}")]
    File {
        /// Local path derived from the URL.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
}

/// Headers and body of a successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Response headers (lowercased names, trimmed values).
    pub headers: Headers,
    /// Response body as text.
    pub body: String,
}

/// The network collaborator contract.
///
/// Implementations must attach stored cookies to requests for a matching
/// host, honoring the `SameSite=Lax` restriction against `top_level`.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`. A `payload` turns the request into a POST.
    ///
    /// # Errors
    ///
    /// Returns a [`NetworkError`] on connection failure, non-2xx status, or
    /// forbidden response headers.
    fn fetch(
        &self,
        url: &Url,
        top_level: Option<&Url>,
        payload: Option<&str>,
    ) -> Result<Response, NetworkError>;
}

/// A cookie stored for a host, with its attributes.
///
/// [RFC 6265 § 5.2](https://www.rfc-editor.org/rfc/rfc6265#section-5.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// The `name=value` pair sent back in the `Cookie` header.
    pub value: String,
    /// Lowercased attributes (`samesite`, `httponly`, ...). Flag attributes
    /// are stored with the value `"true"`.
    pub params: HashMap<String, String>,
}

impl Cookie {
    /// Parse a `Set-Cookie` header value.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut parts = header.split(';');
        let value = parts.next().unwrap_or_default().trim().to_string();
        let params = parts
            .filter(|param| !param.trim().is_empty())
            .map(|param| match param.trim().split_once('=') {
                Some((name, value)) => (name.trim().to_lowercase(), value.trim().to_lowercase()),
                None => (param.trim().to_lowercase(), "true".to_string()),
            })
            .collect();
        Self { value, params }
    }

    /// The cookie's `SameSite` policy, `"none"` when absent.
    #[must_use]
    pub fn same_site(&self) -> &str {
        self.params.get("samesite").map_or("none", String::as_str)
    }
}

/// In-memory cookie storage keyed by host.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<HashMap<String, Cookie>>,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the `Set-Cookie` header received from `host`.
    pub fn store(&self, host: &str, set_cookie: &str) {
        let _ = self
            .cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.to_string(), Cookie::parse(set_cookie));
    }

    /// The `Cookie` header value to attach to a request, if any.
    ///
    /// A `SameSite=Lax` cookie is withheld from non-GET requests whose
    /// top-level document has a different origin than the request.
    #[must_use]
    pub fn cookie_for(&self, url: &Url, top_level: Option<&Url>, method: &str) -> Option<String> {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let cookie = cookies.get(url.host_str()?)?;
        if let Some(top_level) = top_level
            && cookie.same_site() == "lax"
            && method != "GET"
            && origin(url) != origin(top_level)
        {
            return None;
        }
        Some(cookie.value.clone())
    }
}

/// Blocking HTTP fetcher with a cookie jar.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    cookies: CookieJar,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh HTTP client and an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Connection`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, NetworkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| NetworkError::Connection(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            cookies: CookieJar::new(),
        })
    }

    /// The cookie jar shared by every request made through this fetcher.
    #[must_use]
    pub const fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    fn fetch_file(url: &Url) -> Result<Response, NetworkError> {
        let path = url
            .to_file_path()
            .map_err(|()| NetworkError::InvalidUrl(url.to_string()))?;
        let body = std::fs::read_to_string(&path).map_err(|e| NetworkError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Response {
            headers: Headers::new(),
            body,
        })
    }

    fn fetch_http(
        &self,
        url: &Url,
        top_level: Option<&Url>,
        payload: Option<&str>,
    ) -> Result<Response, NetworkError> {
        let (method, mut request) = match payload {
            Some(body) => ("POST", self.client.post(url.as_str()).body(body.to_string())),
            None => ("GET", self.client.get(url.as_str())),
        };
        request = request.header(USER_AGENT, USER_AGENT_STRING);
        if let Some(cookie) = self.cookies.cookie_for(url, top_level, method) {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .map_err(|e| NetworkError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            let value = value.to_str().unwrap_or_default().trim().to_string();
            let _ = headers.insert(name.as_str().to_ascii_lowercase(), value);
        }

        if let Some(forbidden) = FORBIDDEN_HEADERS.iter().find(|h| headers.contains_key(**h)) {
            return Err(NetworkError::ForbiddenHeader((*forbidden).to_string()));
        }

        if let (Some(set_cookie), Some(host)) = (headers.get("set-cookie"), url.host_str()) {
            self.cookies.store(host, set_cookie);
        }

        let body = response
            .text()
            .map_err(|e| NetworkError::Body(e.to_string()))?;
        Ok(Response { headers, body })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &Url,
        top_level: Option<&Url>,
        payload: Option<&str>,
    ) -> Result<Response, NetworkError> {
        match url.scheme() {
            "http" | "https" => self.fetch_http(url, top_level, payload),
            "file" => Self::fetch_file(url),
            other => Err(NetworkError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::parse_url;

    #[test]
    fn test_cookie_parse_params() {
        let cookie = Cookie::parse("session=abc123; SameSite=Lax; HttpOnly");
        assert_eq!(cookie.value, "session=abc123");
        assert_eq!(cookie.same_site(), "lax");
        assert_eq!(cookie.params.get("httponly").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_cookie_sent_to_matching_host() {
        let jar = CookieJar::new();
        jar.store("example.org", "token=1");
        let url = parse_url("http://example.org/page").unwrap();
        assert_eq!(jar.cookie_for(&url, None, "GET").as_deref(), Some("token=1"));

        let other = parse_url("http://other.test/page").unwrap();
        assert_eq!(jar.cookie_for(&other, None, "GET"), None);
    }

    #[test]
    fn test_lax_cookie_withheld_on_cross_origin_post() {
        let jar = CookieJar::new();
        jar.store("example.org", "token=1; samesite=lax");
        let url = parse_url("http://example.org/submit").unwrap();
        let evil = parse_url("http://evil.test/").unwrap();
        let same = parse_url("http://example.org/form").unwrap();

        assert_eq!(jar.cookie_for(&url, Some(&evil), "POST"), None);
        assert_eq!(jar.cookie_for(&url, Some(&evil), "GET").as_deref(), Some("token=1"));
        assert_eq!(jar.cookie_for(&url, Some(&same), "POST").as_deref(), Some("token=1"));
    }
}
