//! Session management
//!
//! The crawler authenticates with cookies copied from a browser. They arrive
//! as a single `name=value; name=value` string in an environment variable,
//! are parsed once at startup into a [`Session`], and are handed to the HTTP
//! client as a read-only cookie store. `Set-Cookie` headers from the server
//! are ignored, so nothing mutates the session afterwards.

use crate::SessionError;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// The raw credential string
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a credential string, rejecting empty or whitespace-only input
    pub fn new(raw: impl Into<String>, var: &str) -> Result<Self, SessionError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionError::MissingCredential {
                var: var.to_string(),
            });
        }
        Ok(Self(raw))
    }

    /// Reads the credential from the named environment variable
    pub fn from_env(var: &str) -> Result<Self, SessionError> {
        match std::env::var(var) {
            Ok(raw) => Self::new(raw, var),
            Err(_) => Err(SessionError::MissingCredential {
                var: var.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A single cookie parsed from the credential
#[derive(Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

impl fmt::Debug for CookiePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookiePair")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Splits a credential string into cookie pairs
///
/// Pairs are separated by `;` and surrounding whitespace is ignored, as are
/// empty segments (a trailing `;`). Each pair is split on its first `=`, so
/// values may themselves contain `=`. A pair without `=` or with an empty
/// name is rejected.
pub fn parse_cookie_pairs(raw: &str) -> Result<Vec<CookiePair>, SessionError> {
    let mut pairs = Vec::new();

    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| SessionError::MalformedPair {
                pair: segment.to_string(),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::MalformedPair {
                pair: segment.to_string(),
            });
        }

        pairs.push(CookiePair {
            name: name.to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(pairs)
}

/// Authenticated cookie context for one crawl
#[derive(Debug, Clone)]
pub struct Session {
    cookies: Vec<CookiePair>,
    domain: Option<String>,
}

impl Session {
    /// Builds a session from a credential
    ///
    /// # Arguments
    ///
    /// * `credential` - The raw `name=value; ...` string
    /// * `domain` - Cookie domain; `None` binds cookies to the exact host of
    ///   the URL later passed to [`Session::cookie_store`]
    pub fn from_credential(
        credential: &Credential,
        domain: Option<String>,
    ) -> Result<Self, SessionError> {
        let cookies = parse_cookie_pairs(credential.as_str())?;
        Ok(Self { cookies, domain })
    }

    pub fn cookies(&self) -> &[CookiePair] {
        &self.cookies
    }

    /// Builds the cookie store handed to the HTTP client
    ///
    /// Cookies are sent to the host of `base_url`, or to every host under
    /// the session domain when one is set.
    ///
    /// # Errors
    ///
    /// * `SessionError::MalformedPair` - A cookie contains characters that
    ///   cannot appear in a header
    pub fn cookie_store(&self, base_url: &Url) -> Result<Arc<SessionCookies>, SessionError> {
        let scope = match &self.domain {
            Some(domain) => CookieScope::Domain(domain.clone()),
            None => CookieScope::Host(base_url.host_str().unwrap_or_default().to_string()),
        };

        let header = if self.cookies.is_empty() {
            None
        } else {
            let joined = self
                .cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&joined).map_err(|_| {
                SessionError::MalformedPair {
                    pair: "cookie value with non-header characters".to_string(),
                }
            })?;
            Some(value)
        };

        tracing::debug!(
            "Registered {} session cookies for {}",
            self.cookies.len(),
            scope
        );

        Ok(Arc::new(SessionCookies { header, scope }))
    }
}

/// Hosts a session cookie header is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieScope {
    /// Exactly this host
    Host(String),
    /// This domain and its subdomains
    Domain(String),
}

impl CookieScope {
    fn covers(&self, host: &str) -> bool {
        match self {
            Self::Host(expected) => host.eq_ignore_ascii_case(expected),
            Self::Domain(domain) => domain_matches(host, domain),
        }
    }
}

impl fmt::Display for CookieScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(host) => f.write_str(host),
            Self::Domain(domain) => write!(f, "*.{}", domain.trim_start_matches('.')),
        }
    }
}

/// Read-only cookie store carrying the session cookies
///
/// Unlike a regular jar it never records `Set-Cookie` responses, so a server
/// that overwrites or expires a cookie cannot change what later requests send.
pub struct SessionCookies {
    header: Option<HeaderValue>,
    scope: CookieScope,
}

impl fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookies")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, _cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        tracing::trace!("Ignoring Set-Cookie from {}", url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        if self.scope.covers(host) {
            self.header.clone()
        } else {
            None
        }
    }
}

/// Cookie domain matching: exact host, or host is a subdomain of `domain`
pub fn domain_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();

    if domain.is_empty() {
        return false;
    }

    host == domain || host.ends_with(&format!(".{}", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_header(session: &Session, url: &str) -> Option<String> {
        let url = Url::parse(url).unwrap();
        session
            .cookie_store(&url)
            .unwrap()
            .cookies(&url)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_parse_cookie_pairs() {
        let pairs = parse_cookie_pairs("ipb_member_id=42; ipb_pass_hash=abc;igneous=x").unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].name, "ipb_member_id");
        assert_eq!(pairs[0].value, "42");
        assert_eq!(pairs[1].name, "ipb_pass_hash");
        assert_eq!(pairs[2].value, "x");
    }

    #[test]
    fn test_value_keeps_everything_after_first_equals() {
        let pairs = parse_cookie_pairs("token=abc==").unwrap();
        assert_eq!(pairs[0].value, "abc==");
    }

    #[test]
    fn test_trailing_separator_ignored() {
        let pairs = parse_cookie_pairs("a=1;").unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_pair_without_equals_rejected() {
        let err = parse_cookie_pairs("a=1; garbage").unwrap_err();
        assert!(matches!(err, SessionError::MalformedPair { pair } if pair == "garbage"));
    }

    #[test]
    fn test_pair_with_empty_name_rejected() {
        assert!(parse_cookie_pairs("=value").is_err());
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let err = Credential::new("   ", "EHENTAI_COOKIE").unwrap_err();
        assert!(matches!(err, SessionError::MissingCredential { var } if var == "EHENTAI_COOKIE"));
    }

    #[test]
    fn test_unset_env_var_is_missing() {
        let err = Credential::from_env("GALLERY_CRAWLER_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, SessionError::MissingCredential { .. }));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret=hunter2", "X").unwrap();
        assert!(!format!("{:?}", credential).contains("hunter2"));
    }

    #[test]
    fn test_cookie_store_host_only() {
        let credential = Credential::new("ipb_member_id=42", "X").unwrap();
        let session = Session::from_credential(&credential, None).unwrap();

        assert_eq!(
            store_header(&session, "https://exhentai.org/"),
            Some("ipb_member_id=42".to_string())
        );

        let base = Url::parse("https://exhentai.org/").unwrap();
        let store = session.cookie_store(&base).unwrap();
        let sub = Url::parse("https://www.exhentai.org/").unwrap();
        assert!(store.cookies(&sub).is_none());
    }

    #[test]
    fn test_cookie_store_sends_all_cookies() {
        let credential = Credential::new("a=1; b=2", "X").unwrap();
        let session =
            Session::from_credential(&credential, Some("exhentai.org".to_string())).unwrap();

        let header = store_header(&session, "https://exhentai.org/?prev=5").unwrap();
        assert_eq!(header, "a=1; b=2");
    }

    #[test]
    fn test_cookie_store_scoped_to_domain() {
        let credential = Credential::new("a=1", "X").unwrap();
        let session =
            Session::from_credential(&credential, Some("exhentai.org".to_string())).unwrap();
        let base = Url::parse("https://exhentai.org/").unwrap();
        let store = session.cookie_store(&base).unwrap();

        let sub = Url::parse("https://www.exhentai.org/").unwrap();
        assert!(store.cookies(&sub).is_some());
        let other = Url::parse("https://example.com/").unwrap();
        assert!(store.cookies(&other).is_none());
    }

    #[test]
    fn test_set_cookie_does_not_change_session() {
        let credential = Credential::new("ipb_member_id=42", "X").unwrap();
        let session = Session::from_credential(&credential, None).unwrap();
        let url = Url::parse("https://exhentai.org/?prev=10").unwrap();
        let store = session.cookie_store(&url).unwrap();

        let overwrite = HeaderValue::from_static("ipb_member_id=0; Path=/");
        let expire = HeaderValue::from_static("ipb_member_id=; Max-Age=0; Path=/");
        store.set_cookies(&mut [&overwrite, &expire].into_iter(), &url);

        let header = store.cookies(&url).unwrap();
        assert_eq!(header.to_str().unwrap(), "ipb_member_id=42");
    }

    #[test]
    fn test_empty_session_sends_no_header() {
        let credential = Credential::new(";", "X").unwrap();
        let session = Session::from_credential(&credential, None).unwrap();
        assert_eq!(store_header(&session, "https://exhentai.org/"), None);
    }

    #[test]
    fn test_domain_matches() {
        assert!(domain_matches("exhentai.org", "exhentai.org"));
        assert!(domain_matches("www.exhentai.org", "exhentai.org"));
        assert!(domain_matches("www.exhentai.org", ".exhentai.org"));
        assert!(domain_matches("EXHENTAI.org", "exhentai.ORG"));

        assert!(!domain_matches("exhentai.org", "www.exhentai.org"));
        assert!(!domain_matches("notexhentai.org", "exhentai.org"));
        assert!(!domain_matches("exhentai.org", ""));
    }
}
