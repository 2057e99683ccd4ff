use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Session cookie shared with the backend API
pub const SESSION_COOKIE: &str = "access_token";

/// Carries the post-login return path across the provider round trip
pub const REDIRECT_COOKIE: &str = "oauth_redirect";

/// Session lifetime when the backend does not say otherwise
pub const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 86_400;

const REDIRECT_COOKIE_MAX_AGE_MINUTES: i64 = 10;

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age: Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECONDS),
        }
    }
}

/// Builds every cookie this service sets, applying the `Secure` policy in one place
#[derive(Debug, Clone, Copy)]
pub struct CookieFactory {
    cookie_secure: bool,
}

impl CookieFactory {
    #[must_use]
    pub fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }

    #[must_use]
    pub fn create_cookie(&self, name: &str, value: String, options: CookieOptions) -> Cookie<'static> {
        Cookie::build(name.to_owned(), value)
            .http_only(options.http_only)
            .secure(self.cookie_secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .max_age(options.max_age)
            .finish()
    }

    /// `access_token` cookie living for `max_age_seconds`
    #[must_use]
    pub fn create_session_cookie(&self, access_token: &str, max_age_seconds: i64) -> Cookie<'static> {
        self.create_cookie(
            SESSION_COOKIE,
            access_token.to_string(),
            CookieOptions {
                max_age: Duration::seconds(max_age_seconds),
                ..Default::default()
            },
        )
    }

    /// Short-lived cookie remembering where to land after the provider round trip.
    ///
    /// `SameSite=Lax` so the browser still sends it on the provider's top-level
    /// redirect back to the callback.
    #[must_use]
    pub fn create_redirect_cookie(&self, return_path: &str) -> Cookie<'static> {
        self.create_cookie(
            REDIRECT_COOKIE,
            return_path.to_string(),
            CookieOptions {
                same_site: SameSite::Lax,
                max_age: Duration::minutes(REDIRECT_COOKIE_MAX_AGE_MINUTES),
                ..Default::default()
            },
        )
    }

    /// Cookie that deletes `name` on the client (`Max-Age=0`)
    #[must_use]
    pub fn create_expired_cookie(&self, name: &str) -> Cookie<'static> {
        let same_site = if name == REDIRECT_COOKIE {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        self.create_cookie(
            name,
            String::new(),
            CookieOptions {
                same_site,
                max_age: Duration::ZERO,
                ..Default::default()
            },
        )
    }
}

/// Whether the request carries a non-empty session cookie
#[must_use]
pub fn has_session_cookie(cookie: Option<&Cookie<'_>>) -> bool {
    cookie.is_some_and(|cookie| !cookie.value().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookieFactory::new(true).create_session_cookie("jwt-value", 3600);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "jwt-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn test_development_cookies_are_not_secure() {
        let cookie = CookieFactory::new(false).create_session_cookie("jwt-value", 60);
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_redirect_cookie_is_short_lived_and_lax() {
        let cookie = CookieFactory::new(true).create_redirect_cookie("/memos");
        assert_eq!(cookie.name(), REDIRECT_COOKIE);
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(10)));
    }

    #[test]
    fn test_expired_cookie_clears_value() {
        let cookie = CookieFactory::new(false).create_expired_cookie(SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_session_cookie_presence() {
        assert!(has_session_cookie(Some(&Cookie::new(SESSION_COOKIE, "t"))));
        assert!(!has_session_cookie(Some(&Cookie::new(SESSION_COOKIE, ""))));
        assert!(!has_session_cookie(None));
    }
}
