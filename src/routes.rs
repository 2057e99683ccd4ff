//! Route paths shared by the guard, the handlers and the rendered pages

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const MEMOS: &str = "/memos";
pub const AUTH_CALLBACK: &str = "/auth/callback";
pub const GOOGLE_CALLBACK: &str = "/auth/google/callback";
pub const GOOGLE_TOKEN_LOGIN: &str = "/auth/google";
pub const LOGOUT: &str = "/auth/logout";
pub const HEALTH: &str = "/ping";

/// Path prefixes that require a session cookie
pub const PROTECTED_PATHS: &[&str] = &[MEMOS];

/// Prefixes the route guard never inspects
pub const UNGUARDED_PREFIXES: &[&str] = &["/api", "/static", HEALTH, "/favicon.ico"];

/// Sign-in entry point for a provider slug (`kakao`, `naver`, `google`)
#[must_use]
pub fn sign_in_path(provider_slug: &str) -> String {
    format!("/auth/{provider_slug}/sign_in")
}

/// Login page carrying an `error` code
#[must_use]
pub fn login_with_error(error_code: &str) -> String {
    format!("{LOGIN}?error={error_code}")
}
