//! Session Management Module
//!
//! Sessions are minted by the backend API; this service only relays them as
//! the `access_token` cookie.
//!
//! # Modules
//!
//! - [`issuer`] - Backend exchange of an OAuth identity for a session token
//! - [`cookie`] - Cookie construction and the cookie names in use
//! - [`attempt`] - Login attempt state machine

pub mod attempt;
pub mod cookie;
pub mod issuer;

pub use attempt::{IllegalTransition, LoginAttempt, LoginStage};
pub use cookie::{
    has_session_cookie, CookieFactory, CookieOptions, DEFAULT_SESSION_MAX_AGE_SECONDS,
    REDIRECT_COOKIE, SESSION_COOKIE,
};
pub use issuer::{IssuedSession, SessionError, SessionIssuer, UserResponse};
