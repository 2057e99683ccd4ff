//! Route guard
//!
//! Every request passes through [`RouteGuard`], which decides from the path and
//! the presence of the `access_token` cookie whether to let it through or to
//! answer with a `302 Found`.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;

use crate::routes;
use crate::session::{has_session_cookie, SESSION_COOKIE};
use crate::utils::responses::ResponseBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { return_path: Option<String> },
    RedirectToMemos,
}

impl GuardDecision {
    /// Target of the redirect, `None` for [`GuardDecision::Allow`]
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { return_path: None } => Some(routes::LOGIN.to_string()),
            Self::RedirectToLogin {
                return_path: Some(path),
            } => Some(format!(
                "{}?redirect={}",
                routes::LOGIN,
                urlencoding::encode(path)
            )),
            Self::RedirectToMemos => Some(routes::MEMOS.to_string()),
        }
    }
}

/// Decide what to do with a request path given whether a session cookie is present
#[must_use]
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if path == routes::HOME {
        return if authenticated {
            GuardDecision::RedirectToMemos
        } else {
            GuardDecision::RedirectToLogin { return_path: None }
        };
    }

    if path == routes::LOGIN && authenticated {
        return GuardDecision::RedirectToMemos;
    }

    if !authenticated && is_protected(path) {
        return GuardDecision::RedirectToLogin {
            return_path: Some(path.to_string()),
        };
    }

    GuardDecision::Allow
}

fn is_protected(path: &str) -> bool {
    routes::PROTECTED_PATHS
        .iter()
        .any(|protected| path.starts_with(protected))
}

fn is_unguarded(path: &str) -> bool {
    routes::UNGUARDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Middleware applying [`decide`] to every request
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RouteGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct RouteGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RouteGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path().to_string();
            if !is_unguarded(&path) {
                let authenticated = has_session_cookie(req.cookie(SESSION_COOKIE).as_ref());
                if let Some(location) = decide(&path, authenticated).location() {
                    log::debug!("Route guard redirecting {path} to {location}");
                    let (req, _) = req.into_parts();
                    let response = ResponseBuilder::redirect(&location, Vec::new());
                    return Ok(ServiceResponse::new(req, response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_redirects_by_auth_state() {
        assert_eq!(decide("/", true), GuardDecision::RedirectToMemos);
        assert_eq!(
            decide("/", false).location().as_deref(),
            Some("/login")
        );
    }

    #[test]
    fn test_login_while_authenticated_goes_to_memos() {
        assert_eq!(decide("/login", true), GuardDecision::RedirectToMemos);
        assert_eq!(decide("/login", false), GuardDecision::Allow);
    }

    #[test]
    fn test_protected_paths_require_cookie() {
        let decision = decide("/memos", false);
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                return_path: Some("/memos".to_string())
            }
        );
        assert_eq!(
            decision.location().as_deref(),
            Some("/login?redirect=%2Fmemos")
        );
        assert_eq!(
            decide("/memos/12", false).location().as_deref(),
            Some("/login?redirect=%2Fmemos%2F12")
        );
        assert_eq!(decide("/memos", true), GuardDecision::Allow);
    }

    #[test]
    fn test_other_paths_are_allowed() {
        for path in ["/auth/callback", "/auth/kakao/sign_in", "/about"] {
            assert_eq!(decide(path, false), GuardDecision::Allow, "{path}");
            assert_eq!(decide(path, true), GuardDecision::Allow, "{path}");
        }
    }

    #[test]
    fn test_unguarded_prefixes() {
        assert!(is_unguarded("/static/app.css"));
        assert!(is_unguarded("/api/memos"));
        assert!(is_unguarded("/ping"));
        assert!(!is_unguarded("/memos"));
    }
}
