//! HTTP response helpers shared by the guard and the handlers

use crate::routes;
use actix_web::{cookie::Cookie, http::header, HttpResponse};
use serde_json::json;

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// `302 Found` to `location`, setting every cookie given
    #[must_use]
    pub fn redirect(location: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder
            .insert_header((header::LOCATION, location))
            .finish()
    }

    /// Redirect to the login page with an `error` code
    #[must_use]
    pub fn login_error_redirect(error_code: &str, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        Self::redirect(&routes::login_with_error(error_code), cookies)
    }

    /// JSON error body in the `{error, message[, detail]}` shape
    #[must_use]
    pub fn json_error(
        status: actix_web::http::StatusCode,
        error_code: &str,
        message: &str,
        detail: Option<&str>,
        cookies: Vec<Cookie<'static>>,
    ) -> HttpResponse {
        let mut builder = HttpResponse::build(status);
        for cookie in cookies {
            builder.cookie(cookie);
        }
        let mut body = json!({
            "error": error_code,
            "message": message
        });
        if let Some(detail) = detail {
            body["detail"] = json!(detail);
        }
        builder.json(body)
    }

    /// HTML page with the given status
    #[must_use]
    pub fn html(status: actix_web::http::StatusCode, body: String) -> HttpResponse {
        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_redirect_sets_location_and_cookies() {
        let response = ResponseBuilder::redirect(
            "/memos",
            vec![Cookie::new("access_token", "abc"), Cookie::new("other", "1")],
        );
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/memos"
        );
        assert_eq!(response.cookies().count(), 2);
    }

    #[actix_web::test]
    async fn test_json_error_includes_detail_only_when_given() {
        let response = ResponseBuilder::json_error(
            StatusCode::UNAUTHORIZED,
            "unknown",
            "failed",
            Some("Email already registered"),
            Vec::new(),
        );
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Email already registered");

        let response =
            ResponseBuilder::json_error(StatusCode::UNAUTHORIZED, "unknown", "failed", None, Vec::new());
        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_login_error_redirect() {
        let response = ResponseBuilder::login_error_redirect("no_code", Vec::new());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?error=no_code"
        );
    }
}
