// HTTP request handlers for the login front and memo pages
pub mod auth;
pub mod callback;
pub mod pages;
pub mod static_files;

pub use auth::{google_token_login, oauth_logout, oauth_sign_in};
pub use callback::{callback_query_config, oauth_callback};
pub use pages::{create_memo, google_callback_page, login_page, memos_page};
pub use static_files::{health, serve_static};

use crate::routes;
use actix_web::web;

/// Register every route; shared by `main` and the integration tests
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Pages
        .route(routes::LOGIN, web::get().to(login_page))
        .route(routes::MEMOS, web::get().to(memos_page))
        .route(routes::MEMOS, web::post().to(create_memo))
        // OAuth endpoints
        .service(
            web::resource(routes::AUTH_CALLBACK)
                .app_data(callback_query_config())
                .route(web::get().to(oauth_callback)),
        )
        .route(routes::GOOGLE_CALLBACK, web::get().to(google_callback_page))
        .route(routes::GOOGLE_TOKEN_LOGIN, web::post().to(google_token_login))
        .route(routes::LOGOUT, web::get().to(oauth_logout))
        .route(routes::LOGOUT, web::post().to(oauth_logout))
        .route("/auth/{provider}/sign_in", web::get().to(oauth_sign_in))
        // Static files endpoint
        .route("/static/{filename}", web::get().to(serve_static))
        // Health endpoint
        .route(routes::HEALTH, web::get().to(health));
}
