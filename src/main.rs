#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use memogate::{
    configure_services, routes, OAuthConfig, RouteGuard, SessionIssuer, MemogateSettings,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = MemogateSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.backend.timeout_seconds))
        .build()
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;

    let oauth_config = OAuthConfig::from_settings(&settings, &http_client)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize OAuth providers: {e}")))?;
    let issuer = SessionIssuer::from_settings(&settings, http_client);

    start_server(oauth_config, issuer, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    oauth_config: OAuthConfig,
    issuer: SessionIssuer,
    settings: MemogateSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &oauth_config, &settings);

    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(oauth_config.clone()))
            .app_data(web::Data::new(issuer.clone()))
            .app_data(web::Data::new(settings.clone()))
            .wrap(RouteGuard)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, oauth_config: &OAuthConfig, settings: &MemogateSettings) {
    println!("Starting memogate v{} on http://{bind_address}", memogate::VERSION);
    println!("Environment: {}", settings.application.environment);
    println!("Backend API: {}", settings.backend.api_base_url);
    println!();
    println!("Pages:");
    println!("  GET  {}              - Login page", routes::LOGIN);
    println!("  GET|POST {}          - Memo page (requires session)", routes::MEMOS);
    println!();
    println!("OAuth endpoints:");
    for provider in oauth_config.configured_providers() {
        println!(
            "  GET  {} - {provider} sign-in",
            routes::sign_in_path(provider.slug())
        );
    }
    println!("  GET  {}      - Kakao/Naver callback", routes::AUTH_CALLBACK);
    println!("  POST {}        - Google token login", routes::GOOGLE_TOKEN_LOGIN);
    println!("  GET|POST {}    - Clear session", routes::LOGOUT);
    println!();
    println!("OAuth redirect URIs to register with the providers:");
    println!("  {}", settings.callback_url());
    println!("  {} (Google)", settings.google_callback_url());
    println!();
    println!("System endpoints:");
    println!("  GET  {}            - Health check", routes::HEALTH);
    println!("  GET  /static/*        - Static files");
    println!(
        "  Static files folder: {}",
        settings.static_files.assets_folder
    );
}
