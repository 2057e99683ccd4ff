use crate::settings::MemogateSettings;
use actix_web::{web, HttpResponse, Result};
use log::debug;
use serde::Serialize;
use std::fs;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Health check endpoint
///
/// # Errors
/// Returns an error if health status cannot be determined
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "memogate login front is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Serve static files from the configured static directory
///
/// # Errors
///
/// Returns an error if the response cannot be built; missing files answer `404`
pub async fn serve_static(
    path: web::Path<String>,
    settings: web::Data<MemogateSettings>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        debug!("Rejected static file name: {filename}");
        return Ok(not_found());
    }

    let file_path = format!("{}/{}", settings.static_files.assets_folder, filename);
    debug!("Attempting to serve static file: {file_path}");

    fs::read(&file_path).map_or_else(
        |_| {
            debug!("Static file not found: {file_path}");
            Ok(not_found())
        },
        |contents| {
            let content_type = match file_path.split('.').next_back() {
                Some("html") => "text/html; charset=utf-8",
                Some("css") => "text/css; charset=utf-8",
                Some("js") => "application/javascript",
                Some("png") => "image/png",
                Some("svg") => "image/svg+xml",
                Some("ico") => "image/x-icon",
                _ => "text/plain",
            };
            Ok(HttpResponse::Ok().content_type(content_type).body(contents))
        },
    )
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "File not found"
    }))
}
