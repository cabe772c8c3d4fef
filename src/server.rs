//! Explicit application assembly: adapters, CORS, JSON handling and the
//! HTTP server itself. Nothing here is global; `main` builds a state from
//! [`Settings`] and hands it to [`run`].

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use thiserror::Error;
use crate::config::{CorsSettings, Settings};
use crate::error::handle_json_payload_error;
use crate::routes::{self, AppState};
use crate::services::{EmailClient, EmailError, GeminiClient, GeminiError, SheetsClient, SheetsError};

/// Failures while wiring adapters at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Gemini client: {0}")]
    Gemini(#[from] GeminiError),

    #[error("Sheets client: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Email client: {0}")]
    Email(#[from] EmailError),
}

impl AppState {
    /// Build the production adapters from configuration
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        let sheets = SheetsClient::new(&settings.sheets)?;
        if !sheets.is_configured() {
            tracing::warn!("Google Sheets is not configured; leads will not be persisted");
        }
        if settings.gemini.api_key.trim().is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; scholarship calculation will fail");
        }
        if settings.email.api_key.trim().is_empty() {
            tracing::warn!("Email API key is not set; reports will not be delivered");
        }

        Ok(Self {
            service_name: settings.server.service_name.clone(),
            matcher: Arc::new(GeminiClient::new(&settings.gemini)?),
            leads: Arc::new(sheets),
            mailer: Arc::new(EmailClient::new(&settings.email)?),
        })
    }
}

/// JSON extractor config mapping malformed bodies to `{detail}` 400s
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Allow-listed origins, any method, any header. Origins are checked by
/// `CorsSettings::validate` when settings load.
pub fn build_cors(settings: &CorsSettings) -> Cors {
    settings
        .origins()
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

/// Start the HTTP server and run until shutdown
pub async fn run(settings: Settings, state: AppState) -> std::io::Result<()> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let cors_settings = settings.cors.clone();

    tracing::info!(origins = ?cors_settings.origins(), "CORS allow-list");
    tracing::info!("Starting HTTP server on {}:{}", host, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config())
            .wrap(build_cors(&cors_settings))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server.bind((host, port))?.run().await
}
