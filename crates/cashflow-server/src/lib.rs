//! CashFlow Web Server
//!
//! Axum-based REST API over the CashFlow classification and transaction store.
//!
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Security headers on every response
//! - Sanitized error responses: domain errors map to 4xx with their message,
//!   everything else is logged and returned as a generic 500

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info};

use cashflow_core::db::Database;
use cashflow_core::{PaginationSettings, ServerSettings};

mod handlers;

/// Maximum accepted JSON request body (10 KB)
pub const MAX_BODY_SIZE: usize = 1024 * 10;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Page sizes for transaction listings
    pub pagination: PaginationSettings,
}

impl ServerConfig {
    /// Build from the loaded application settings
    pub fn from_settings(server: &ServerSettings, pagination: PaginationSettings) -> Self {
        Self {
            allowed_origins: server.allowed_origins.clone(),
            pagination,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let cors = cors_layer(&config.allowed_origins);
    let state = Arc::new(AppState { db, config });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/reference-data", get(handlers::reference_data))
        // Statuses
        .route(
            "/statuses",
            get(handlers::list_statuses).post(handlers::create_status),
        )
        .route(
            "/statuses/:id",
            get(handlers::get_status)
                .put(handlers::update_status)
                .delete(handlers::delete_status),
        )
        // Transaction types
        .route(
            "/transaction-types",
            get(handlers::list_transaction_types).post(handlers::create_transaction_type),
        )
        .route(
            "/transaction-types/:id",
            get(handlers::get_transaction_type)
                .put(handlers::update_transaction_type)
                .delete(handlers::delete_transaction_type),
        )
        .route(
            "/transaction-types/:id/categories",
            get(handlers::list_categories_of_type),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/categories/:id/subcategories",
            get(handlers::list_subcategories_of_category),
        )
        // Subcategories
        .route(
            "/subcategories",
            get(handlers::list_subcategories).post(handlers::create_subcategory),
        )
        .route(
            "/subcategories/:id",
            get(handlers::get_subcategory)
                .put(handlers::update_subcategory)
                .delete(handlers::delete_subcategory),
        )
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/summary", get(handlers::transaction_summary))
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        );

    // CSP: same-origin scripts, inline styles for the front end
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        layer
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        "Database: {} ({} transactions)",
        db.path(),
        db.count_transactions()?
    );

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, kind: &'static str, msg: &str) -> Self {
        Self {
            status,
            kind,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message,
            "kind": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        let core = match err.downcast::<cashflow_core::Error>() {
            Ok(core) => core,
            Err(err) => {
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    // Return generic message to client
                    message: "An internal error occurred".to_string(),
                    // Keep full error for logging
                    internal: Some(err),
                }
            }
        };

        use cashflow_core::Error as CoreError;
        let status = match &core {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::DuplicateKey(_) | CoreError::ReferentialConflict(_) => StatusCode::CONFLICT,
            CoreError::InconsistentClassification(_)
            | CoreError::InvalidFilter(_)
            | CoreError::InvalidData(_) => StatusCode::BAD_REQUEST,
            _ => {
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "An internal error occurred".to_string(),
                    internal: Some(core.into()),
                }
            }
        };

        Self {
            status,
            kind: core.kind(),
            message: core.to_string(),
            internal: None,
        }
    }
}

#[cfg(test)]
mod tests;
