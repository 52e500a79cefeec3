//! Covermap Web Server
//!
//! Axum-based REST API for questionnaires and risk assessments.
//!
//! Security features:
//! - Pre-shared API key authentication (secure by default, use --no-auth for local dev)
//! - Questionnaires scoped to the caller named by the upstream identity proxy
//! - Restrictive CORS policy
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use covermap_core::ai::{AIClient, AdviceBackend};
use covermap_core::db::Database;

mod handlers;

/// Maximum accepted request body (answers are small)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Maximum audit log page size
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the caller identity, set by the upstream identity proxy
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "COVERMAP_API_KEYS";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Accepted API keys, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Read API keys from `COVERMAP_API_KEYS`
    pub fn from_env(require_auth: bool) -> Self {
        let api_keys = std::env::var(API_KEYS_ENV)
            .map(|v| parse_api_keys(&v))
            .unwrap_or_default();

        Self {
            require_auth,
            api_keys,
            ..Self::default()
        }
    }
}

/// Split a comma-separated key list, dropping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub ai: Option<AIClient>,
}

/// The token from an `Authorization: Bearer <token>` header, if any
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

/// Reject /api requests without a configured API key
///
/// Keys are compared in constant time. The identity header never
/// authenticates on its own; it only names the caller (see [`caller_identity`]).
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = !state.config.require_auth
        || bearer_token(request.headers())
            .is_some_and(|key| validate_api_key(key, &state.config.api_keys));

    if authorized {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected request without a valid API key");
    AppError::client(StatusCode::UNAUTHORIZED, "Authentication required").into_response()
}

fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    // Slices of different lengths compare unequal without touching contents
    valid_keys
        .iter()
        .any(|key| bool::from(provided.as_bytes().ct_eq(key.as_bytes())))
}

/// Who the request acts for
///
/// The identity proxy's user header wins; a bare API key acts as "api-key";
/// with neither, the caller is the local development user.
pub fn caller_identity(headers: &HeaderMap) -> String {
    let proxied = headers
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match proxied {
        Some(user) => user.to_string(),
        None if bearer_token(headers).is_some() => "api-key".to_string(),
        None => "local-dev".to_string(),
    }
}

/// Create the application router, configuring advice generation from the environment
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let ai = AIClient::from_env();
    match ai {
        Some(ref client) => info!(
            "Advice backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("ℹ️  Advice backend not configured (set OPENAI_API_KEY to enable generated advice)"),
    }

    create_router_with_ai(db, static_dir, config, ai)
}

/// Create the application router with an explicit advice client (for testing)
pub fn create_router_with_ai(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    ai: Option<AIClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        ai,
    });

    let mut app = Router::new()
        .nest("/api", api_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Routed after the auth layer so probes need no key
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins));

    for (name, value) in security_headers() {
        app = app.layer(SetResponseHeaderLayer::overriding(name, value));
    }

    // The questionnaire front end, when one is shipped alongside
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Headers set on every response
fn security_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
            ),
        ),
    ]
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/questionnaires",
            get(handlers::list_questionnaires).post(handlers::create_questionnaire),
        )
        .route("/questionnaires/:id", get(handlers::get_questionnaire))
        .route("/questionnaires/:id/answers", put(handlers::update_answers))
        .route(
            "/questionnaires/:id/complete",
            post(handlers::complete_questionnaire),
        )
        .route("/assess", post(handlers::assess_answers))
        .route("/audit", get(handlers::list_audit_log))
}

/// Same-origin only unless origins are configured
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        return cors;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    cors.allow_origin(origins)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!(
            "⚠️  Authentication required but {} is empty - every /api request will be rejected",
            API_KEYS_ENV
        );
    }

    check_ai_connection().await;

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log advice backend connection status
async fn check_ai_connection() {
    match AIClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Advice backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Advice backend configured but not responding: {} - reports will use fallback advice",
                    client.host()
                );
            }
        }
        None => {
            info!("ℹ️  Advice backend not configured - reports will use fallback advice");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    /// A client-facing error; the message is returned as-is
    fn client(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::client(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::client(StatusCode::NOT_FOUND, msg)
    }

    /// Map a core error, keeping not-found and invalid-input distinct from 500s
    pub fn from_core(err: covermap_core::Error) -> Self {
        match err {
            covermap_core::Error::QuestionnaireNotFound(_) => Self::not_found(&err.to_string()),
            covermap_core::Error::InvalidAnswer(_) => Self::bad_request(&err.to_string()),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err.into()),
        }
    }
}
