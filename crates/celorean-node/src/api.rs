//! HTTP API server for the Celorean node.
//!
//! Provides REST endpoints for wallet sign-in, session checks, and credential
//! issuance, verification, and listing.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use celorean_auth::{AuthError, IssuedChallenge, LoginRequest, SessionStatus, SESSION_COOKIE_NAME};
use celorean_core::Environment;
use celorean_credentials::{CredentialError, CredentialSummary, IssueRequest};

use crate::state::AppState;

// --- Errors ---

/// Handler failure, rendered as `{"error": ...}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Logged server-side; the client only sees a generic message.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            Self::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidAddress(_)
            | AuthError::InvalidSignature(_)
            | AuthError::InvalidToken(_) => Self::BadRequest(err.to_string()),
            AuthError::SignatureMismatch => Self::Unauthorized(err.to_string()),
            AuthError::UpstreamFailure(_) | AuthError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidStudent(_) | CredentialError::InvalidContentId(_) => {
                Self::BadRequest(err.to_string())
            }
            CredentialError::NotFound(_) => Self::NotFound(err.to_string()),
            CredentialError::IssuanceFailed(_)
            | CredentialError::Store(_)
            | CredentialError::Serialization(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

// --- Request/response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueQuery {
    pub environment: Option<String>,
    pub contract_address: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub success: bool,
    pub cid: String,
    pub credential: celorean_credentials::CredentialDocument,
    pub gateway_url: String,
    pub ipfs_url: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub cid: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub gateway_url: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub student: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub items: Vec<CredentialSummary>,
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_nonce(State(state): State<Arc<AppState>>) -> Result<Json<IssuedChallenge>, ApiError> {
    let ttl_ms = state.authenticator.config().challenge_ttl_ms;
    let challenge = state
        .authenticator
        .challenges()
        .issue(&state.public_origin, &state.public_host, ttl_ms)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(challenge))
}

async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<OkResponse>), ApiError> {
    let Json(req) = body?;
    let outcome = match state.authenticator.login(&req).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "login rejected");
            return Err(e.into());
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE_NAME, outcome.cookie_value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookie.secure)
        .path("/")
        .max_age(time::Duration::seconds(state.cookie.max_age_secs));
    Ok((jar.add(cookie), Json(OkResponse { ok: true })))
}

async fn handle_session(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<SessionStatus> {
    let value = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());
    Json(state.authenticator.session_status(value.as_deref()))
}

async fn handle_logout(jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    let removal = Cookie::build(SESSION_COOKIE_NAME).path("/");
    (jar.remove(removal), Json(OkResponse { ok: true }))
}

async fn handle_issue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<IssueQuery>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    if !state.admins.is_empty() {
        let value = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());
        let status = state.authenticator.session_status(value.as_deref());
        let Some(session) = status.session else {
            return Err(ApiError::Unauthorized("sign in to issue credentials".into()));
        };
        if !state.may_issue(&session.subject_address) {
            tracing::warn!(subject = %session.subject_address, "issuance refused for non-admin");
            return Err(ApiError::Forbidden("not allowed to issue credentials".into()));
        }
    }

    let Json(req) = body?;
    let environment = match query.environment.as_deref() {
        Some(raw) => raw
            .parse::<Environment>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Environment::default(),
    };

    let issued = state
        .issuer
        .issue(&req, environment, query.contract_address.as_deref())
        .await?;

    Ok(Json(IssueResponse {
        success: true,
        cid: issued.content_id.to_string(),
        credential: issued.document,
        gateway_url: issued.gateway_url,
        ipfs_url: issued.ipfs_url,
    }))
}

async fn handle_verify(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(req) = body?;
    let outcome = state.verifier.verify(&req.cid).await?;
    Ok(Json(VerifyResponse {
        valid: outcome.valid,
        data: outcome.document,
        reason: outcome.reason,
        gateway_url: outcome.gateway_url,
    }))
}

async fn handle_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let student = query
        .student
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing student".into()))?;
    let items = state.verifier.list(&student).await?;
    Ok(Json(ListResponse {
        success: true,
        items,
    }))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/auth/nonce", get(handle_nonce))
        .route("/api/auth/verify", post(handle_login))
        .route("/api/auth/session", get(handle_session))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/credentials", get(handle_list))
        .route("/api/credentials/issue", post(handle_issue))
        .route("/api/credentials/verify", post(handle_verify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
