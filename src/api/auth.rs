//! JWT auth for the task API.
//!
//! - Clients register via `/api/auth/register` or log in via `/api/auth/login`
//! - Server returns a JWT valid for `JWT_TTL_DAYS` (default 7)
//! - Protected endpoints require `Authorization: Bearer <jwt>`; the middleware
//!   turns the token claims into an [`Actor`] request extension
//!
//! Tokens are stateless: the role in the token is trusted until it expires.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::ApiJson;
use super::routes::AppState;
use super::types::{AuthResponse, LoginRequest, MeResponse};
use crate::account::{Account, AccountSummary, Actor, Registration, Role};
use crate::task::Capabilities;
use crate::util::bearer_token;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Account id
    sub: String,
    email: String,
    role: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
}

fn issue_jwt(secret: &str, ttl_days: i64, account: &Account) -> anyhow::Result<(String, i64)> {
    let now = Utc::now();
    let exp = now + Duration::days(ttl_days.max(1));
    let claims = Claims {
        sub: account.id.to_string(),
        email: account.email.clone(),
        role: account.role.as_str().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims.exp))
}

fn verify_jwt(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Resolve a bearer token into the acting account.
///
/// Roles this server does not recognise become [`Role::Unknown`], which the
/// task policy denies everything.
pub(crate) fn actor_from_token(token: &str, secret: &str) -> Result<Actor, ApiError> {
    let claims =
        verify_jwt(token, secret).map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;
    let role = Role::parse(&claims.role).unwrap_or(Role::Unknown);
    Ok(Actor::new(id, &claims.email, role))
}

fn auth_response(state: &AppState, account: &Account) -> Result<AuthResponse, ApiError> {
    let (token, exp) = issue_jwt(
        &state.config.auth.jwt_secret,
        state.config.auth.jwt_ttl_days,
        account,
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(AuthResponse {
        token,
        exp,
        user: AccountSummary::from(account),
    })
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let account = state.accounts.register(req).await?;
    tracing::info!(account_id = %account.id, role = %account.role, "Registered account");
    Ok((StatusCode::CREATED, Json(auth_response(&state, &account)?)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let account = match state.accounts.authenticate(&req.email, &req.password).await {
        Ok(account) => account,
        Err(e) => {
            tracing::debug!("Login rejected: {}", e);
            return Err(e.into());
        }
    };
    tracing::debug!(account_id = %account.id, "Login succeeded");
    Ok(Json(auth_response(&state, &account)?))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<MeResponse>, ApiError> {
    let account = state
        .accounts
        .get(actor.id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Account no longer exists"))?;
    Ok(Json(MeResponse {
        user: AccountSummary::from(&account),
        capabilities: Capabilities::for_actor(&actor),
    }))
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let Some(token) = bearer_token(header) else {
        return ApiError::unauthenticated("Missing Authorization header").into_response();
    };

    match actor_from_token(token, &state.config.auth.jwt_secret) {
        Ok(actor) => {
            req.extensions_mut().insert(actor);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
