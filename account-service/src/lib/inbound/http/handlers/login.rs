use std::net::SocketAddr;

use auth::AttemptKey;
use auth::RateLimitError;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthSessionData;
use crate::domain::auth::errors::AuthError;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::client_ip;
use crate::inbound::http::router::AppState;

/// Login endpoint.
///
/// The rate limiter is driven from here, not from the authentication
/// service: the pre-check runs before any credential work, and the outcome
/// is recorded afterwards, keyed by username + caller address.
pub async fn login<R: UserRepository>(
    State(state): State<AppState<R>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<AuthSessionData>, ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let origin = client_ip(&headers, peer);
    let key = AttemptKey::new(body.username.as_str(), origin);

    state
        .rate_limiter
        .check(&key)
        .map_err(|RateLimitError::TooManyAttempts { retry_after }| {
            tracing::warn!(username = %body.username, %origin, "Login attempt while blocked");
            ApiError::TooManyAttempts { retry_after }
        })?;

    // A username that fails validation can never match a stored user;
    // treat it as a failed attempt like any other bad credential
    let Ok(username) = Username::new(body.username.clone()) else {
        return Err(record_failure(&state, &key));
    };

    match state.auth_service.login(&username, &body.password).await {
        Ok(session) => {
            state.rate_limiter.record_successful_login(&key);
            Ok(ApiSuccess::new(StatusCode::OK, (&session).into()))
        }
        Err(AuthError::InvalidCredentials) => Err(record_failure(&state, &key)),
        Err(e) => Err(ApiError::from(e)),
    }
}

fn record_failure<R: UserRepository>(state: &AppState<R>, key: &AttemptKey) -> ApiError {
    state.rate_limiter.record_failed_attempt(key);
    ApiError::InvalidCredentials {
        attempts_remaining: state.rate_limiter.remaining_attempts(key),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}
