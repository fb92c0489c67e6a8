use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthSessionData;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;

pub async fn refresh<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<RefreshRequestBody>,
) -> Result<ApiSuccess<AuthSessionData>, ApiError> {
    if body.refresh_token.is_empty() {
        return Err(ApiError::BadRequest("refresh_token is required".to_string()));
    }

    state
        .auth_service
        .refresh_token(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequestBody {
    refresh_token: String,
}
