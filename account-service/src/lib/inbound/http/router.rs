use std::sync::Arc;
use std::time::Duration;

use auth::LoginRateLimiter;
use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::domain::user::ports::UserRepository;

pub struct AppState<R: UserRepository> {
    pub auth_service: Arc<AuthService<R>>,
    pub token_service: Arc<TokenService>,
    pub rate_limiter: Arc<LoginRateLimiter>,
}

// Manual impl: deriving Clone would require R: Clone
impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            token_service: Arc::clone(&self.token_service),
            rate_limiter: Arc::clone(&self.rate_limiter),
        }
    }
}

/// Build the HTTP router.
///
/// The login handler extracts `ConnectInfo<SocketAddr>`, so the returned
/// router must be served via
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router<R: UserRepository>(
    auth_service: Arc<AuthService<R>>,
    token_service: Arc<TokenService>,
    rate_limiter: Arc<LoginRateLimiter>,
) -> Router {
    let state = AppState {
        auth_service,
        token_service,
        rate_limiter,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<R>))
        .route("/api/auth/login", post(login::<R>))
        .route("/api/auth/refresh", post(refresh::<R>));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis() as u64,
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
