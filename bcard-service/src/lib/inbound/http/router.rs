use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::cards;
use super::handlers::health::health;
use super::handlers::users;
use super::middleware::authenticate as auth_middleware;
use crate::domain::card::ports::CardServicePort;
use crate::domain::clock::Clock;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub card_service: Arc<dyn CardServicePort>,
    pub token_issuer: Arc<TokenIssuer>,
    pub clock: Arc<dyn Clock>,
    /// Run mode reported by the health endpoint.
    pub environment: String,
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/cards", get(cards::list_cards))
        .route("/api/cards/user/:user_id", get(cards::user_cards))
        .route("/api/cards/:id", get(cards::get_card));

    let protected_routes = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(users::current_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::set_business_status)
                .delete(users::delete_user),
        )
        .route("/api/users/:id/password", patch(users::change_password))
        .route("/api/cards", post(cards::create_card))
        .route("/api/cards/my-cards", get(cards::my_cards))
        .route(
            "/api/cards/:id",
            put(cards::update_card)
                .patch(cards::toggle_like)
                .delete(cards::delete_card),
        )
        .route("/api/cards/:id/biz-number", patch(cards::set_biz_number))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
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
                let status = response.status().as_u16();
                let latency_ms = latency.as_millis();
                if response.status().is_server_error() {
                    tracing::error!(status, latency_ms, "Request completed");
                } else if response.status().is_client_error() {
                    tracing::warn!(status, latency_ms, "Request completed");
                } else {
                    tracing::info!(status, latency_ms, "Request completed");
                }
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// CORS restricted to the configured origins, with credentials.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
