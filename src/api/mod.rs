//! REST API layer: route handlers, DTOs, API-key gate and router
//! composition.
//!
//! Resource endpoints are mounted under `/api` behind the API-key gate;
//! `/health` and the OpenAPI UI are not gated.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::{BoxError, Router, middleware};
use tower::ServiceBuilder;
use tower::timeout::error::Elapsed;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::RegistryError;

/// Builds the API router with all REST endpoints.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let gated = handlers::routes().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    let router = Router::new()
        .nest("/api", gated)
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

/// Builds the complete application: routes, fallback and HTTP layers,
/// with state applied.
///
/// A request still running after `request_timeout` is dropped and answered
/// with [`RegistryError::StoreUnavailable`], so clients see the same
/// retryable `503` as any other transient store failure.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router(&state)
        .fallback(handlers::system::not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Turns an error raised by the middleware stack into a JSON error.
async fn handle_layer_error(err: BoxError) -> RegistryError {
    if err.is::<Elapsed>() {
        RegistryError::StoreUnavailable("request timed out".to_string())
    } else {
        RegistryError::Persistence(format!("unhandled middleware error: {err}"))
    }
}
