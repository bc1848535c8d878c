use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::ApiError,
    middleware::{logging, security},
    routes::{chat, fallback, health},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // API routes; other methods on these paths are treated as unknown endpoints
    let api_routes = Router::new()
        .route(
            "/api/chat",
            post(chat::send_message).fallback(fallback::not_found),
        )
        .route(
            "/api/health",
            get(health::health_check).fallback(fallback::not_found),
        );

    // Static UI; "/" resolves to index.html
    let static_files = ServeDir::new(&state.config.server.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(fallback::not_found.into_service());

    let config = Arc::clone(&state.config);

    api_routes
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(middleware::from_fn(security::security_headers))
        .layer(middleware::from_fn(logging::log_request))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(Duration::from_secs(config.server.request_timeout_secs)),
        )
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(AnyOrigin);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(AnyOrigin)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}

/// Outer request bound; answers with the same `{error}` body as an upstream timeout
async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        ApiError::Internal
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    ApiError::Internal.into_response()
}
