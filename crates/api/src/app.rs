use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, maintenance, modifications, notifications, projects};
use crate::services::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: shared::jwt::JwtConfig,
    pub email: EmailService,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let jwt = shared::jwt::JwtConfig::new(
        &config.auth.jwt_secret,
        config.auth.access_token_expiry_secs,
    );
    let email = EmailService::new(config.email.clone());
    let request_timeout_secs = config.server.request_timeout_secs;

    let state = AppState {
        pool,
        config: Arc::new(config),
        jwt,
        email,
    };

    // The frontend runs on its own origin; auth is carried in the
    // Authorization header, so a permissive CORS policy is fine here.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Authorization is enforced per-handler through the AuthUser extractor.
    let api_routes = Router::new()
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/:project_id",
            get(projects::get_project).delete(projects::delete_project),
        )
        .route("/projects/:project_id/actions", patch(projects::project_actions))
        .route(
            "/projects/:project_id/fields",
            patch(projects::update_project_field),
        )
        .route(
            "/projects/:project_id/modifications",
            get(modifications::list_modifications),
        )
        .route(
            "/modifications/:modification_id/approve",
            post(modifications::approve_modification),
        )
        .route(
            "/modifications/:modification_id/reject",
            post(modifications::reject_modification),
        )
        .route(
            "/projects/:project_id/notify-client",
            post(notifications::notify_client),
        )
        .route(
            "/projects/:project_id/clear-notifications",
            post(notifications::clear_notifications),
        )
        .route(
            "/maintenance/cleanup-preferences",
            post(maintenance::cleanup_stale_preferences),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(public_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
