use crate::handlers::{
    audit::get_audit_logs,
    auth::{change_password, login, logout},
    health::health_check,
    students::{create_student, delete_student, get_student, get_students, update_student},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/password", post(change_password))
        // Student CRUD routes
        .route("/api/v1/students", post(create_student))
        .route("/api/v1/students", get(get_students))
        .route("/api/v1/students/:student_id", get(get_student))
        .route("/api/v1/students/:student_id", put(update_student))
        .route("/api/v1/students/:student_id", delete(delete_student))
        // Audit trail (admin visibility only)
        .route("/api/v1/audit-logs", get(get_audit_logs))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
