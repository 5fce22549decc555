use chrono::Duration;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::audit::AuditLogResponse;
use crate::handlers::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, UserResponse,
};
use crate::handlers::students::{CreateStudentRequest, StudentResponse, UpdateStudentRequest};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Sliding time-to-live applied to login sessions
    pub session_ttl: Duration,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::change_password,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::create_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::audit::get_audit_logs,
    ),
    components(
        schemas(
            ApiResponse<LoginResponse>,
            ApiResponse<StudentResponse>,
            ApiResponse<Vec<StudentResponse>>,
            ApiResponse<Vec<AuditLogResponse>>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            UserResponse,
            CreateStudentRequest,
            UpdateStudentRequest,
            StudentResponse,
            AuditLogResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, logout and credential management"),
        (name = "students", description = "Student record management"),
        (name = "audit", description = "Audit trail of student mutations"),
    ),
    info(
        title = "Registra API",
        description = "Student Registry API - tracks students and audits every add/delete",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
