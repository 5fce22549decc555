use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{self, AuthUser};
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

/// Request body for logging in
#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    /// Raw credential; verified against the stored hash and never logged
    pub password: String,
}

/// Request body for rotating the caller's credential
#[derive(Deserialize, Serialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of a user account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    /// "admin" or "staff"
    pub role: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role.as_str().to_string(),
        }
    }
}

/// Successful login payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token, presented as `Authorization: Bearer <token>`
    pub token: String,
    pub user: UserResponse,
}

/// Authenticate a user and open a session
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(&request.username))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("login attempt for unknown user '{}'", request.username);
            ApiError::InvalidCredentials
        })?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        warn!("failed login attempt for user '{}'", user.username);
        return Err(ApiError::InvalidCredentials);
    }

    let purged = auth::purge_expired_sessions(&state.db).await?;
    if purged > 0 {
        debug!("purged {purged} expired sessions");
    }

    let session = auth::create_session(&state.db, user.id, state.session_ttl).await?;
    info!("user '{}' logged in", user.username);

    let response = ApiResponse {
        data: LoginResponse {
            token: session.id,
            user: user.into(),
        },
        message: "Login successful".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// End the caller's session
///
/// Idempotent: a missing, unknown or already-ended token still yields 200.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session ended", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    if let Some(token) = auth::bearer_token(&headers) {
        auth::end_session(&state.db, token).await?;
    }

    let response = ApiResponse {
        data: "Session ended".to_string(),
        message: "Logged out successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Rotate the caller's credential
///
/// Verifies the current password, stores a fresh hash and revokes every
/// other session of the account. This is the rotation step paired with
/// the bootstrap default credential.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<String>),
        (status = 400, description = "Missing field", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Wrong current password or no session", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, auth_user, request))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    if request.new_password.trim().is_empty() {
        return Err(ApiError::MissingField("new_password"));
    }

    if !auth::verify_password(&request.current_password, &auth_user.user.password_hash) {
        warn!(
            "rejected password change for user '{}': wrong current password",
            auth_user.user.username
        );
        return Err(ApiError::InvalidCredentials);
    }

    let new_hash = auth::hash_password(&request.new_password)?;
    let username = auth_user.user.username.clone();
    let user_id = auth_user.user.id;

    let mut active: user::ActiveModel = auth_user.user.into();
    active.password_hash = Set(new_hash);
    active.update(&state.db).await?;

    auth::revoke_other_sessions(&state.db, user_id, &auth_user.session_id).await?;
    info!("user '{}' changed their password", username);

    let response = ApiResponse {
        data: "Password updated".to_string(),
        message: "Password changed successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
