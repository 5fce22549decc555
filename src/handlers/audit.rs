use axum::extract::{Query, State};
use axum::response::Json;
use model::entities::audit_log;
use model::entities::user::Role;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Query parameters for the audit feed
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditQuery {
    /// Maximum number of entries to return (default 20, capped at 100)
    pub limit: Option<u64>,
}

/// Audit entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub id: i32,
    /// The user who performed the action
    pub user_id: i32,
    /// "ADDED" or "DELETED"
    pub action: String,
    /// The affected student's name
    pub details: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<audit_log::Model> for AuditLogResponse {
    fn from(model: audit_log::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action.as_str().to_string(),
            details: model.details,
            timestamp: model.timestamp,
        }
    }
}

/// Recent audit entries, newest first
///
/// Only admins see the trail; a staff session gets an empty list
/// rather than a rejection, matching the dashboard behavior where the
/// log section is simply absent for staff.
#[utoipa::path(
    get,
    path = "/api/v1/audit-logs",
    tag = "audit",
    params(
        ("limit" = Option<u64>, Query, description = "Maximum number of entries (default 20, capped at 100)"),
    ),
    responses(
        (status = 200, description = "Audit entries retrieved successfully", body = ApiResponse<Vec<AuditLogResponse>>),
        (status = 401, description = "No valid session", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogResponse>>>, ApiError> {
    if auth.user.role != Role::Admin {
        debug!(
            "user '{}' has role '{}', hiding audit log",
            auth.user.username,
            auth.user.role.as_str()
        );
        let response = ApiResponse {
            data: vec![],
            message: "Audit log is not visible for this role".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = audit_log::Entity::find()
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(&state.db)
        .await?;

    let response = ApiResponse {
        data: entries.into_iter().map(AuditLogResponse::from).collect(),
        message: "Audit entries retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
