use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use model::entities::audit_log::{self, AuditAction};
use model::entities::{student, user};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

/// Request body for creating a student.
///
/// `name` and `email` are optional at the serde level so that an absent
/// field surfaces as `MISSING_FIELD` instead of a deserialization
/// rejection.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
}

/// Request body for updating a student
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
}

/// Student response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            course: model.course,
            created_at: model.created_at,
        }
    }
}

/// Pull a required field out of the request, rejecting absent or blank
/// values.
fn require<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(field)),
    }
}

fn validated_email(value: &Option<String>) -> Result<&str, ApiError> {
    let email = require(value, "email")?;
    if !email.validate_email() {
        return Err(ApiError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}

/// Blank optional fields are stored as NULL rather than empty strings.
fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Classify an insert/update failure: a unique-constraint violation on
/// the email column is the caller's fault, everything else is ours.
fn duplicate_email_or_db(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::DuplicateEmail,
        _ => ApiError::Database(err),
    }
}

/// List all students, newest first
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "students",
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 401, description = "No valid session", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, _auth))]
pub async fn get_students(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<StudentResponse>>>, ApiError> {
    // Insertion order descending: created_at with id as tiebreak.
    let students = student::Entity::find()
        .order_by_desc(student::Column::CreatedAt)
        .order_by_desc(student::Column::Id)
        .all(&state.db)
        .await?;

    let response = ApiResponse {
        data: students.into_iter().map(StudentResponse::from).collect(),
        message: "Students retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a single student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentResponse>),
        (status = 404, description = "Student not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, _auth))]
pub async fn get_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<StudentResponse>>, ApiError> {
    let student = student::Entity::find_by_id(student_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("student"))?;

    let response = ApiResponse {
        data: StudentResponse::from(student),
        message: "Student retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a student
///
/// The insert and its `ADDED` audit entry commit in one transaction:
/// either both persist or neither does. Duplicate emails are rejected
/// by the database unique constraint, so a concurrent insert of the
/// same address cannot slip through.
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<StudentResponse>),
        (status = 400, description = "Missing or invalid field", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn create_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StudentResponse>>), ApiError> {
    let name = require(&request.name, "name")?.to_string();
    let email = validated_email(&request.email)?.to_string();

    let txn = state.db.begin().await?;

    let student = student::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(normalized(&request.phone)),
        course: Set(normalized(&request.course)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(duplicate_email_or_db)?;

    audit_log::ActiveModel {
        user_id: Set(auth.user.id),
        action: Set(AuditAction::Added),
        details: Set(student.name.clone()),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "user '{}' added student '{}' (id {})",
        auth.user.username, student.name, student.id
    );

    let response = ApiResponse {
        data: StudentResponse::from(student),
        message: "Student added successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a student
///
/// Same field rules as create. The email unique constraint backstops a
/// change to an address already in use. Edits are not audited; only
/// add and delete feed the audit trail.
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<StudentResponse>),
        (status = 400, description = "Missing or invalid field", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Student not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn update_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateStudentRequest>,
) -> Result<Json<ApiResponse<StudentResponse>>, ApiError> {
    let name = require(&request.name, "name")?.to_string();
    let email = validated_email(&request.email)?.to_string();

    let existing = student::Entity::find_by_id(student_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("student"))?;

    let mut active: student::ActiveModel = existing.into();
    active.name = Set(name);
    active.email = Set(email);
    active.phone = Set(normalized(&request.phone));
    active.course = Set(normalized(&request.course));

    let updated = active
        .update(&state.db)
        .await
        .map_err(duplicate_email_or_db)?;

    info!(
        "user '{}' edited student '{}' (id {})",
        auth.user.username, updated.name, updated.id
    );

    let response = ApiResponse {
        data: StudentResponse::from(updated),
        message: "Student updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a student row and record the `DELETED` audit entry in one
/// transaction. The delete is re-checked inside the transaction: if a
/// competing request removed the row after the caller's lookup, zero
/// rows are affected and everything rolls back with a not-found error
/// rather than minting a second audit entry.
pub(crate) async fn remove_student_with_audit(
    db: &DatabaseConnection,
    student: student::Model,
    acting_user: &user::Model,
) -> Result<(), ApiError> {
    let txn = db.begin().await?;

    let deleted = student::Entity::delete_by_id(student.id).exec(&txn).await?;
    if deleted.rows_affected == 0 {
        // Lost the race to another delete; dropping the txn rolls back.
        return Err(ApiError::NotFound("student"));
    }

    audit_log::ActiveModel {
        user_id: Set(acting_user.id),
        action: Set(AuditAction::Deleted),
        details: Set(student.name),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(())
}

/// Delete a student
///
/// Deletion is physical and immediate. The row removal and its
/// `DELETED` audit entry (carrying the prior name) commit together.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let student = student::Entity::find_by_id(student_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("delete requested for unknown student id {}", student_id);
            ApiError::NotFound("student")
        })?;

    let prior_name = student.name.clone();

    remove_student_with_audit(&state.db, student, &auth.user).await?;

    info!(
        "user '{}' deleted student '{}' (id {})",
        auth.user.username, prior_name, student_id
    );

    let response = ApiResponse {
        data: format!("Student {student_id} deleted"),
        message: "Student deleted successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}
