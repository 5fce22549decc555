//! Session and credential handling.
//!
//! Sessions are server-side rows keyed by an opaque UUIDv4 bearer token.
//! Protected handlers take an [`AuthUser`] extractor argument, so the
//! acting user is always explicit input rather than ambient state.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use model::entities::{session, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::schemas::AppState;

/// Hash a raw credential into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a raw credential against a stored Argon2 PHC string.
/// An unparseable stored hash counts as a failed verification.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Open a new session for the given user.
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    ttl: Duration,
) -> Result<session::Model, DbErr> {
    session::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        expires_at: Set(Utc::now() + ttl),
    }
    .insert(db)
    .await
}

/// Resolve a bearer token to its session and user, sliding the expiry
/// forward. Unknown and expired tokens map to `Unauthenticated`;
/// expired rows are deleted on the way out.
pub async fn resolve_session<C: ConnectionTrait>(
    db: &C,
    token: &str,
    ttl: Duration,
) -> Result<(session::Model, user::Model), ApiError> {
    let Some(found) = session::Entity::find_by_id(token).one(db).await? else {
        debug!("unknown session token presented");
        return Err(ApiError::Unauthenticated);
    };

    if found.is_expired() {
        debug!("expired session presented, deleting");
        session::Entity::delete_by_id(&found.id).exec(db).await?;
        return Err(ApiError::Unauthenticated);
    }

    let mut active: session::ActiveModel = found.into();
    active.expires_at = Set(Utc::now() + ttl);
    let refreshed = active.update(db).await?;

    let user = user::Entity::find_by_id(refreshed.user_id)
        .one(db)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok((refreshed, user))
}

/// Delete every session whose expiry has passed. Invoked on login so
/// abandoned sessions do not accumulate.
pub async fn purge_expired_sessions<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    let result = session::Entity::delete_many()
        .filter(session::Column::ExpiresAt.lt(Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Delete a session. Idempotent: ending an already-invalid session is
/// not an error.
pub async fn end_session<C: ConnectionTrait>(db: &C, token: &str) -> Result<(), DbErr> {
    session::Entity::delete_by_id(token).exec(db).await?;
    Ok(())
}

/// Revoke every session of a user except the one given. Used after a
/// credential change so stolen or stale tokens stop working.
pub async fn revoke_other_sessions<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    keep_session_id: &str,
) -> Result<(), DbErr> {
    session::Entity::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .filter(session::Column::Id.ne(keep_session_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Extract the bearer token from the Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The authenticated caller of a protected operation.
pub struct AuthUser {
    pub user: user::Model,
    pub session_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(ApiError::Unauthenticated)?
            .to_owned();

        let (session, user) = resolve_session(&state.db, &token, state.session_ttl).await?;

        Ok(AuthUser {
            user,
            session_id: session.id,
        })
    }
}
