use anyhow::{Context, Result};
use chrono::Duration;
use migration::{Migrator, MigratorTrait};
use model::entities::user::{self, Role};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, warn};

use crate::auth;
use crate::schemas::AppState;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Connect, migrate and bootstrap, producing the shared application
/// state. A migration failure aborts startup; running half-initialized
/// is worse than not running.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .context("failed to connect to database")?;

    info!("Running database migrations");
    Migrator::up(&db, None)
        .await
        .context("failed to apply database migrations")?;

    ensure_admin_user(&db).await?;

    Ok(AppState {
        db,
        session_ttl: session_ttl_from_env(),
    })
}

/// Sliding session TTL, overridable via SESSION_TTL_HOURS.
pub fn session_ttl_from_env() -> Duration {
    let hours = std::env::var("SESSION_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
    Duration::hours(hours)
}

/// Ensure at least one admin account exists.
///
/// The password comes from ADMIN_PASSWORD; without it a well-known
/// default is seeded so a fresh install is reachable, with a warning
/// pointing at the credential-rotation endpoint.
pub async fn ensure_admin_user(db: &DatabaseConnection) -> Result<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Role.eq(Role::Admin))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            warn!(
                "ADMIN_PASSWORD not set; bootstrapping 'admin' with the default credential. \
                 Rotate it immediately via POST /api/v1/auth/password"
            );
            "admin".to_string()
        }
    };

    let password_hash = auth::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash bootstrap credential: {e}"))?;

    user::ActiveModel {
        username: Set("admin".to_string()),
        password_hash: Set(password_hash),
        role: Set(Role::Admin),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("failed to create bootstrap admin account")?;

    info!("Bootstrapped default admin account");
    Ok(())
}
