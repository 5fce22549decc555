use anyhow::{bail, Context, Result};
use model::entities::user::{self, Role};
use sea_orm::{ActiveModelTrait, Database, Set, SqlErr};
use tracing::info;

use crate::auth;

/// Provision an additional account out of band.
///
/// The password comes from REGISTRA_USER_PASSWORD so the secret never
/// hits argv.
pub async fn create_user(database_url: &str, username: &str, role: &str) -> Result<()> {
    let password = std::env::var("REGISTRA_USER_PASSWORD")
        .context("REGISTRA_USER_PASSWORD must be set to provision a user")?;
    if password.is_empty() {
        bail!("REGISTRA_USER_PASSWORD must not be empty");
    }

    let role = match role {
        "admin" => Role::Admin,
        "staff" => Role::Staff,
        other => bail!("unknown role '{other}', expected 'admin' or 'staff'"),
    };

    let db = Database::connect(database_url)
        .await
        .context("failed to connect to database")?;

    let password_hash = auth::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    let result = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        ..Default::default()
    }
    .insert(&db)
    .await;

    match result {
        Ok(created) => {
            info!(
                "Created user '{}' with role '{}' (id {})",
                created.username,
                created.role.as_str(),
                created.id
            );
            Ok(())
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            bail!("username '{username}' is already taken")
        }
        Err(e) => Err(e).context("failed to create user"),
    }
}
