#[cfg(test)]
pub mod test_utils {
    use crate::auth;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Duration;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::{self, Role};
    use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};

    pub const ADMIN_PASSWORD: &str = "admin-pass";
    pub const STAFF_PASSWORD: &str = "staff-pass";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub async fn seed_user(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
        role: Role,
    ) -> user::Model {
        user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(auth::hash_password(password).expect("Failed to hash password")),
            role: Set(role),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to seed user")
    }

    /// Create AppState for testing, with one admin and one staff account
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        seed_user(&db, "admin", ADMIN_PASSWORD, Role::Admin).await;
        seed_user(&db, "staff", STAFF_PASSWORD, Role::Staff).await;

        AppState {
            db,
            session_ttl: Duration::hours(24),
        }
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Log in through the API and return the session token and user id
    pub async fn login(server: &TestServer, username: &str, password: &str) -> (String, i64) {
        let response = server
            .post("/api/v1/auth/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let token = body["data"]["token"].as_str().expect("token").to_string();
        let user_id = body["data"]["user"]["id"].as_i64().expect("user id");
        (token, user_id)
    }
}
