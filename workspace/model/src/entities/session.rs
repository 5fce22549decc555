use chrono::Utc;
use sea_orm::entity::prelude::*;

/// A server-side login session.
///
/// The primary key doubles as the opaque bearer token handed to the
/// client. Expiry slides forward on every authenticated request;
/// expired rows are rejected and cleaned up lazily on lookup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub user_id: i32,
    pub expires_at: DateTimeUtc,
}

impl Model {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_check() {
        let live = Model {
            id: "token".to_string(),
            user_id: 1,
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!live.is_expired());

        let stale = Model {
            id: "token".to_string(),
            user_id: 1,
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(stale.is_expired());
    }
}
