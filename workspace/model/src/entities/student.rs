use sea_orm::entity::prelude::*;

/// A managed student record.
///
/// `email` carries a database-level unique constraint; the application
/// relies on that constraint (not a prior read) to reject duplicates,
/// so concurrent inserts of the same address cannot both win.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    /// Server-assigned at insert, immutable thereafter.
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
