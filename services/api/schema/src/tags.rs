use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub usage_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::resource_tags::Entity")]
    ResourceTags,
}

impl Related<super::resource_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
