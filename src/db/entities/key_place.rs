//! Key Place entity (level 2, nested inside a Dham)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "key_places")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dham_id: i32,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub featured_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub is_visible: i32,
    /// 9-char hierarchy identifier, `CCCPP0000`.
    pub hierarchy_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dham::Entity",
        from = "Column::DhamId",
        to = "super::dham::Column::Id"
    )]
    Dham,
    #[sea_orm(has_many = "super::key_spot::Entity")]
    KeySpots,
}

impl Related<super::dham::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dham.def()
    }
}

impl Related<super::key_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeySpots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
