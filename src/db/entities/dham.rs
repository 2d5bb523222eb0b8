//! Dham entity (root level of the site hierarchy)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dhams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub full_content: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub featured_image: Option<String>,
    pub status: String,
    pub is_featured: i32,
    /// 3-letter root code; unique across all dhams once assigned.
    pub dham_code: Option<String>,
    /// 9-char hierarchy identifier, `CCC000000` for the root level.
    pub hierarchy_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::key_place::Entity")]
    KeyPlaces,
}

impl Related<super::key_place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeyPlaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
