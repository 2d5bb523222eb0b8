//! Sub-Spot entity (level 4, nested inside a Key Spot)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_spots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub key_spot_id: i32,
    pub category_id: Option<i32>,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub featured_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub is_visible: i32,
    /// 9-char hierarchy identifier, `CCCPPSSTT`.
    pub hierarchy_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::key_spot::Entity",
        from = "Column::KeySpotId",
        to = "super::key_spot::Column::Id"
    )]
    KeySpot,
    #[sea_orm(
        belongs_to = "super::sub_spot_category::Entity",
        from = "Column::CategoryId",
        to = "super::sub_spot_category::Column::Id"
    )]
    Category,
}

impl Related<super::key_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeySpot.def()
    }
}

impl Related<super::sub_spot_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
