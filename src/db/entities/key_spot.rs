//! Key Spot entity (level 3, nested inside a Key Place)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "key_spots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub key_place_id: i32,
    pub category_id: Option<i32>,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub featured_image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub is_visible: i32,
    /// 9-char hierarchy identifier, `CCCPPSS00`.
    pub hierarchy_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::key_place::Entity",
        from = "Column::KeyPlaceId",
        to = "super::key_place::Column::Id"
    )]
    KeyPlace,
    #[sea_orm(
        belongs_to = "super::spot_category::Entity",
        from = "Column::CategoryId",
        to = "super::spot_category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::sub_spot::Entity")]
    SubSpots,
}

impl Related<super::key_place::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeyPlace.def()
    }
}

impl Related<super::spot_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sub_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubSpots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
