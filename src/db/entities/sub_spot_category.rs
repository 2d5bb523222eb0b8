//! Sub-Spot category entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sub_spot_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_spot::Entity")]
    SubSpots,
}

impl Related<super::sub_spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubSpots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
