//! Database entities

pub mod dham;
pub mod key_place;
pub mod key_spot;
pub mod spot_category;
pub mod sub_spot;
pub mod sub_spot_category;

pub use dham::Entity as Dham;
pub use key_place::Entity as KeyPlace;
pub use key_spot::Entity as KeySpot;
pub use spot_category::Entity as SpotCategory;
pub use sub_spot::Entity as SubSpot;
pub use sub_spot_category::Entity as SubSpotCategory;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_test_database, now_timestamp};
    use sea_orm::{ActiveModelTrait, ModelTrait, Set};

    #[tokio::test]
    async fn test_spot_category_relations_resolve_both_ways() {
        let db = init_test_database().await;
        let now = now_timestamp();

        let category = spot_category::ActiveModel {
            name: Set("Ghat".to_string()),
            icon: Set("🪜".to_string()),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let spot = key_spot::ActiveModel {
            key_place_id: Set(1),
            category_id: Set(Some(category.id)),
            title: Set("Dashashwamedh Ghat".to_string()),
            slug: Set("dashashwamedh-ghat".to_string()),
            sort_order: Set(0),
            is_visible: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let found = spot.find_related(SpotCategory).one(&db).await.unwrap();
        assert_eq!(found.map(|c| c.name), Some("Ghat".to_string()));

        let spots = category.find_related(KeySpot).all(&db).await.unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].title, "Dashashwamedh Ghat");
    }

    #[tokio::test]
    async fn test_sub_spot_category_relations_resolve_both_ways() {
        let db = init_test_database().await;
        let now = now_timestamp();

        let category = sub_spot_category::ActiveModel {
            name: Set("Shrine".to_string()),
            icon: Set("⛩️".to_string()),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let sub = sub_spot::ActiveModel {
            key_spot_id: Set(1),
            category_id: Set(Some(category.id)),
            title: Set("Inner Shrine".to_string()),
            slug: Set("inner-shrine".to_string()),
            sort_order: Set(0),
            is_visible: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let found = sub.find_related(SubSpotCategory).one(&db).await.unwrap();
        assert_eq!(found.map(|c| c.name), Some("Shrine".to_string()));

        let subs = category.find_related(SubSpot).all(&db).await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].title, "Inner Shrine");
    }
}
