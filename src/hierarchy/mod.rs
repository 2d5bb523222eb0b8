//! Hierarchy identifier scheme.
//!
//! Dham → Key Place → Key Spot → Sub-Spot, each row carrying a fixed-width,
//! self-describing identifier derived from its parent's. This module owns
//! code allocation, per-parent sequence allocation, identifier composition
//! and the one-time backfill of rows that predate the scheme.

pub mod backfill;
pub mod code;
pub mod id;
pub mod sequence;

pub use backfill::backfill_hierarchy_ids;

use std::collections::HashSet;

use self::code::allocate_code;
use self::id::{compose_child_id, compose_root_id, prefix_for, Level};
use self::sequence::next_sequence;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::db::entities::{dham, key_place, key_spot, sub_spot};
use crate::error::Result;

/// Allocate the code and root identifier for a new dham with `title`.
/// Returns `(dham_code, hierarchy_id)`; the caller persists both.
pub async fn allocate_root(db: &DatabaseConnection, title: &str) -> Result<(String, String)> {
    let existing: HashSet<String> = dham::Entity::find()
        .filter(dham::Column::DhamCode.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .filter_map(|d| d.dham_code)
        .collect();
    let code = allocate_code(title, &existing);
    let hierarchy_id = compose_root_id(&code);
    Ok((code, hierarchy_id))
}

/// Next identifier for a key place under `dham_id`, or `None` when the
/// parent has no code yet (assignment is deferred, never guessed).
pub async fn next_key_place_id(
    db: &DatabaseConnection,
    dham_id: i32,
) -> Result<Option<String>> {
    let code = match dham::Entity::find_by_id(dham_id).one(db).await? {
        Some(d) => match d.dham_code {
            Some(c) => c,
            None => return Ok(None),
        },
        None => return Ok(None),
    };
    let siblings = key_place::Entity::find()
        .filter(key_place::Column::DhamId.eq(dham_id))
        .filter(key_place::Column::HierarchyId.is_not_null())
        .all(db)
        .await?;
    let seq = next_sequence(
        Level::KeyPlace,
        siblings.iter().filter_map(|s| s.hierarchy_id.as_deref()),
    )?;
    Ok(Some(compose_child_id(&code, Level::KeyPlace, seq)))
}

/// Next identifier for a key spot under `key_place_id`, or `None` when the
/// parent's identifier is unresolved.
pub async fn next_key_spot_id(
    db: &DatabaseConnection,
    key_place_id: i32,
) -> Result<Option<String>> {
    let parent = key_place::Entity::find_by_id(key_place_id).one(db).await?;
    let prefix = match parent
        .and_then(|p| p.hierarchy_id)
        .as_deref()
        .and_then(|hid| prefix_for(hid, Level::KeySpot).map(str::to_string))
    {
        Some(p) => p,
        None => return Ok(None),
    };
    let siblings = key_spot::Entity::find()
        .filter(key_spot::Column::KeyPlaceId.eq(key_place_id))
        .filter(key_spot::Column::HierarchyId.is_not_null())
        .all(db)
        .await?;
    let seq = next_sequence(
        Level::KeySpot,
        siblings.iter().filter_map(|s| s.hierarchy_id.as_deref()),
    )?;
    Ok(Some(compose_child_id(&prefix, Level::KeySpot, seq)))
}

/// Next identifier for a sub-spot under `key_spot_id`, or `None` when the
/// parent's identifier is unresolved.
pub async fn next_sub_spot_id(
    db: &DatabaseConnection,
    key_spot_id: i32,
) -> Result<Option<String>> {
    let parent = key_spot::Entity::find_by_id(key_spot_id).one(db).await?;
    let prefix = match parent
        .and_then(|p| p.hierarchy_id)
        .as_deref()
        .and_then(|hid| prefix_for(hid, Level::SubSpot).map(str::to_string))
    {
        Some(p) => p,
        None => return Ok(None),
    };
    let siblings = sub_spot::Entity::find()
        .filter(sub_spot::Column::KeySpotId.eq(key_spot_id))
        .filter(sub_spot::Column::HierarchyId.is_not_null())
        .all(db)
        .await?;
    let seq = next_sequence(
        Level::SubSpot,
        siblings.iter().filter_map(|s| s.hierarchy_id.as_deref()),
    )?;
    Ok(Some(compose_child_id(&prefix, Level::SubSpot, seq)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_test_database, now_timestamp};
    use sea_orm::{ActiveModelTrait, Set};

    async fn insert_dham(
        db: &DatabaseConnection,
        title: &str,
        slug: &str,
        code: Option<&str>,
    ) -> i32 {
        let now = now_timestamp();
        dham::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            country: Set("India".to_string()),
            status: Set("draft".to_string()),
            is_featured: Set(0),
            dham_code: Set(code.map(str::to_string)),
            hierarchy_id: Set(code.map(compose_root_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn insert_key_place(db: &DatabaseConnection, dham_id: i32, hid: &str) -> i32 {
        let now = now_timestamp();
        key_place::ActiveModel {
            dham_id: Set(dham_id),
            title: Set("kp".to_string()),
            slug: Set("kp".to_string()),
            sort_order: Set(0),
            is_visible: Set(1),
            hierarchy_id: Set(Some(hid.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_allocate_root_avoids_existing_codes() {
        let db = init_test_database().await;
        insert_dham(&db, "Taken", "taken", Some("YDH")).await;

        let (code, hid) = allocate_root(&db, "Ayodhya Dham").await.unwrap();
        // "YDH" is in use; falls through to the next candidate.
        assert_eq!(code, "AYO");
        assert_eq!(hid, "AYO000000");
    }

    #[tokio::test]
    async fn test_child_allocation_is_sequential() {
        let db = init_test_database().await;
        let d = insert_dham(&db, "Ayodhya Dham", "ayodhya", Some("AYD")).await;

        let first = next_key_place_id(&db, d).await.unwrap().unwrap();
        assert_eq!(first, "AYD010000");
        insert_key_place(&db, d, &first).await;

        let second = next_key_place_id(&db, d).await.unwrap().unwrap();
        assert_eq!(second, "AYD020000");
    }

    #[tokio::test]
    async fn test_sequence_survives_sibling_deletion() {
        let db = init_test_database().await;
        let d = insert_dham(&db, "Ayodhya Dham", "ayodhya", Some("AYD")).await;

        let first = insert_key_place(&db, d, "AYD010000").await;
        insert_key_place(&db, d, "AYD020000").await;
        key_place::Entity::delete_by_id(first).exec(&db).await.unwrap();

        // 01 is gone but never handed out again.
        let third = next_key_place_id(&db, d).await.unwrap().unwrap();
        assert_eq!(third, "AYD030000");
    }

    #[tokio::test]
    async fn test_allocation_deferred_when_parent_unresolved() {
        let db = init_test_database().await;
        let d = insert_dham(&db, "No Code Yet", "no-code", None).await;

        assert_eq!(next_key_place_id(&db, d).await.unwrap(), None);
        // Nonexistent parent also defers rather than erroring.
        assert_eq!(next_key_place_id(&db, 9999).await.unwrap(), None);
    }
}
