//! One-time backfill of hierarchy identifiers for historical rows.
//!
//! Walks the four levels in dependency order (dhams, key places, key spots,
//! sub-spots) and assigns identifiers to every row that lacks one. Each
//! level runs in its own transaction and keeps the current max sequence per
//! parent in memory, so allocation never depends on re-reading rows written
//! earlier in the same pass. Re-running the whole procedure is a no-op:
//! every row it would touch already has an identifier after the first run.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::code::allocate_code;
use super::id::{compose_child_id, compose_root_id, prefix_for, Level};
use super::sequence::{parse_sequence, MAX_SEQ};
use crate::db::entities::{dham, key_place, key_spot, sub_spot};
use crate::error::Result;

/// Counts of rows repaired by one backfill run.
#[derive(Debug, Default, serde::Serialize)]
pub struct BackfillReport {
    pub dhams: u64,
    pub key_places: u64,
    pub key_spots: u64,
    pub sub_spots: u64,
    /// Rows left untouched because their parent's identifier could not be
    /// resolved, or the parent was already at capacity.
    pub skipped: u64,
}

impl BackfillReport {
    pub fn total_repaired(&self) -> u64 {
        self.dhams + self.key_places + self.key_spots + self.sub_spots
    }
}

fn missing<C: ColumnTrait>(col: C) -> Condition {
    Condition::any().add(col.is_null()).add(col.eq(""))
}

/// Assign hierarchy identifiers to every row that lacks one, across all
/// four levels. Safe to re-run at every startup.
pub async fn backfill_hierarchy_ids(db: &DatabaseConnection) -> Result<BackfillReport> {
    let mut report = BackfillReport::default();

    // Pass 1: dhams. Codes allocated against the full existing set, plus
    // the ones handed out earlier in this same pass.
    let txn = db.begin().await?;
    let mut existing_codes: HashSet<String> = dham::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .filter_map(|d| d.dham_code)
        .collect();
    let pending = dham::Entity::find()
        .filter(missing(dham::Column::HierarchyId))
        .order_by_asc(dham::Column::Id)
        .all(&txn)
        .await?;
    for row in pending {
        let code = allocate_code(&row.title, &existing_codes);
        existing_codes.insert(code.clone());
        let hid = compose_root_id(&code);
        let mut model: dham::ActiveModel = row.into();
        model.dham_code = Set(Some(code));
        model.hierarchy_id = Set(Some(hid));
        model.update(&txn).await?;
        report.dhams += 1;
    }
    txn.commit().await?;

    // Lookup covering all dhams, not just the ones repaired above.
    let dham_codes: HashMap<i32, String> = dham::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .filter_map(|d| d.dham_code.map(|c| (d.id, c)))
        .collect();

    // Pass 2: key places.
    let txn = db.begin().await?;
    let mut seqs: HashMap<i32, u32> = HashMap::new();
    for row in key_place::Entity::find()
        .filter(key_place::Column::HierarchyId.is_not_null())
        .all(&txn)
        .await?
    {
        if let Some(seq) = row
            .hierarchy_id
            .as_deref()
            .and_then(|hid| parse_sequence(hid, Level::KeyPlace))
        {
            let entry = seqs.entry(row.dham_id).or_insert(0);
            *entry = (*entry).max(seq);
        }
    }
    let pending = key_place::Entity::find()
        .filter(missing(key_place::Column::HierarchyId))
        .order_by_asc(key_place::Column::DhamId)
        .order_by_asc(key_place::Column::SortOrder)
        .order_by_asc(key_place::Column::Id)
        .all(&txn)
        .await?;
    for row in pending {
        let Some(code) = dham_codes.get(&row.dham_id) else {
            tracing::warn!(key_place_id = row.id, dham_id = row.dham_id,
                "skipping key place: parent dham has no code");
            report.skipped += 1;
            continue;
        };
        let seq = seqs.entry(row.dham_id).or_insert(0);
        if *seq >= MAX_SEQ {
            tracing::warn!(key_place_id = row.id, dham_id = row.dham_id,
                "skipping key place: parent dham is at capacity");
            report.skipped += 1;
            continue;
        }
        *seq += 1;
        let hid = compose_child_id(code, Level::KeyPlace, *seq);
        let mut model: key_place::ActiveModel = row.into();
        model.hierarchy_id = Set(Some(hid));
        model.update(&txn).await?;
        report.key_places += 1;
    }
    txn.commit().await?;

    // Pass 3: key spots, anchored to the 5-char key place prefixes.
    let kp_prefixes: HashMap<i32, String> = key_place::Entity::find()
        .filter(key_place::Column::HierarchyId.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .filter_map(|kp| {
            let hid = kp.hierarchy_id?;
            Some((kp.id, prefix_for(&hid, Level::KeySpot)?.to_string()))
        })
        .collect();

    let txn = db.begin().await?;
    let mut seqs: HashMap<i32, u32> = HashMap::new();
    for row in key_spot::Entity::find()
        .filter(key_spot::Column::HierarchyId.is_not_null())
        .all(&txn)
        .await?
    {
        if let Some(seq) = row
            .hierarchy_id
            .as_deref()
            .and_then(|hid| parse_sequence(hid, Level::KeySpot))
        {
            let entry = seqs.entry(row.key_place_id).or_insert(0);
            *entry = (*entry).max(seq);
        }
    }
    let pending = key_spot::Entity::find()
        .filter(missing(key_spot::Column::HierarchyId))
        .order_by_asc(key_spot::Column::KeyPlaceId)
        .order_by_asc(key_spot::Column::SortOrder)
        .order_by_asc(key_spot::Column::Id)
        .all(&txn)
        .await?;
    for row in pending {
        let Some(prefix) = kp_prefixes.get(&row.key_place_id) else {
            tracing::warn!(key_spot_id = row.id, key_place_id = row.key_place_id,
                "skipping key spot: parent key place is unresolved");
            report.skipped += 1;
            continue;
        };
        let seq = seqs.entry(row.key_place_id).or_insert(0);
        if *seq >= MAX_SEQ {
            tracing::warn!(key_spot_id = row.id, key_place_id = row.key_place_id,
                "skipping key spot: parent key place is at capacity");
            report.skipped += 1;
            continue;
        }
        *seq += 1;
        let hid = compose_child_id(prefix, Level::KeySpot, *seq);
        let mut model: key_spot::ActiveModel = row.into();
        model.hierarchy_id = Set(Some(hid));
        model.update(&txn).await?;
        report.key_spots += 1;
    }
    txn.commit().await?;

    // Pass 4: sub-spots, anchored to the 7-char key spot prefixes.
    let ks_prefixes: HashMap<i32, String> = key_spot::Entity::find()
        .filter(key_spot::Column::HierarchyId.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .filter_map(|ks| {
            let hid = ks.hierarchy_id?;
            Some((ks.id, prefix_for(&hid, Level::SubSpot)?.to_string()))
        })
        .collect();

    let txn = db.begin().await?;
    let mut seqs: HashMap<i32, u32> = HashMap::new();
    for row in sub_spot::Entity::find()
        .filter(sub_spot::Column::HierarchyId.is_not_null())
        .all(&txn)
        .await?
    {
        if let Some(seq) = row
            .hierarchy_id
            .as_deref()
            .and_then(|hid| parse_sequence(hid, Level::SubSpot))
        {
            let entry = seqs.entry(row.key_spot_id).or_insert(0);
            *entry = (*entry).max(seq);
        }
    }
    let pending = sub_spot::Entity::find()
        .filter(missing(sub_spot::Column::HierarchyId))
        .order_by_asc(sub_spot::Column::KeySpotId)
        .order_by_asc(sub_spot::Column::SortOrder)
        .order_by_asc(sub_spot::Column::Id)
        .all(&txn)
        .await?;
    for row in pending {
        let Some(prefix) = ks_prefixes.get(&row.key_spot_id) else {
            tracing::warn!(sub_spot_id = row.id, key_spot_id = row.key_spot_id,
                "skipping sub-spot: parent key spot is unresolved");
            report.skipped += 1;
            continue;
        };
        let seq = seqs.entry(row.key_spot_id).or_insert(0);
        if *seq >= MAX_SEQ {
            tracing::warn!(sub_spot_id = row.id, key_spot_id = row.key_spot_id,
                "skipping sub-spot: parent key spot is at capacity");
            report.skipped += 1;
            continue;
        }
        *seq += 1;
        let hid = compose_child_id(prefix, Level::SubSpot, *seq);
        let mut model: sub_spot::ActiveModel = row.into();
        model.hierarchy_id = Set(Some(hid));
        model.update(&txn).await?;
        report.sub_spots += 1;
    }
    txn.commit().await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_test_database, now_timestamp};

    async fn insert_dham(db: &DatabaseConnection, title: &str, slug: &str) -> i32 {
        let now = now_timestamp();
        dham::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            country: Set("India".to_string()),
            status: Set("draft".to_string()),
            is_featured: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn insert_key_place(
        db: &DatabaseConnection,
        dham_id: i32,
        title: &str,
        sort_order: i32,
        hierarchy_id: Option<&str>,
    ) -> i32 {
        let now = now_timestamp();
        key_place::ActiveModel {
            dham_id: Set(dham_id),
            title: Set(title.to_string()),
            slug: Set(title.to_lowercase().replace(' ', "-")),
            sort_order: Set(sort_order),
            is_visible: Set(1),
            hierarchy_id: Set(hierarchy_id.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn insert_key_spot(db: &DatabaseConnection, key_place_id: i32, title: &str) -> i32 {
        let now = now_timestamp();
        key_spot::ActiveModel {
            key_place_id: Set(key_place_id),
            title: Set(title.to_string()),
            slug: Set(title.to_lowercase().replace(' ', "-")),
            sort_order: Set(0),
            is_visible: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn insert_sub_spot(db: &DatabaseConnection, key_spot_id: i32, title: &str) -> i32 {
        let now = now_timestamp();
        sub_spot::ActiveModel {
            key_spot_id: Set(key_spot_id),
            title: Set(title.to_string()),
            slug: Set(title.to_lowercase().replace(' ', "-")),
            sort_order: Set(0),
            is_visible: Set(1),
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
    async fn test_backfill_assigns_full_tree() {
        let db = init_test_database().await;

        let d1 = insert_dham(&db, "Vrindavan", "vrindavan").await;
        let kp1 = insert_key_place(&db, d1, "Seva Kunj", 0, None).await;
        let kp2 = insert_key_place(&db, d1, "Nidhivan", 1, None).await;
        let ks1 = insert_key_spot(&db, kp1, "Main Temple").await;
        let ks2 = insert_key_spot(&db, kp1, "Old Kund").await;
        let ss1 = insert_sub_spot(&db, ks1, "Altar").await;
        let ss2 = insert_sub_spot(&db, ks1, "Courtyard").await;

        let report = backfill_hierarchy_ids(&db).await.unwrap();
        assert_eq!(report.dhams, 1);
        assert_eq!(report.key_places, 2);
        assert_eq!(report.key_spots, 2);
        assert_eq!(report.sub_spots, 2);
        assert_eq!(report.skipped, 0);

        let d = dham::Entity::find_by_id(d1).one(&db).await.unwrap().unwrap();
        // "VRINDAVAN" -> consonants "VRNDVN" -> "VRN"
        assert_eq!(d.dham_code.as_deref(), Some("VRN"));
        assert_eq!(d.hierarchy_id.as_deref(), Some("VRN000000"));

        let kp = |id: i32| key_place::Entity::find_by_id(id);
        let kp1_hid = kp(kp1).one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        let kp2_hid = kp(kp2).one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        assert_eq!(kp1_hid, "VRN010000");
        assert_eq!(kp2_hid, "VRN020000");

        let ks1_hid = key_spot::Entity::find_by_id(ks1)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        let ks2_hid = key_spot::Entity::find_by_id(ks2)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        assert_eq!(ks1_hid, "VRN010100");
        assert_eq!(ks2_hid, "VRN010200");

        let ss1_hid = sub_spot::Entity::find_by_id(ss1)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        let ss2_hid = sub_spot::Entity::find_by_id(ss2)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        assert_eq!(ss1_hid, "VRN010101");
        assert_eq!(ss2_hid, "VRN010102");

        // Prefix containment across the whole tree.
        assert_eq!(&kp1_hid[..3], "VRN");
        assert_eq!(&ks1_hid[..5], &kp1_hid[..5]);
        assert_eq!(&ss1_hid[..7], &ks1_hid[..7]);
    }

    #[tokio::test]
    async fn test_backfill_is_idempotent() {
        let db = init_test_database().await;

        let d1 = insert_dham(&db, "Ayodhya Dham", "ayodhya").await;
        let kp1 = insert_key_place(&db, d1, "Ram Janmabhoomi", 0, None).await;

        let first = backfill_hierarchy_ids(&db).await.unwrap();
        assert_eq!(first.total_repaired(), 2);

        let hid_before = key_place::Entity::find_by_id(kp1)
            .one(&db).await.unwrap().unwrap().hierarchy_id;

        let second = backfill_hierarchy_ids(&db).await.unwrap();
        assert_eq!(second.total_repaired(), 0);
        assert_eq!(second.skipped, 0);

        let hid_after = key_place::Entity::find_by_id(kp1)
            .one(&db).await.unwrap().unwrap().hierarchy_id;
        assert_eq!(hid_before, hid_after);
    }

    #[tokio::test]
    async fn test_backfill_seeds_from_existing_sequences() {
        let db = init_test_database().await;

        let d1 = insert_dham(&db, "Ayodhya Dham", "ayodhya").await;
        // Give the dham its code up front so the pre-assigned child is
        // consistent with it.
        let mut model: dham::ActiveModel = dham::Entity::find_by_id(d1)
            .one(&db).await.unwrap().unwrap().into();
        model.dham_code = Set(Some("AYD".to_string()));
        model.hierarchy_id = Set(Some("AYD000000".to_string()));
        model.update(&db).await.unwrap();

        insert_key_place(&db, d1, "Existing", 0, Some("AYD050000")).await;
        let kp_new = insert_key_place(&db, d1, "New", 1, None).await;

        backfill_hierarchy_ids(&db).await.unwrap();

        let hid = key_place::Entity::find_by_id(kp_new)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        // Continues past the highest existing sequence, never reusing 01-05.
        assert_eq!(hid, "AYD060000");
    }

    #[tokio::test]
    async fn test_backfill_skips_orphans() {
        let db = init_test_database().await;

        // Parent id 999 does not exist; the row is left alone.
        let orphan = insert_key_spot(&db, 999, "Dangling").await;

        let report = backfill_hierarchy_ids(&db).await.unwrap();
        assert_eq!(report.total_repaired(), 0);
        assert_eq!(report.skipped, 1);

        let row = key_spot::Entity::find_by_id(orphan)
            .one(&db).await.unwrap().unwrap();
        assert_eq!(row.hierarchy_id, None);
    }

    #[tokio::test]
    async fn test_backfill_orders_by_sort_order_then_id() {
        let db = init_test_database().await;

        let d1 = insert_dham(&db, "Vrindavan", "vrindavan").await;
        let later = insert_key_place(&db, d1, "Second by sort", 5, None).await;
        let earlier = insert_key_place(&db, d1, "First by sort", 1, None).await;

        backfill_hierarchy_ids(&db).await.unwrap();

        let earlier_hid = key_place::Entity::find_by_id(earlier)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        let later_hid = key_place::Entity::find_by_id(later)
            .one(&db).await.unwrap().unwrap().hierarchy_id.unwrap();
        assert_eq!(earlier_hid, "VRN010000");
        assert_eq!(later_hid, "VRN020000");
    }
}
