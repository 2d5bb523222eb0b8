//! Seed configuration: the built-in category tables.
//!
//! These are immutable configuration data loaded once at startup, not
//! editable behavior. Categories are only inserted when the tables are
//! empty so admin-created categories are never duplicated or overwritten.

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use crate::db::entities::{spot_category, sub_spot_category};
use crate::error::Result;

/// Key Spot (level 3) categories: (name, icon)
const SPOT_CATEGORIES: &[(&str, &str)] = &[
    ("Temple (Mandir)", "🛕"),
    ("Kund / Sarovar", "💧"),
    ("Ghat", "🪜"),
    ("Leela Sthali", "✨"),
    ("Van (Forest)", "🌳"),
    ("Hill / Parvat", "⛰️"),
    ("Village", "🏘️"),
    ("Ashram / Math", "🏠"),
    ("Samadhi Sthal", "🙏"),
    ("Bhajan Kutir", "📿"),
    ("Baithak", "📖"),
    ("Parikrama Path", "🔄"),
    ("Garden / Nikunj", "🌺"),
    ("Cave / Guha", "🕳️"),
    ("River", "🏞️"),
    ("Teerth", "🙏"),
    ("Shakti Peeth", "🔱"),
    ("Sacred Site", "⭐"),
    ("Sacred Throne", "👑"),
];

/// Sub-Spot (level 4) categories: (name, icon)
const SUB_SPOT_CATEGORIES: &[(&str, &str)] = &[
    ("Altar / Darshan Area", "🪔"),
    ("Samadhi (Internal)", "🕉️"),
    ("Quarters / Residence", "🚪"),
    ("Courtyard", "🏛️"),
    ("Ghat Section", "🏊"),
    ("Leela Point", "📍"),
    ("Shrine", "⛩️"),
    ("Pathway", "🚶"),
    ("Sacred Tree", "🌲"),
    ("Meditation Spot", "🧘"),
];

/// Insert the built-in categories if the tables are empty.
pub async fn seed_categories(db: &sea_orm::DatabaseConnection) -> Result<()> {
    if spot_category::Entity::find().count(db).await? == 0 {
        for (i, (name, icon)) in SPOT_CATEGORIES.iter().enumerate() {
            spot_category::ActiveModel {
                name: Set((*name).to_string()),
                icon: Set((*icon).to_string()),
                sort_order: Set(i as i32),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        tracing::info!("Seeded {} key spot categories", SPOT_CATEGORIES.len());
    }

    if sub_spot_category::Entity::find().count(db).await? == 0 {
        for (i, (name, icon)) in SUB_SPOT_CATEGORIES.iter().enumerate() {
            sub_spot_category::ActiveModel {
                name: Set((*name).to_string()),
                icon: Set((*icon).to_string()),
                sort_order: Set(i as i32),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        tracing::info!("Seeded {} sub-spot categories", SUB_SPOT_CATEGORIES.len());
    }

    Ok(())
}
