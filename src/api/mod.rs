pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

pub use handlers::AppState;

/// Create the JSON API router.
///
/// Creation routes hang off the parent (`/api/dhams/:id/key-places`) so a
/// child can never be created without naming the parent whose hierarchy
/// prefix it inherits.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Dhams (root level)
        .route("/api/dhams", get(handlers::list_dhams).post(handlers::create_dham))
        .route(
            "/api/dhams/:id",
            get(handlers::get_dham).delete(handlers::delete_dham),
        )
        // Key Places (level 2)
        .route(
            "/api/dhams/:id/key-places",
            get(handlers::list_key_places).post(handlers::create_key_place),
        )
        .route("/api/key-places/:id", delete(handlers::delete_key_place))
        // Key Spots (level 3)
        .route(
            "/api/key-places/:id/key-spots",
            get(handlers::list_key_spots).post(handlers::create_key_spot),
        )
        .route("/api/key-spots/:id", delete(handlers::delete_key_spot))
        // Sub-Spots (level 4)
        .route(
            "/api/key-spots/:id/sub-spots",
            get(handlers::list_sub_spots).post(handlers::create_sub_spot),
        )
        .route("/api/sub-spots/:id", delete(handlers::delete_sub_spot))
        // Categories and hierarchy maintenance
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/hierarchy/stats", get(handlers::hierarchy_stats))
        .route("/api/hierarchy/backfill", post(handlers::run_backfill))
        .route("/health", get(handlers::health))
}
