mod api;
mod db;
mod error;
mod hierarchy;
mod seed;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatra_cms=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data path from environment or use default
    let data_path = std::env::var("YATRA_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("yatra-cms"));

    // Initialize database
    let db_path = data_path.join("yatra.db");
    let db = db::init_database(&db_path)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at {:?}", db_path);

    // Built-in category tables (no-op when already populated)
    seed::seed_categories(&db)
        .await
        .expect("Failed to seed categories");

    // Repair pass: assign hierarchy IDs to rows that predate the scheme.
    // Idempotent, so it runs unconditionally at every startup.
    let report = hierarchy::backfill_hierarchy_ids(&db)
        .await
        .expect("Hierarchy backfill failed");
    if report.total_repaired() > 0 || report.skipped > 0 {
        tracing::info!(
            dhams = report.dhams,
            key_places = report.key_places,
            key_spots = report.key_spots,
            sub_spots = report.sub_spots,
            skipped = report.skipped,
            "Backfilled hierarchy IDs"
        );
    }

    let state = Arc::new(AppState::new(Arc::new(db)));

    let app = api::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    tracing::info!("Yatra CMS starting on http://{}", addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  POST /api/dhams                     - Create dham (allocates code + ID)");
    tracing::info!("  POST /api/dhams/:id/key-places      - Create key place");
    tracing::info!("  POST /api/key-places/:id/key-spots  - Create key spot");
    tracing::info!("  POST /api/key-spots/:id/sub-spots   - Create sub-spot");
    tracing::info!("  GET  /api/hierarchy/stats           - Hierarchy ID coverage");
    tracing::info!("  POST /api/hierarchy/backfill        - Re-run the repair pass");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
