//! JSON API handlers for the four hierarchy levels.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::db::entities::{dham, key_place, key_spot, spot_category, sub_spot, sub_spot_category};
use crate::db::now_timestamp;
use crate::error::{Result, ServerError};
use crate::hierarchy;

/// Application state shared across handlers
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Lowercase, non-alphanumerics collapsed to single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn json_response(status: StatusCode, value: serde_json::Value) -> Response {
    (status, Json(value)).into_response()
}

fn dham_json(d: &dham::Model) -> serde_json::Value {
    serde_json::json!({
        "id": d.id,
        "title": d.title,
        "slug": d.slug,
        "short_description": d.short_description,
        "state": d.state,
        "city": d.city,
        "country": d.country,
        "latitude": d.latitude,
        "longitude": d.longitude,
        "featured_image": d.featured_image,
        "status": d.status,
        "is_featured": d.is_featured != 0,
        "dham_code": d.dham_code,
        "hierarchy_id": d.hierarchy_id,
        "created_at": d.created_at,
        "updated_at": d.updated_at,
    })
}

fn key_place_json(kp: &key_place::Model) -> serde_json::Value {
    serde_json::json!({
        "id": kp.id,
        "dham_id": kp.dham_id,
        "title": kp.title,
        "slug": kp.slug,
        "short_description": kp.short_description,
        "featured_image": kp.featured_image,
        "latitude": kp.latitude,
        "longitude": kp.longitude,
        "sort_order": kp.sort_order,
        "is_visible": kp.is_visible != 0,
        "hierarchy_id": kp.hierarchy_id,
    })
}

fn key_spot_json(ks: &key_spot::Model) -> serde_json::Value {
    serde_json::json!({
        "id": ks.id,
        "key_place_id": ks.key_place_id,
        "category_id": ks.category_id,
        "title": ks.title,
        "slug": ks.slug,
        "short_description": ks.short_description,
        "featured_image": ks.featured_image,
        "latitude": ks.latitude,
        "longitude": ks.longitude,
        "sort_order": ks.sort_order,
        "is_visible": ks.is_visible != 0,
        "hierarchy_id": ks.hierarchy_id,
    })
}

fn sub_spot_json(ss: &sub_spot::Model) -> serde_json::Value {
    serde_json::json!({
        "id": ss.id,
        "key_spot_id": ss.key_spot_id,
        "category_id": ss.category_id,
        "title": ss.title,
        "slug": ss.slug,
        "short_description": ss.short_description,
        "featured_image": ss.featured_image,
        "latitude": ss.latitude,
        "longitude": ss.longitude,
        "sort_order": ss.sort_order,
        "is_visible": ss.is_visible != 0,
        "hierarchy_id": ss.hierarchy_id,
    })
}

fn default_country() -> String {
    "India".to_string()
}

fn default_status() -> String {
    "draft".to_string()
}

fn default_visible() -> bool {
    true
}

/// POST /api/dhams request body
#[derive(Deserialize)]
pub struct CreateDhamRequest {
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub full_content: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub is_featured: bool,
}

/// Request body shared by the three child levels
#[derive(Deserialize)]
pub struct CreateChildRequest {
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Only meaningful for key spots and sub-spots.
    #[serde(default)]
    pub category_id: Option<i32>,
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Title must not be empty".to_string()));
    }
    Ok(())
}

/// POST /api/dhams - Create a root-level dham
pub async fn create_dham(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDhamRequest>,
) -> Result<Response> {
    require_title(&req.title)?;
    let db = state.db.as_ref();

    let slug = slugify(&req.title);
    let taken = dham::Entity::find()
        .filter(dham::Column::Slug.eq(&slug))
        .count(db)
        .await?;
    if taken > 0 {
        return Err(ServerError::InvalidRequest(format!(
            "A dham with slug '{slug}' already exists"
        )));
    }

    let (code, hierarchy_id) = hierarchy::allocate_root(db, &req.title).await?;
    let now = now_timestamp();
    let created = dham::ActiveModel {
        title: Set(req.title),
        slug: Set(slug),
        short_description: Set(req.short_description),
        full_content: Set(req.full_content),
        state: Set(req.state),
        city: Set(req.city),
        country: Set(req.country),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        featured_image: Set(req.featured_image),
        status: Set(req.status),
        is_featured: Set(i32::from(req.is_featured)),
        dham_code: Set(Some(code)),
        hierarchy_id: Set(Some(hierarchy_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        dham_id = created.id,
        hierarchy_id = created.hierarchy_id.as_deref(),
        "Created dham"
    );
    Ok(json_response(StatusCode::CREATED, dham_json(&created)))
}

/// GET /api/dhams - List all dhams
pub async fn list_dhams(State(state): State<Arc<AppState>>) -> Result<Response> {
    let dhams = dham::Entity::find()
        .order_by_asc(dham::Column::Title)
        .all(state.db.as_ref())
        .await?;
    let items: Vec<_> = dhams.iter().map(dham_json).collect();
    Ok(json_response(StatusCode::OK, serde_json::json!({ "dhams": items })))
}

/// GET /api/dhams/:id - Fetch one dham with its child count
pub async fn get_dham(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let db = state.db.as_ref();
    let d = dham::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServerError::DhamNotFound(id.to_string()))?;
    let key_place_count = key_place::Entity::find()
        .filter(key_place::Column::DhamId.eq(id))
        .count(db)
        .await?;

    let mut body = dham_json(&d);
    body["key_place_count"] = serde_json::json!(key_place_count);
    Ok(json_response(StatusCode::OK, body))
}

/// DELETE /api/dhams/:id
pub async fn delete_dham(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let db = state.db.as_ref();
    let d = dham::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServerError::DhamNotFound(id.to_string()))?;
    dham::Entity::delete_by_id(d.id).exec(db).await?;
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "message": format!("Dham '{}' deleted", d.title) }),
    ))
}

/// POST /api/dhams/:id/key-places - Create a level-2 child
pub async fn create_key_place(
    State(state): State<Arc<AppState>>,
    Path(dham_id): Path<i32>,
    Json(req): Json<CreateChildRequest>,
) -> Result<Response> {
    require_title(&req.title)?;
    let db = state.db.as_ref();

    dham::Entity::find_by_id(dham_id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Dham", id: dham_id })?;

    // None means the parent has no code yet; assignment is deferred.
    let hierarchy_id = hierarchy::next_key_place_id(db, dham_id).await?;
    if hierarchy_id.is_none() {
        tracing::warn!(dham_id, "Creating key place without hierarchy ID (parent unresolved)");
    }

    let now = now_timestamp();
    let created = key_place::ActiveModel {
        dham_id: Set(dham_id),
        title: Set(req.title.clone()),
        slug: Set(slugify(&req.title)),
        short_description: Set(req.short_description),
        featured_image: Set(req.featured_image),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        sort_order: Set(req.sort_order),
        is_visible: Set(i32::from(req.is_visible)),
        hierarchy_id: Set(hierarchy_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(json_response(StatusCode::CREATED, key_place_json(&created)))
}

/// GET /api/dhams/:id/key-places
pub async fn list_key_places(
    State(state): State<Arc<AppState>>,
    Path(dham_id): Path<i32>,
) -> Result<Response> {
    let rows = key_place::Entity::find()
        .filter(key_place::Column::DhamId.eq(dham_id))
        .order_by_asc(key_place::Column::SortOrder)
        .order_by_asc(key_place::Column::Id)
        .all(state.db.as_ref())
        .await?;
    let items: Vec<_> = rows.iter().map(key_place_json).collect();
    Ok(json_response(StatusCode::OK, serde_json::json!({ "key_places": items })))
}

/// DELETE /api/key-places/:id
pub async fn delete_key_place(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let db = state.db.as_ref();
    key_place::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Key Place", id })?;
    key_place::Entity::delete_by_id(id).exec(db).await?;
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "message": "Key place deleted" }),
    ))
}

/// POST /api/key-places/:id/key-spots - Create a level-3 child
pub async fn create_key_spot(
    State(state): State<Arc<AppState>>,
    Path(key_place_id): Path<i32>,
    Json(req): Json<CreateChildRequest>,
) -> Result<Response> {
    require_title(&req.title)?;
    let db = state.db.as_ref();

    key_place::Entity::find_by_id(key_place_id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Key Place", id: key_place_id })?;

    let hierarchy_id = hierarchy::next_key_spot_id(db, key_place_id).await?;
    if hierarchy_id.is_none() {
        tracing::warn!(
            key_place_id,
            "Creating key spot without hierarchy ID (parent unresolved)"
        );
    }

    let now = now_timestamp();
    let created = key_spot::ActiveModel {
        key_place_id: Set(key_place_id),
        category_id: Set(req.category_id),
        title: Set(req.title.clone()),
        slug: Set(slugify(&req.title)),
        short_description: Set(req.short_description),
        featured_image: Set(req.featured_image),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        sort_order: Set(req.sort_order),
        is_visible: Set(i32::from(req.is_visible)),
        hierarchy_id: Set(hierarchy_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(json_response(StatusCode::CREATED, key_spot_json(&created)))
}

/// GET /api/key-places/:id/key-spots
pub async fn list_key_spots(
    State(state): State<Arc<AppState>>,
    Path(key_place_id): Path<i32>,
) -> Result<Response> {
    let rows = key_spot::Entity::find()
        .filter(key_spot::Column::KeyPlaceId.eq(key_place_id))
        .order_by_asc(key_spot::Column::SortOrder)
        .order_by_asc(key_spot::Column::Id)
        .all(state.db.as_ref())
        .await?;
    let items: Vec<_> = rows.iter().map(key_spot_json).collect();
    Ok(json_response(StatusCode::OK, serde_json::json!({ "key_spots": items })))
}

/// DELETE /api/key-spots/:id
pub async fn delete_key_spot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let db = state.db.as_ref();
    key_spot::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Key Spot", id })?;
    key_spot::Entity::delete_by_id(id).exec(db).await?;
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "message": "Key spot deleted" }),
    ))
}

/// POST /api/key-spots/:id/sub-spots - Create a level-4 child
pub async fn create_sub_spot(
    State(state): State<Arc<AppState>>,
    Path(key_spot_id): Path<i32>,
    Json(req): Json<CreateChildRequest>,
) -> Result<Response> {
    require_title(&req.title)?;
    let db = state.db.as_ref();

    key_spot::Entity::find_by_id(key_spot_id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Key Spot", id: key_spot_id })?;

    let hierarchy_id = hierarchy::next_sub_spot_id(db, key_spot_id).await?;
    if hierarchy_id.is_none() {
        tracing::warn!(
            key_spot_id,
            "Creating sub-spot without hierarchy ID (parent unresolved)"
        );
    }

    let now = now_timestamp();
    let created = sub_spot::ActiveModel {
        key_spot_id: Set(key_spot_id),
        category_id: Set(req.category_id),
        title: Set(req.title.clone()),
        slug: Set(slugify(&req.title)),
        short_description: Set(req.short_description),
        featured_image: Set(req.featured_image),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        sort_order: Set(req.sort_order),
        is_visible: Set(i32::from(req.is_visible)),
        hierarchy_id: Set(hierarchy_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(json_response(StatusCode::CREATED, sub_spot_json(&created)))
}

/// GET /api/key-spots/:id/sub-spots
pub async fn list_sub_spots(
    State(state): State<Arc<AppState>>,
    Path(key_spot_id): Path<i32>,
) -> Result<Response> {
    let rows = sub_spot::Entity::find()
        .filter(sub_spot::Column::KeySpotId.eq(key_spot_id))
        .order_by_asc(sub_spot::Column::SortOrder)
        .order_by_asc(sub_spot::Column::Id)
        .all(state.db.as_ref())
        .await?;
    let items: Vec<_> = rows.iter().map(sub_spot_json).collect();
    Ok(json_response(StatusCode::OK, serde_json::json!({ "sub_spots": items })))
}

/// DELETE /api/sub-spots/:id
pub async fn delete_sub_spot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let db = state.db.as_ref();
    sub_spot::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServerError::ParentNotFound { kind: "Sub-Spot", id })?;
    sub_spot::Entity::delete_by_id(id).exec(db).await?;
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "message": "Sub-spot deleted" }),
    ))
}

/// GET /api/categories - Both category tables
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Response> {
    let db = state.db.as_ref();
    let spot: Vec<_> = spot_category::Entity::find()
        .order_by_asc(spot_category::Column::SortOrder)
        .all(db)
        .await?
        .iter()
        .map(|c| serde_json::json!({ "id": c.id, "name": c.name, "icon": c.icon }))
        .collect();
    let sub: Vec<_> = sub_spot_category::Entity::find()
        .order_by_asc(sub_spot_category::Column::SortOrder)
        .all(db)
        .await?
        .iter()
        .map(|c| serde_json::json!({ "id": c.id, "name": c.name, "icon": c.icon }))
        .collect();
    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({ "spot_categories": spot, "sub_spot_categories": sub }),
    ))
}

fn missing_id<C: ColumnTrait>(col: C) -> Condition {
    Condition::any().add(col.is_null()).add(col.eq(""))
}

/// GET /api/hierarchy/stats - Row counts and missing-ID counts per level
pub async fn hierarchy_stats(State(state): State<Arc<AppState>>) -> Result<Response> {
    let db = state.db.as_ref();

    let dham_total = dham::Entity::find().count(db).await?;
    let dham_missing = dham::Entity::find()
        .filter(missing_id(dham::Column::HierarchyId))
        .count(db)
        .await?;
    let kp_total = key_place::Entity::find().count(db).await?;
    let kp_missing = key_place::Entity::find()
        .filter(missing_id(key_place::Column::HierarchyId))
        .count(db)
        .await?;
    let ks_total = key_spot::Entity::find().count(db).await?;
    let ks_missing = key_spot::Entity::find()
        .filter(missing_id(key_spot::Column::HierarchyId))
        .count(db)
        .await?;
    let ss_total = sub_spot::Entity::find().count(db).await?;
    let ss_missing = sub_spot::Entity::find()
        .filter(missing_id(sub_spot::Column::HierarchyId))
        .count(db)
        .await?;

    Ok(json_response(
        StatusCode::OK,
        serde_json::json!({
            "dhams": { "total": dham_total, "missing_hierarchy_id": dham_missing },
            "key_places": { "total": kp_total, "missing_hierarchy_id": kp_missing },
            "key_spots": { "total": ks_total, "missing_hierarchy_id": ks_missing },
            "sub_spots": { "total": ss_total, "missing_hierarchy_id": ss_missing },
        }),
    ))
}

/// POST /api/hierarchy/backfill - Run the repair pass on demand
pub async fn run_backfill(State(state): State<Arc<AppState>>) -> Result<Response> {
    let report = hierarchy::backfill_hierarchy_ids(state.db.as_ref()).await?;
    tracing::info!(
        repaired = report.total_repaired(),
        skipped = report.skipped,
        "Hierarchy backfill finished"
    );
    Ok((StatusCode::OK, Json(report)).into_response())
}

/// Health check endpoint
pub async fn health() -> Response {
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}
