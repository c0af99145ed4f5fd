//! Lost-and-found item routes.
//!
//! Every operation is a direct translation: build one filter from the request,
//! invoke one driver primitive, forward the result. The only business rules
//! are calendar-day date normalization on insert/update and the one-way
//! `not recovered` -> `recovered` status transition.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime, Document},
    results::{DeleteResult, InsertOneResult, UpdateResult},
    Collection, Database,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{
    auth::principal::{require_auth, require_owner, OwnerClaim},
    auth::AuthState,
    types::{documents_json, document_json, DeleteResponse, InsertResponse, UpdateResponse},
};

const ITEMS_COLLECTION: &str = "lost_and_found_items";

const BROWSE_PAGE_SIZE: u64 = 12;
const ALL_ITEMS_PAGE_SIZE: i64 = 10;
const LATEST_ITEMS_LIMIT: i64 = 6;

const STATUS_NOT_RECOVERED: &str = "not recovered";
const STATUS_RECOVERED: &str = "recovered";

fn items(db: &Database) -> Collection<Document> {
    db.collection(ITEMS_COLLECTION)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalData {
    pub total_data: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalCount {
    pub total: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub pg_cnt: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountQuery {
    pub item_type: Option<String>,
    pub search_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub sorting_key: Option<String>,
    pub pg_cnt: Option<u64>,
    pub search_key: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemSubmission {
    #[schema(value_type = Object)]
    pub new_item: Document,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub key: String,
}

#[utoipa::path(
    get,
    path = "/totalData",
    responses(
        (status = 200, description = "Estimated number of stored items", body = TotalData)
    ),
    tag = "items"
)]
pub async fn total_data(db: Extension<Database>) -> impl IntoResponse {
    match items(&db).estimated_document_count().await {
        Ok(total_data) => Json(TotalData { total_data }).into_response(),
        Err(err) => {
            error!("Failed to count items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/allItems",
    request_body = PageRequest,
    responses(
        (status = 200, description = "One page of items")
    ),
    tag = "items"
)]
pub async fn all_items(
    db: Extension<Database>,
    Json(payload): Json<PageRequest>,
) -> impl IntoResponse {
    match fetch_page(&db, payload.pg_cnt).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to list items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/countTotalItems",
    responses(
        (status = 200, description = "Number of items matching the search filter", body = TotalCount)
    ),
    tag = "items"
)]
pub async fn count_total_items(
    Query(query): Query<CountQuery>,
    db: Extension<Database>,
) -> impl IntoResponse {
    let filter = search_filter(
        query.search_key.as_deref().unwrap_or(""),
        post_type(query.item_type.as_deref()),
    );

    // Kept as a fetch-and-count of the same filter the listing uses.
    match fetch_filtered(&db, filter).await {
        Ok(result) => Json(TotalCount {
            total: result.len(),
        })
        .into_response(),
        Err(err) => {
            error!("Failed to count matching items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/allLostAndFountItems",
    responses(
        (status = 200, description = "Filtered page of items")
    ),
    tag = "items"
)]
pub async fn browse(Query(query): Query<BrowseQuery>, db: Extension<Database>) -> impl IntoResponse {
    let filter = search_filter(
        query.search_key.as_deref().unwrap_or(""),
        post_type(query.sorting_key.as_deref()),
    );
    let skip = query.pg_cnt.unwrap_or(0) * BROWSE_PAGE_SIZE;

    match fetch_browse_page(&db, filter, skip).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to browse items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/items/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item, or null when absent"),
        (status = 403, description = "Missing or invalid session credential")
    ),
    tag = "items"
)]
pub async fn item_by_id(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
) -> impl IntoResponse {
    if let Err(reject) = require_auth(&headers, &auth_state) {
        return reject.into_response();
    }

    let Ok(item_id) = ObjectId::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match fetch_item(&db, item_id).await {
        Ok(item) => Json(item.map(document_json)).into_response(),
        Err(err) => {
            error!("Failed to fetch item {item_id}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/myItems",
    responses(
        (status = 200, description = "Items owned by the caller"),
        (status = 403, description = "Missing credential or foreign email claim")
    ),
    tag = "items"
)]
pub async fn my_items(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
    Json(filter): Json<Document>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(reject) => return reject.into_response(),
    };
    let claimed = filter.get_str("email").ok();
    if let Err(reject) = require_owner(&principal, claimed) {
        return reject.into_response();
    }

    // The body document is the filter, exactly as the client sent it.
    match fetch_filtered(&db, filter).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to list caller items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/addItems",
    request_body = ItemSubmission,
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertResponse),
        (status = 403, description = "Missing credential or foreign email claim")
    ),
    tag = "items"
)]
pub async fn add_item(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
    Json(payload): Json<ItemSubmission>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(reject) => return reject.into_response(),
    };
    if let Err(reject) = require_owner(&principal, payload.email.as_deref()) {
        return reject.into_response();
    }

    let item = truncate_date_field(payload.new_item);

    match insert_item(&db, item).await {
        Ok(result) => Json(InsertResponse::from(result)).into_response(),
        Err(err) => {
            error!("Failed to insert item: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/updateItems/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = ItemSubmission,
    responses(
        (status = 200, description = "Update acknowledgement (upsert)", body = UpdateResponse),
        (status = 403, description = "Missing credential or foreign email claim")
    ),
    tag = "items"
)]
pub async fn update_item(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
    Json(payload): Json<ItemSubmission>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(reject) => return reject.into_response(),
    };
    if let Err(reject) = require_owner(&principal, payload.email.as_deref()) {
        return reject.into_response();
    }

    let Ok(item_id) = ObjectId::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let item = truncate_date_field(payload.new_item);

    match upsert_item(&db, item_id, item).await {
        Ok(result) => Json(UpdateResponse::from(result)).into_response(),
        Err(err) => {
            error!("Failed to update item {item_id}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/updateStatus/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Update acknowledgement, or the all-zero no-op marker", body = UpdateResponse),
        (status = 403, description = "Missing or invalid session credential")
    ),
    tag = "items"
)]
pub async fn update_status(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
) -> impl IntoResponse {
    if let Err(reject) = require_auth(&headers, &auth_state) {
        return reject.into_response();
    }

    let Ok(item_id) = ObjectId::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    // Check-then-set: the transition is one-way and idempotent, so two racing
    // calls at worst both observe "not recovered" and apply the same $set.
    let item = match fetch_item(&db, item_id).await {
        Ok(item) => item,
        Err(err) => {
            error!("Failed to fetch item {item_id}: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !awaiting_recovery(item.as_ref()) {
        return Json(UpdateResponse::noop()).into_response();
    }

    match mark_recovered(&db, item_id).await {
        Ok(result) => Json(UpdateResponse::from(result)).into_response(),
        Err(err) => {
            error!("Failed to mark item {item_id} recovered: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/deleteItem/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = OwnerClaim,
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteResponse),
        (status = 403, description = "Missing credential or foreign email claim")
    ),
    tag = "items"
)]
pub async fn delete_item(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
    Json(claim): Json<OwnerClaim>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(reject) => return reject.into_response(),
    };
    if let Err(reject) = require_owner(&principal, claim.email.as_deref()) {
        return reject.into_response();
    }

    let Ok(item_id) = ObjectId::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match remove_item(&db, item_id).await {
        Ok(result) => Json(DeleteResponse::from(result)).into_response(),
        Err(err) => {
            error!("Failed to delete item {item_id}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/latestItems",
    responses(
        (status = 200, description = "Six most recent items by date")
    ),
    tag = "items"
)]
pub async fn latest_items(db: Extension<Database>) -> impl IntoResponse {
    match fetch_latest(&db).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to list latest items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Items whose title or location match the key")
    ),
    tag = "items"
)]
pub async fn search(db: Extension<Database>, Json(payload): Json<SearchRequest>) -> impl IntoResponse {
    match fetch_filtered(&db, search_filter(&payload.key, None)).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to search items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Case-insensitive substring match over title and location, optionally
/// narrowed to one post type. The key is used as the pattern verbatim.
fn search_filter(key: &str, post_type: Option<&str>) -> Document {
    let mut filter = doc! {
        "$or": [
            { "title": { "$regex": key, "$options": "i" } },
            { "location": { "$regex": key, "$options": "i" } },
        ]
    };
    if let Some(kind) = post_type {
        filter.insert("postType", kind);
    }
    filter
}

/// Only the two known post types narrow the filter; anything else is ignored.
fn post_type(value: Option<&str>) -> Option<&str> {
    value.filter(|kind| *kind == "lost" || *kind == "found")
}

/// Replace a parseable `date` field with its local calendar day at midnight.
/// Anything else (absent, malformed, non-date) passes through untouched.
fn truncate_date_field(mut item: Document) -> Document {
    if let Some(truncated) = item.get("date").and_then(truncated_day) {
        item.insert("date", truncated);
    }
    item
}

fn truncated_day(value: &Bson) -> Option<Bson> {
    let instant = match value {
        Bson::String(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(_) => {
                // Date-only inputs are already a calendar day.
                let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
                let midnight = day.and_hms_opt(0, 0, 0)?;
                let local = midnight.and_local_timezone(Local).earliest()?;
                return Some(Bson::DateTime(DateTime::from_chrono(local)));
            }
        },
        Bson::DateTime(datetime) => datetime.to_chrono(),
        _ => return None,
    };

    let midnight = instant
        .with_timezone(&Local)
        .date_naive()
        .and_hms_opt(0, 0, 0)?;
    let local = midnight.and_local_timezone(Local).earliest()?;
    Some(Bson::DateTime(DateTime::from_chrono(local)))
}

fn awaiting_recovery(item: Option<&Document>) -> bool {
    item.map_or(false, |doc| {
        doc.get_str("status") == Ok(STATUS_NOT_RECOVERED)
    })
}

async fn fetch_page(db: &Database, skip: u64) -> Result<Vec<Document>, mongodb::error::Error> {
    let cursor = items(db)
        .find(doc! {})
        .skip(skip)
        .limit(ALL_ITEMS_PAGE_SIZE)
        .await?;
    cursor.try_collect().await
}

async fn fetch_filtered(
    db: &Database,
    filter: Document,
) -> Result<Vec<Document>, mongodb::error::Error> {
    let cursor = items(db).find(filter).await?;
    cursor.try_collect().await
}

async fn fetch_browse_page(
    db: &Database,
    filter: Document,
    skip: u64,
) -> Result<Vec<Document>, mongodb::error::Error> {
    let limit = i64::try_from(BROWSE_PAGE_SIZE).unwrap_or(i64::MAX);
    let cursor = items(db).find(filter).skip(skip).limit(limit).await?;
    cursor.try_collect().await
}

async fn fetch_latest(db: &Database) -> Result<Vec<Document>, mongodb::error::Error> {
    let cursor = items(db)
        .find(doc! {})
        .sort(doc! { "date": -1 })
        .limit(LATEST_ITEMS_LIMIT)
        .await?;
    cursor.try_collect().await
}

async fn fetch_item(
    db: &Database,
    item_id: ObjectId,
) -> Result<Option<Document>, mongodb::error::Error> {
    items(db).find_one(doc! { "_id": item_id }).await
}

async fn insert_item(
    db: &Database,
    item: Document,
) -> Result<InsertOneResult, mongodb::error::Error> {
    items(db).insert_one(item).await
}

async fn upsert_item(
    db: &Database,
    item_id: ObjectId,
    item: Document,
) -> Result<UpdateResult, mongodb::error::Error> {
    // Insert-if-absent is deliberate: clients re-submit the full document.
    items(db)
        .update_one(doc! { "_id": item_id }, doc! { "$set": item })
        .upsert(true)
        .await
}

async fn mark_recovered(
    db: &Database,
    item_id: ObjectId,
) -> Result<UpdateResult, mongodb::error::Error> {
    items(db)
        .update_one(
            doc! { "_id": item_id },
            doc! { "$set": { "status": STATUS_RECOVERED } },
        )
        .upsert(true)
        .await
}

async fn remove_item(
    db: &Database,
    item_id: ObjectId,
) -> Result<DeleteResult, mongodb::error::Error> {
    items(db).delete_one(doc! { "_id": item_id }).await
}
