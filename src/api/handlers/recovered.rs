//! Recovered-item routes.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    results::InsertOneResult,
    Collection, Database,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{
    auth::principal::{require_auth, require_owner, OwnerClaim},
    auth::AuthState,
    types::{documents_json, InsertResponse},
};

const RECOVERED_COLLECTION: &str = "recovered_items";

fn recovered(db: &Database) -> Collection<Document> {
    db.collection(RECOVERED_COLLECTION)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredSubmission {
    #[schema(value_type = Object)]
    pub recovered_item: Document,
}

#[utoipa::path(
    post,
    path = "/recoveredItems",
    request_body = RecoveredSubmission,
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertResponse),
        (status = 403, description = "Missing or invalid session credential")
    ),
    tag = "recovered"
)]
pub async fn add_recovered(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    db: Extension<Database>,
    Json(payload): Json<RecoveredSubmission>,
) -> impl IntoResponse {
    if let Err(reject) = require_auth(&headers, &auth_state) {
        return reject.into_response();
    }

    match insert_recovered(&db, payload.recovered_item).await {
        Ok(result) => Json(InsertResponse::from(result)).into_response(),
        Err(err) => {
            error!("Failed to insert recovered item: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/allRecovered",
    request_body = OwnerClaim,
    responses(
        (status = 200, description = "Recovered items owned by the caller"),
        (status = 403, description = "Missing credential or foreign email claim")
    ),
    tag = "recovered"
)]
pub async fn my_recovered(
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

    match fetch_recovered_by_owner(&db, &principal.email).await {
        Ok(result) => Json(documents_json(result)).into_response(),
        Err(err) => {
            error!("Failed to list recovered items: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_recovered(
    db: &Database,
    item: Document,
) -> Result<InsertOneResult, mongodb::error::Error> {
    recovered(db).insert_one(item).await
}

async fn fetch_recovered_by_owner(
    db: &Database,
    email: &str,
) -> Result<Vec<Document>, mongodb::error::Error> {
    let cursor = recovered(db)
        .find(doc! { "recovUserEmail": email })
        .await?;
    cursor.try_collect().await
}
