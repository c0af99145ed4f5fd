//! Wire-compatible driver results and document forwarding.
//!
//! The previous deployment exposed the Node driver's result objects directly,
//! so clients expect `insertedId`/`matchedCount`-style fields, ObjectIds as
//! 24-char hex strings, and dates as RFC 3339 strings. These types pin that
//! shape independently of how the Rust driver serializes its own results.

use mongodb::bson::{Bson, Document};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
}

impl InsertResponse {
    fn acknowledged(inserted_id: Bson) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id_string(inserted_id),
        }
    }
}

impl From<InsertOneResult> for InsertResponse {
    fn from(result: InsertOneResult) -> Self {
        Self::acknowledged(result.inserted_id)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpdateResponse {
    /// The all-zero marker returned when a state transition does not apply.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            acknowledged: false,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    fn applied(matched_count: u64, modified_count: u64, upserted_id: Option<Bson>) -> Self {
        let upserted_id = upserted_id.and_then(id_string);
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        }
    }
}

impl From<UpdateResult> for UpdateResponse {
    fn from(result: UpdateResult) -> Self {
        Self::applied(
            result.matched_count,
            result.modified_count,
            result.upserted_id,
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResponse {
    fn acknowledged(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

impl From<DeleteResult> for DeleteResponse {
    fn from(result: DeleteResult) -> Self {
        Self::acknowledged(result.deleted_count)
    }
}

fn id_string(id: Bson) -> Option<String> {
    match id {
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::String(value) => Some(value),
        Bson::Null => None,
        other => Some(other.to_string()),
    }
}

/// Forward a stored document as plain JSON.
#[must_use]
pub fn document_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_json(value)))
            .collect(),
    )
}

/// Forward a result set as a plain JSON array.
#[must_use]
pub fn documents_json(documents: Vec<Document>) -> Value {
    Value::Array(
        documents
            .into_iter()
            .map(Bson::Document)
            .map(bson_json)
            .collect(),
    )
}

fn bson_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(datetime) => datetime
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(document) => document_json(document),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};

    #[test]
    fn document_json_flattens_object_ids_and_dates() {
        let oid = ObjectId::new();
        let document = doc! {
            "_id": oid,
            "title": "Black bag",
            "date": DateTime::from_millis(1_710_460_800_000),
            "tags": [oid],
            "owner": { "_id": oid },
        };

        let json = document_json(document);

        assert_eq!(json["_id"], Value::String(oid.to_hex()));
        assert_eq!(json["title"], Value::String("Black bag".to_string()));
        assert_eq!(
            json["date"],
            Value::String("2024-03-15T00:00:00Z".to_string())
        );
        assert_eq!(json["tags"][0], Value::String(oid.to_hex()));
        assert_eq!(json["owner"]["_id"], Value::String(oid.to_hex()));
    }

    #[test]
    fn documents_json_builds_an_array() {
        let documents = vec![doc! {"n": 1}, doc! {"n": 2}];
        let json = documents_json(documents);

        assert_eq!(json[0]["n"], Value::from(1));
        assert_eq!(json[1]["n"], Value::from(2));
    }

    #[test]
    fn insert_response_serializes_hex_id() {
        let oid = ObjectId::new();
        let response = InsertResponse::acknowledged(Bson::ObjectId(oid));

        let json = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(json["acknowledged"], Value::Bool(true));
        assert_eq!(json["insertedId"], Value::String(oid.to_hex()));
    }

    #[test]
    fn update_response_noop_marker_is_all_zero() {
        let json = serde_json::to_value(UpdateResponse::noop()).unwrap_or_default();

        assert_eq!(json["acknowledged"], Value::Bool(false));
        assert_eq!(json["matchedCount"], Value::from(0));
        assert_eq!(json["modifiedCount"], Value::from(0));
        assert_eq!(json["upsertedCount"], Value::from(0));
        assert_eq!(json["upsertedId"], Value::Null);
    }

    #[test]
    fn update_response_counts_upserts() {
        let oid = ObjectId::new();
        let response = UpdateResponse::applied(0, 0, Some(Bson::ObjectId(oid)));

        assert_eq!(response.upserted_count, 1);
        assert_eq!(response.upserted_id, Some(oid.to_hex()));

        let response = UpdateResponse::applied(1, 1, None);
        assert_eq!(response.upserted_count, 0);
        assert_eq!(response.upserted_id, None);
    }

    #[test]
    fn delete_response_counts() {
        let response = DeleteResponse::acknowledged(1);
        assert!(response.acknowledged);
        assert_eq!(response.deleted_count, 1);
    }
}
