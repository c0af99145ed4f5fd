use super::handlers::{auth::session, health, items, recovered};
use axum::Json;
use utoipa::openapi::{Contact, InfoBuilder, License, Tag};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(
    health::health,
    session::issue,
    session::logout,
    items::total_data,
    items::all_items,
    items::count_total_items,
    items::browse,
    items::item_by_id,
    items::my_items,
    items::add_item,
    items::update_item,
    items::update_status,
    items::delete_item,
    items::latest_items,
    items::search,
    recovered::add_recovered,
    recovered::my_recovered,
))]
struct ApiDoc;

/// Build the `OpenAPI` document with info taken from Cargo.toml metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();

    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();
    info.contact = cargo_contact();
    info.license = cargo_license();
    spec.info = info;

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Session credential issuance and logout".to_string());

    let mut items_tag = Tag::new("items");
    items_tag.description = Some("Lost-and-found item records".to_string());

    let mut recovered_tag = Tag::new("recovered");
    recovered_tag.description = Some("Recovered item records".to_string());

    spec.tags = Some(vec![auth_tag, items_tag, recovered_tag]);

    spec
}

/// Serve the document; wired outside the documented routes themselves.
pub(crate) async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}
