use crate::api::handlers::{
    auth::{session, AuthConfig, AuthState},
    health, items, recovered, root,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use mongodb::{Client, Database};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Start the server
/// # Errors
/// Return error if the database client cannot be built or the listener fails
pub async fn new(
    port: u16,
    dsn: &str,
    database: &str,
    auth_config: AuthConfig,
    frontend_origins: &[String],
) -> Result<()> {
    // The client manages its own connection pool and is shared process-wide.
    let client = Client::with_uri_str(dsn)
        .await
        .context("Failed to build database client")?;
    let db = client.database(database);

    let auth_state = Arc::new(AuthState::new(auth_config));

    let app = app(db, auth_state, frontend_origins)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Build the application router with the full middleware stack.
///
/// # Errors
/// Returns an error if an allowed origin cannot be parsed.
pub fn app(
    db: Database,
    auth_state: Arc<AuthState>,
    frontend_origins: &[String],
) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::list(allowed_origins(frontend_origins)?))
        .allow_credentials(true);

    let router = Router::new()
        .route("/", get(root::welcome))
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi::serve))
        .route("/jwt", post(session::issue))
        .route("/logout", post(session::logout))
        .route("/totalData", get(items::total_data))
        .route("/allItems", post(items::all_items))
        .route("/countTotalItems", get(items::count_total_items))
        .route("/allLostAndFountItems", get(items::browse))
        .route("/items/:id", post(items::item_by_id))
        .route("/myItems", post(items::my_items))
        .route("/addItems", post(items::add_item))
        .route("/updateItems/:id", post(items::update_item))
        .route("/updateStatus/:id", post(items::update_status))
        .route("/deleteItem/:id", post(items::delete_item))
        .route("/latestItems", post(items::latest_items))
        .route("/search", post(items::search))
        .route("/recoveredItems", post(recovered::add_recovered))
        .route("/allRecovered", post(recovered::my_recovered))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(db)),
        );

    Ok(router)
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn allowed_origins(frontend_origins: &[String]) -> Result<Vec<HeaderValue>> {
    frontend_origins
        .iter()
        .map(|origin| origin_value(origin))
        .collect()
}

fn origin_value(frontend_origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_origin)
        .with_context(|| format!("Invalid frontend origin: {frontend_origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Frontend origin must include a valid host: {frontend_origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build allowed origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_value_normalizes_trailing_slash() {
        let value = origin_value("http://localhost:5173/").ok();
        assert_eq!(
            value.as_ref().and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn origin_value_rejects_garbage() {
        assert!(origin_value("not a url").is_err());
    }

    #[test]
    fn allowed_origins_collects_all() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "https://retrovi.example.test".to_string(),
        ];
        let values = allowed_origins(&origins).unwrap_or_default();
        assert_eq!(values.len(), 2);
    }
}
