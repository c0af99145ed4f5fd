//! Session endpoints: credential issuance (`/jwt`) and logout.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{
    state::{AuthConfig, AuthState},
    token,
};

pub(crate) const SESSION_COOKIE_NAME: &str = "retrovi_session";

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Acknowledgement {
    pub acknowledgement: bool,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/jwt",
    request_body = IssueRequest,
    responses(
        (status = 200, description = "Credential issued and set as an HTTP-only cookie", body = Acknowledgement),
        (status = 500, description = "Signing failed")
    ),
    tag = "auth"
)]
pub async fn issue(
    auth_state: Extension<Arc<AuthState>>,
    Json(payload): Json<IssueRequest>,
) -> impl IntoResponse {
    let config = auth_state.config();

    let token = match token::sign(
        config.jwt_secret_bytes(),
        &payload.email,
        config.session_ttl_seconds(),
    ) {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to sign session credential: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(config, &token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(Acknowledgement {
            acknowledgement: true,
            status: "cookie created",
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = Acknowledgement)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Always clear the cookie, even if the client never held one.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (
        StatusCode::OK,
        headers,
        Json(Acknowledgement {
            acknowledgement: true,
            status: "cookie cleared",
        }),
    )
        .into_response()
}

/// Build the `HttpOnly` session cookie for a freshly signed credential.
///
/// In production the frontend is served from another site, so the cookie is
/// `SameSite=None; Secure`; everywhere else it stays `SameSite=Strict`.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; Max-Age={ttl_seconds}");
    cookie.push_str(cookie_site_policy(config));
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0");
    cookie.push_str(cookie_site_policy(config));
    HeaderValue::from_str(&cookie)
}

fn cookie_site_policy(config: &AuthConfig) -> &'static str {
    if config.production() {
        "; SameSite=None; Secure"
    } else {
        "; SameSite=Strict"
    }
}

pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}
