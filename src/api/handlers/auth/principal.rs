//! Verified identity extraction and the ownership check.
//!
//! Flow Overview: read the session cookie, verify it against the shared
//! secret, and return a principal that downstream handlers can trust. The
//! ownership check compares that principal against the `email` a request
//! body claims to act for; it has no authentication capability of its own.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use super::{session::extract_session_token, state::AuthState, token};

/// Authenticated caller context derived from the session cookie.
#[derive(Clone, Debug)]
pub struct Principal {
    pub email: String,
}

/// Rejection shared by the verifier and the ownership check.
///
/// The wire shape is fixed: clients key off the 403 status and message.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Unauthorized access" })),
        )
            .into_response()
    }
}

/// The `email` a request body claims to act for.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OwnerClaim {
    pub email: Option<String>,
}

/// Resolve the session cookie into a principal, or reject with 403.
///
/// # Errors
///
/// Returns [`Unauthorized`] when the cookie is missing, malformed, carries a
/// bad signature, or is expired.
pub fn require_auth(headers: &HeaderMap, auth_state: &AuthState) -> Result<Principal, Unauthorized> {
    let token = extract_session_token(headers).ok_or(Unauthorized)?;

    match token::verify(auth_state.config().jwt_secret_bytes(), &token) {
        Ok(claims) => Ok(Principal {
            email: claims.email,
        }),
        Err(err) => {
            debug!("Session credential rejected: {err}");
            Err(Unauthorized)
        }
    }
}

/// Reject unless the claimed email matches the verified identity.
///
/// Assumes [`require_auth`] already ran; an absent claim fails closed.
///
/// # Errors
///
/// Returns [`Unauthorized`] on a missing or mismatched claim.
pub fn require_owner(principal: &Principal, claimed: Option<&str>) -> Result<(), Unauthorized> {
    match claimed {
        Some(email) if email == principal.email => Ok(()),
        _ => Err(Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::AuthConfig;
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};
    use secrecy::SecretString;

    fn auth_state() -> AuthState {
        AuthState::new(AuthConfig::new(SecretString::from("sekreto".to_string())))
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("retrovi_session={token}");
        headers.insert(COOKIE, HeaderValue::from_str(&value).unwrap_or_else(|_| {
            HeaderValue::from_static("retrovi_session=")
        }));
        headers
    }

    #[test]
    fn require_auth_accepts_fresh_credential() {
        let state = auth_state();
        let token = token::sign(b"sekreto", "a@x.com", 3600).ok();
        let token = token.unwrap_or_default();

        let principal = require_auth(&cookie_headers(&token), &state).ok();
        assert_eq!(principal.map(|p| p.email), Some("a@x.com".to_string()));
    }

    #[test]
    fn require_auth_rejects_missing_cookie() {
        let state = auth_state();
        assert!(require_auth(&HeaderMap::new(), &state).is_err());
    }

    #[test]
    fn require_auth_rejects_foreign_signature() {
        let state = auth_state();
        let token = token::sign(b"someone-else", "a@x.com", 3600).ok();
        let token = token.unwrap_or_default();

        assert!(require_auth(&cookie_headers(&token), &state).is_err());
    }

    #[test]
    fn require_owner_matches_identity() {
        let principal = Principal {
            email: "a@x.com".to_string(),
        };

        assert!(require_owner(&principal, Some("a@x.com")).is_ok());
        assert!(require_owner(&principal, Some("b@x.com")).is_err());
        assert!(require_owner(&principal, None).is_err());
    }

    #[test]
    fn unauthorized_response_shape() {
        let response = Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
