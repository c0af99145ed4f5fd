//! Signed session credentials.
//!
//! The credential is an HS256 JWT over the process-wide shared secret. The
//! claims bind the caller's email identity with a fixed expiry; verification
//! is deterministic and never retried.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(super) struct Claims {
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Sign a credential binding `email` for `ttl_seconds` from now.
///
/// # Errors
///
/// Returns an error if the claims cannot be encoded or signing fails.
pub(super) fn sign(
    secret: &[u8],
    email: &str,
    ttl_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = jsonwebtoken::get_current_timestamp();
    let claims = Claims {
        email: email.to_string(),
        iat,
        exp: iat + ttl_seconds,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Verify signature and expiry, returning the decoded claims.
///
/// # Errors
///
/// Returns an error if the token is malformed, carries a different algorithm,
/// fails signature verification, or is expired.
pub(super) fn verify(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact; a credential is either valid or it is not.
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn sign_and_verify_round_trip() -> Result<(), jsonwebtoken::errors::Error> {
        let token = sign(SECRET, "a@x.com", 3600)?;
        let claims = verify(SECRET, &token)?;

        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp, claims.iat + 3600);
        Ok(())
    }

    #[test]
    fn rejects_expired_credential() -> Result<(), jsonwebtoken::errors::Error> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            email: "a@x.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )?;

        let result = verify(SECRET, &token);
        assert!(matches!(
            result.map_err(|err| err.into_kind()),
            Err(ErrorKind::ExpiredSignature)
        ));
        Ok(())
    }

    #[test]
    fn rejects_foreign_secret() -> Result<(), jsonwebtoken::errors::Error> {
        let token = sign(b"other-secret", "a@x.com", 3600)?;

        let result = verify(SECRET, &token);
        assert!(matches!(
            result.map_err(|err| err.into_kind()),
            Err(ErrorKind::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn rejects_tampered_token() -> Result<(), jsonwebtoken::errors::Error> {
        let token = sign(SECRET, "a@x.com", 3600)?;
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        // Swap the payload for one claiming a different identity.
        parts[1] = parts[1].chars().rev().collect();
        let tampered = parts.join(".");

        assert!(verify(SECRET, &tampered).is_err());
        Ok(())
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify(SECRET, "not-a-token").is_err());
        assert!(verify(SECRET, "").is_err());
    }
}
