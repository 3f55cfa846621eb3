//! Signed session tokens (HS256 JWT).
//!
//! A token carries the caller's id, email and role plus issue and expiry
//! times. Verification failures of any kind (bad signature, expired,
//! malformed claims) collapse into [`InvalidToken`].

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use star_rating_core::{Email, Role, UserId};

use super::{AuthError, InvalidToken};
use crate::models::Identity;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: UserId,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`; tokens live for `ttl_hours`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: identity.id,
            email: identity.email.as_str().to_owned(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        })
    }

    /// Verify a token and recover the identity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` if the token is tampered, expired or malformed.
    pub fn verify(&self, token: &str) -> Result<Identity, InvalidToken> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            InvalidToken
        })?;

        let claims = data.claims;
        let email = Email::parse(&claims.email).map_err(|_| InvalidToken)?;

        Ok(Identity {
            id: claims.sub,
            email,
            role: claims.role,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::TokenSigning)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(SECRET), 24)
    }

    fn jane() -> Identity {
        Identity {
            id: UserId::new(42),
            email: Email::parse("jane@x.com").unwrap(),
            role: Role::StoreOwner,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let token = tokens.issue(&jane()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), jane());
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = service().issue(&jane()).unwrap();
        let other = TokenService::new(&SecretString::from("Zq8#vN1!cR6@hJ3$kT9&wE2*pL5^mB7"), 24);
        assert!(matches!(other.verify(&token), Err(InvalidToken)));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = service();
        let token = tokens.issue(&jane()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = tokens
            .sign(&Claims {
                sub: UserId::new(42),
                email: "jane@x.com".to_owned(),
                role: Role::Admin,
                iat: 0,
                exp: i64::MAX / 2,
            })
            .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_owned();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");
        assert!(matches!(tokens.verify(&tampered), Err(InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(48);
        let token = tokens
            .sign(&Claims {
                sub: UserId::new(42),
                email: "jane@x.com".to_owned(),
                role: Role::User,
                iat: issued.timestamp(),
                exp: (issued + Duration::hours(24)).timestamp(),
            })
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(service().verify("not-a-jwt"), Err(InvalidToken)));
        assert!(matches!(service().verify(""), Err(InvalidToken)));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug_output = format!("{:?}", service());
        assert!(!debug_output.contains(SECRET));
    }
}
