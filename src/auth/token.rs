use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Issuer tag embedded in every token.
pub const ISSUER: &str = "tasknest";

/// Type discriminator for session tokens.
pub const TOKEN_TYPE_ACCESS: &str = "access";

/// Claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Email of the user at issuance time.
    pub email: String,
    /// Issuance timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issuer tag, always [`ISSUER`].
    pub iss: String,
    /// Token type discriminator, always [`TOKEN_TYPE_ACCESS`].
    #[serde(rename = "type")]
    pub token_type: String,
}

/// The identity recovered by fully verifying a token.
///
/// This is the only value task handlers may use as an ownership filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Issues and verifies signed session tokens.
///
/// Constructed once at startup with the signing secret and TTL from
/// [`Config`](crate::config::Config). Issuance is stateless: no record of the
/// token is kept server-side, and expiry is the only invalidation mechanism.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Token lifetime in seconds, as reported in the `expires_in` field of
    /// the auth response envelope and as the cookie max-age.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issues a fresh HS256-signed token for the given user.
    ///
    /// The expiry is `now + ttl`; the caller receives an opaque string and
    /// the server keeps no record of it.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: ISSUER.to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Verifies a token against the wall clock.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token against an explicit `now`, returning the identity it
    /// carries.
    ///
    /// Fails with `InvalidToken` when the token is empty, malformed, carries
    /// a signature that does not match the secret, or is missing any of the
    /// required claims (`exp`, `iat`, `sub`). Fails with `ExpiredToken` when
    /// the signature is valid but `now` is at or past the embedded expiry.
    ///
    /// Expiry is checked here against the injected `now` rather than by the
    /// JWT library, which keeps verification deterministic under test.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AppError> {
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)?;

        if now.timestamp() >= claims.exp {
            return Err(AppError::ExpiredToken);
        }

        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// Decodes a token's claims WITHOUT verifying the signature.
///
/// Returns an empty map on any parse failure rather than erroring. For
/// diagnostic and debug paths only: nothing returned from here may ever be
/// used to authorize an action.
pub fn decode_unverified(token: &str) -> Map<String, Value> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(8))
    }

    /// Flips one character of `token` at `index`, keeping it valid base64url.
    fn tamper(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, "a@b.com").unwrap();

        let identity = service.verify(&token).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "a@b.com");
    }

    #[test]
    fn test_expiry_is_a_function_of_injected_now() {
        let service = service();
        let token = service.issue(Uuid::new_v4(), "a@b.com").unwrap();
        let now = Utc::now();

        assert!(service.verify_at(&token, now).is_ok());
        assert_eq!(
            service.verify_at(&token, now + Duration::hours(9)),
            Err(AppError::ExpiredToken)
        );
        // Exactly at the boundary counts as expired.
        assert_eq!(
            service.verify_at(&token, now + Duration::hours(8)),
            Err(AppError::ExpiredToken)
        );
    }

    #[test]
    fn test_empty_and_malformed_tokens_are_invalid() {
        let service = service();
        assert_eq!(service.verify(""), Err(AppError::InvalidToken));
        assert_eq!(service.verify("not-a-jwt"), Err(AppError::InvalidToken));
        assert_eq!(service.verify("a.b.c"), Err(AppError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service().issue(Uuid::new_v4(), "a@b.com").unwrap();
        let other = TokenService::new("a-completely-different-secret", Duration::hours(8));
        assert_eq!(other.verify(&token), Err(AppError::InvalidToken));
    }

    #[test]
    fn test_tampering_any_segment_is_invalid_never_expired() {
        let service = service();
        let token = service.issue(Uuid::new_v4(), "a@b.com").unwrap();
        let now = Utc::now();

        let dots: Vec<usize> = token
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .map(|(i, _)| i)
            .collect();
        // One byte in the header, one in the payload, one in the signature.
        for index in [1, dots[0] + 2, dots[1] + 2] {
            let tampered = tamper(&token, index);
            assert_eq!(
                service.verify_at(&tampered, now),
                Err(AppError::InvalidToken),
                "tampered byte at {} must not verify",
                index
            );
        }
    }

    #[test]
    fn test_missing_required_claims_are_invalid() {
        // Signed with the right secret, but no `sub` claim.
        let claims = serde_json::json!({
            "email": "a@b.com",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(AppError::InvalidToken));
    }

    #[test]
    fn test_decode_unverified_ignores_signature() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, "a@b.com").unwrap();

        // Break the signature; the claims must still come back.
        let dots: Vec<usize> = token
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .map(|(i, _)| i)
            .collect();
        let tampered = tamper(&token, dots[1] + 2);
        assert_eq!(service.verify(&tampered), Err(AppError::InvalidToken));

        let claims = decode_unverified(&tampered);
        assert_eq!(claims["sub"], serde_json::json!(user_id.to_string()));
        assert_eq!(claims["email"], serde_json::json!("a@b.com"));
        assert_eq!(claims["iss"], serde_json::json!(ISSUER));
        assert_eq!(claims["type"], serde_json::json!(TOKEN_TYPE_ACCESS));
    }

    #[test]
    fn test_decode_unverified_returns_empty_on_garbage() {
        assert!(decode_unverified("").is_empty());
        assert!(decode_unverified("definitely not a token").is_empty());
    }
}
