pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::PublicUser;

// Re-export necessary items
pub use extractors::AuthenticatedIdentity;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{decode_unverified, Claims, Identity, TokenService};

/// Name of the HttpOnly cookie carrying the session token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Payload for a sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Email address for the new account. Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Must be at least 8 characters long.
    #[validate(length(min = 8))]
    pub password: String,
}

/// Payload for a sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Envelope returned by successful sign-up and sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Public fields of the authenticated user.
    pub user: PublicUser,
    /// The signed session JWT. Also set as an HttpOnly cookie.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl AuthResponse {
    pub fn new(user: PublicUser, access_token: String, expires_in: i64) -> Self {
        Self {
            user,
            access_token,
            expires_in,
            token_type: "bearer".to_string(),
        }
    }
}
