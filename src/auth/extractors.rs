use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Identity;
use crate::error::AppError;

/// Extracts the authenticated identity from request extensions.
///
/// Intended for routes protected by `AuthMiddleware`, which validates the
/// session token and inserts the verified [`Identity`] into request
/// extensions. If no identity is present (middleware not applied, or an
/// internal logic error after auth), the request fails as unauthenticated —
/// a handler must never run without a verified identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity(pub Identity);

impl FromRequest for AuthenticatedIdentity {
    type Error = ActixError; // AppError converts into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(AuthenticatedIdentity(identity))),
            None => ready(Err(AppError::Unauthenticated.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use uuid::Uuid;

    #[actix_rt::test]
    async fn test_identity_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        let identity = Identity {
            user_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
        };
        req.extensions_mut().insert(identity.clone());

        let mut payload = Payload::None;
        let extracted = AuthenticatedIdentity::from_request(&req, &mut payload).await;
        assert!(extracted.is_ok());
        assert_eq!(extracted.unwrap().0, identity);
    }

    #[actix_rt::test]
    async fn test_identity_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No identity inserted into extensions.

        let mut payload = Payload::None;
        let result = AuthenticatedIdentity::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let err = result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
