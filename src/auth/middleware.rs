use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{token::TokenService, ACCESS_TOKEN_COOKIE};
use crate::error::AppError;

/// Verifies the session token on every protected request and stores the
/// resulting [`Identity`](crate::auth::Identity) in request extensions, where
/// the [`AuthenticatedIdentity`](crate::auth::AuthenticatedIdentity)
/// extractor picks it up.
///
/// The token may arrive either as an `Authorization: Bearer` header or as the
/// `access_token` HttpOnly cookie. When both are present the header wins: an
/// explicit header is a deliberate client choice, while the cookie rides
/// along on every browser request.
pub struct AuthMiddleware {
    token_service: TokenService,
}

impl AuthMiddleware {
    pub fn new(token_service: TokenService) -> Self {
        Self { token_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            token_service: self.token_service.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    token_service: TokenService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Credential submission and sign-out carry no token.
        let path = req.path();
        if path == "/api/auth/signup"
            || path == "/api/auth/signin"
            || path == "/api/auth/signout"
        {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // Bearer header takes precedence over the cookie.
        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned);
        let token = bearer.or_else(|| {
            req.cookie(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_owned())
        });

        match token {
            Some(token) => match self.token_service.verify(&token) {
                Ok(identity) => {
                    req.extensions_mut().insert(identity);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(app_err) => Box::pin(async move { Err(app_err.into()) }),
            },
            None => Box::pin(async move { Err(AppError::Unauthenticated.into()) }),
        }
    }
}
