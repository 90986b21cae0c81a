use crate::{
    auth::{
        hash_password, verify_password, AuthResponse, AuthenticatedIdentity, SignInRequest,
        SignUpRequest, TokenService, ACCESS_TOKEN_COOKIE,
    },
    error::AppError,
    models::{PublicUser, User},
};
use actix_web::{
    cookie::{time, Cookie, SameSite},
    get, post, web, HttpResponse, Responder,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Builds the HttpOnly session cookie mirroring the issued token.
///
/// Browser clients get the token managed for them through this cookie; API
/// clients use the `access_token` field of the response body as a bearer
/// header instead. Both channels resolve to the same verification routine.
fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .finish()
}

/// Register a new user
///
/// Creates a new user account, returns the token envelope and sets the
/// session cookie. Fails with `EMAIL_EXISTS` when the email is taken.
#[post("/signup")]
pub async fn sign_up(
    pool: web::Data<PgPool>,
    token_service: web::Data<TokenService>,
    sign_up_data: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    sign_up_data.validate()?;

    let existing_user: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&sign_up_data.email)
            .fetch_optional(&**pool)
            .await?;

    if existing_user.is_some() {
        return Err(AppError::EmailExists(sign_up_data.email.clone()));
    }

    let password_hash = hash_password(&sign_up_data.password)?;
    let user = User::new(sign_up_data.email.clone(), password_hash);

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(&**pool)
    .await?;

    let access_token = token_service.issue(user.id, &user.email)?;
    let expires_in = token_service.ttl_seconds();

    Ok(HttpResponse::Created()
        .cookie(session_cookie(access_token.clone(), expires_in))
        .json(AuthResponse::new(user.public(), access_token, expires_in)))
}

/// Login user
///
/// Authenticates with email and password, returns the token envelope and
/// sets the session cookie. A missing user and a wrong password produce the
/// same `INVALID_CREDENTIALS` response: the caller must not learn which
/// field was wrong.
#[post("/signin")]
pub async fn sign_in(
    pool: web::Data<PgPool>,
    token_service: web::Data<TokenService>,
    sign_in_data: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    sign_in_data.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(&sign_in_data.email)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) if verify_password(&sign_in_data.password, &user.password_hash) => user,
        _ => return Err(AppError::InvalidCredentials),
    };

    let access_token = token_service.issue(user.id, &user.email)?;
    let expires_in = token_service.ttl_seconds();

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(access_token.clone(), expires_in))
        .json(AuthResponse::new(user.public(), access_token, expires_in)))
}

/// Sign out
///
/// Clears the session cookie. Idempotent and requires no authentication:
/// the server holds no session state, so there is nothing else to revoke.
#[post("/signout")]
pub async fn sign_out() -> impl Responder {
    let mut cookie = session_cookie(String::new(), 0);
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "Signed out successfully" }))
}

/// Get current identity
///
/// Returns the public fields of the authenticated user. Requires a valid
/// token via bearer header or cookie.
#[get("/me")]
pub async fn me(identity: AuthenticatedIdentity) -> impl Responder {
    HttpResponse::Ok().json(PublicUser::from(identity.0))
}
