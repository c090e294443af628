use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::auth::{self, Auth, TokenConfig, TokenKind};
use crate::error::ApiError;
use crate::models::*;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(web::resource("/signup").route(web::post().to(signup)))
            .service(web::resource("/login").route(web::post().to(login)))
            .service(web::resource("/token").route(web::post().to(refresh)))
            .service(web::resource("/logout").route(web::delete().to(logout))),
    )
    .service(
        web::scope("/posts")
            .service(web::resource("").route(web::get().to(list_posts)))
            .service(web::resource("/my").route(web::get().to(list_my_posts)))
            .service(web::resource("/{id}").route(web::patch().to(patch_post))),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub tokens: TokenConfig,
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = Credentials,
    responses(
        (status = 200, description = "Account created"),
        (status = 422, description = "Missing input or duplicate username")
    )
)]
pub async fn signup(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let (username, password) = payload
        .into_inner()
        .into_parts()
        .ok_or(ApiError::MissingSignupInput)?;
    if data.repo.find_user(&username).await?.is_some() {
        return Err(ApiError::UserExists);
    }
    // bcrypt is CPU-bound; keep it off the executor threads.
    let password_hash = web::block(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| {
            log::error!("hash task failed: {e}");
            ApiError::Internal
        })?
        .map_err(|e| {
            log::error!("bcrypt hash error: {e}");
            ApiError::Internal
        })?;
    data.repo
        .create_user(User { name: username, password_hash })
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "result": "Signup is successful" })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Token pair issued", body = LoginResponse),
        (status = 404, description = "Missing input or bad credentials")
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let (username, password) = payload
        .into_inner()
        .into_parts()
        .ok_or(ApiError::MissingLoginInput)?;
    let user = data
        .repo
        .find_user(&username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    let hash = user.password_hash.clone();
    let valid = web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            log::error!("verify task failed: {e}");
            ApiError::Internal
        })?
        .map_err(|e| {
            log::error!("bcrypt verify error: {e}");
            ApiError::Internal
        })?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token =
        auth::create_token(TokenKind::Access, &user.name, data.tokens.access_ttl)
            .map_err(|_| ApiError::Internal)?;
    let refresh_token =
        auth::create_token(TokenKind::Refresh, &user.name, data.tokens.refresh_ttl)
            .map_err(|_| ApiError::Internal)?;
    data.repo.insert_refresh_token(refresh_token.clone()).await?;
    Ok(HttpResponse::Ok().json(LoginResponse { access_token, refresh_token }))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Fresh access token", body = RefreshResponse),
        (status = 401, description = "No token supplied"),
        (status = 403, description = "Unknown or invalid refresh token")
    )
)]
pub async fn refresh(
    data: web::Data<AppState>,
    payload: web::Json<TokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = payload
        .into_inner()
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;
    if !data.repo.has_refresh_token(&token).await? {
        return Err(ApiError::TokenNotFound);
    }
    let claims =
        auth::decode_token(TokenKind::Refresh, &token).map_err(|_| ApiError::InvalidToken)?;
    // The refresh token stays registered; only a new access credential is
    // minted.
    let access_token =
        auth::create_token(TokenKind::Access, &claims.name, data.tokens.access_ttl)
            .map_err(|_| ApiError::Internal)?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}

#[utoipa::path(
    delete,
    path = "/auth/logout",
    request_body = TokenRequest,
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "No token supplied"),
        (status = 403, description = "Token not registered")
    )
)]
pub async fn logout(
    data: web::Data<AppState>,
    payload: web::Json<TokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = payload
        .into_inner()
        .token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;
    data.repo
        .remove_refresh_token(&token)
        .await
        .map_err(|_| ApiError::TokenNotFound)?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "Every post, collection order", body = [Post]),
        (status = 401, description = "Missing or malformed Authorization header"),
        (status = 403, description = "Invalid access token")
    )
)]
pub async fn list_posts(
    _auth: Auth,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let posts = data.repo.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    get,
    path = "/posts/my",
    responses(
        (status = 200, description = "Posts authored by the caller", body = [Post]),
        (status = 401, description = "Missing or malformed Authorization header"),
        (status = 403, description = "Invalid access token")
    )
)]
pub async fn list_my_posts(
    auth: Auth,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let posts = data.repo.list_posts_by(&auth.0.name).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    patch,
    path = "/posts/{id}",
    request_body = Post,
    params(("id" = Id, Path, description = "Post id")),
    responses(
        (status = 200, description = "Replaced post", body = Post),
        (status = 403, description = "Invalid token, or caller is not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn patch_post(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<Id>,
    payload: web::Json<Post>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = data
        .repo
        .get_post(id)
        .await
        .map_err(|_| ApiError::PostNotFound)?;
    if existing.author.as_deref() != Some(auth.0.name.as_str()) {
        return Err(ApiError::AccessDenied);
    }
    // Full overwrite: the body becomes the post, dropped fields and all.
    let updated = data
        .repo
        .replace_post(id, payload.into_inner())
        .await
        .map_err(|_| ApiError::PostNotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}
