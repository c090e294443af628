use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::repo::RepoError;

/// `{"errors":[{"msg": ...}]}` — the shape the signup/login form endpoints
/// emit.
#[derive(Debug, Serialize)]
pub struct FormErrorBody {
    pub errors: Vec<FormErrorItem>,
}

#[derive(Debug, Serialize)]
pub struct FormErrorItem {
    pub msg: String,
}

/// `{"message": ...}` — the shape the token and posts endpoints emit.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    // Signup failures surface at 422; login reports everything, validation
    // included, at 404 — that asymmetry is part of the published contract.
    #[error("All inputs are required")]
    MissingSignupInput,
    #[error("This user already exists")]
    UserExists,
    #[error("All inputs are required")]
    MissingLoginInput,
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error("Token is required")]
    MissingToken,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Post not found")]
    PostNotFound,
    #[error("Access denied")]
    AccessDenied,
    #[error("internal error")]
    Internal,
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::PostNotFound,
            RepoError::Conflict => ApiError::UserExists,
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;
        let status = match self {
            ApiError::MissingSignupInput | ApiError::UserExists => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MissingLoginInput | ApiError::InvalidCredentials => StatusCode::NOT_FOUND,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::TokenNotFound | ApiError::InvalidToken | ApiError::AccessDenied => {
                StatusCode::FORBIDDEN
            }
            ApiError::PostNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match self {
            ApiError::MissingSignupInput
            | ApiError::UserExists
            | ApiError::MissingLoginInput
            | ApiError::InvalidCredentials => HttpResponse::build(status).json(FormErrorBody {
                errors: vec![FormErrorItem { msg: self.to_string() }],
            }),
            _ => HttpResponse::build(status).json(MessageBody { message: self.to_string() }),
        }
    }
}
