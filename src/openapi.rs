use utoipa::OpenApi;

use crate::models::{Credentials, LoginResponse, Post, RefreshResponse, TokenRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::signup,
        crate::routes::login,
        crate::routes::refresh,
        crate::routes::logout,
        crate::routes::list_posts,
        crate::routes::list_my_posts,
        crate::routes::patch_post,
    ),
    components(schemas(Credentials, TokenRequest, LoginResponse, RefreshResponse, Post)),
    tags(
        (name = "postbox", description = "Authenticated posts API")
    )
)]
pub struct ApiDoc;
