use actix_cors::Cors;
use actix_web::{App, HttpServer};
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod error;
mod models;
mod openapi;
mod repo;
mod routes;

use auth::TokenConfig;
use models::Post;
use openapi::ApiDoc;
use repo::InMemRepo;
use routes::{config, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Environment variables must be set externally (shell, systemd, Docker).
    // Load .env automatically only in debug builds to reduce manual setup.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    validate_env_vars();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping postbox server");

    let tokens = TokenConfig::from_env();
    info!(
        "Token TTLs: access={:?}s refresh={:?}s",
        tokens.access_ttl, tokens.refresh_ttl
    );

    let repo = InMemRepo::with_posts(seed_posts());
    info!("Using in-memory store, seeded post collection");

    let openapi = ApiDoc::openapi();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(4000);

    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
                .max_age(3600);
            if let Ok(front) = std::env::var("FRONTEND_URL") {
                c = c.allowed_origin(&front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
            .app_data(actix_web::web::Data::new(AppState {
                repo: Arc::new(repo.clone()),
                tokens,
            }))
    })
    .bind(("0.0.0.0", port))?;

    info!("Listening on http://0.0.0.0:{port}");

    server.run().await
}

/// The collection is volatile and posts are never created through the API, so
/// a fixture set is installed at startup.
fn seed_posts() -> Vec<Post> {
    let raw = serde_json::json!([
        { "id": 0, "author": "Williams", "title": "Post 0", "body": "Lorem ipsum dolor sit amet" },
        { "id": 1, "author": "Anderson", "title": "Post 1", "body": "Consectetur adipiscing elit" },
        { "id": 2, "author": "Williams", "title": "Post 2", "body": "Sed do eiusmod tempor" },
        { "id": 3, "author": "Anderson", "title": "Post 3", "body": "Ut labore et dolore" },
        { "id": 4, "author": "Davis",    "title": "Post 4", "body": "Magna aliqua" }
    ]);
    serde_json::from_value(raw).expect("static seed posts deserialize")
}

/// Exit early with a readable message instead of panicking mid-request when a
/// signing secret is absent.
fn validate_env_vars() {
    use std::env;

    let required = vec!["ACCESS_TOKEN_SECRET", "REFRESH_TOKEN_SECRET"];

    let mut missing = Vec::new();
    for var in required {
        if env::var(var).is_err() {
            missing.push(var);
        }
    }

    if !missing.is_empty() {
        eprintln!("Missing required environment variables: {:?}", missing);
        eprintln!("Please copy .env.example to .env and configure it");
        std::process::exit(1);
    }
}
