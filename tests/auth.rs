use actix_web::{dev::Payload, test, FromRequest};
use jsonwebtoken::{encode, EncodingKey, Header};
use postbox::auth::{create_token, decode_token, Auth, Claims, TokenConfig, TokenKind};
use postbox::error::ApiError;
use serial_test::serial;
use std::env;

// Helper that installs both signing secrets for tests.
fn set_secrets() {
    env::set_var("ACCESS_TOKEN_SECRET", "access-test-secret-0123456789abcdef");
    env::set_var("REFRESH_TOKEN_SECRET", "refresh-test-secret-0123456789abcdef");
}

#[actix_web::test]
#[serial]
async fn token_roundtrip_without_expiry() {
    set_secrets();
    let token = create_token(TokenKind::Access, "Smith", None).expect("token");
    let claims = decode_token(TokenKind::Access, &token).expect("decode");
    assert_eq!(claims.name, "Smith");
    assert!(claims.exp.is_none(), "no TTL configured, no exp claim");
}

#[actix_web::test]
#[serial]
async fn ttl_sets_future_exp_claim() {
    set_secrets();
    let token = create_token(TokenKind::Access, "Smith", Some(3600)).expect("token");
    let claims = decode_token(TokenKind::Access, &token).expect("decode");
    let now = chrono::Utc::now().timestamp() as usize;
    assert!(claims.exp.expect("exp present") > now);
}

#[actix_web::test]
#[serial]
async fn expired_token_rejected() {
    set_secrets();
    // Mint a token whose exp is an hour in the past, beyond any leeway.
    let claims = Claims {
        name: "Smith".into(),
        exp: Some((chrono::Utc::now().timestamp() - 3600) as usize),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret("access-test-secret-0123456789abcdef".as_bytes()),
    )
    .expect("encode");
    assert!(decode_token(TokenKind::Access, &token).is_err());
}

#[actix_web::test]
#[serial]
async fn access_and_refresh_secrets_are_distinct() {
    set_secrets();
    let refresh = create_token(TokenKind::Refresh, "Smith", None).expect("token");
    assert!(decode_token(TokenKind::Access, &refresh).is_err());
    assert!(decode_token(TokenKind::Refresh, &refresh).is_ok());
}

#[actix_web::test]
#[serial]
async fn extractor_accepts_valid_bearer() {
    set_secrets();
    let token = create_token(TokenKind::Access, "Davis", None).expect("token");
    let req = test::TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();
    let mut pl = Payload::None;
    let auth = Auth::from_request(&req, &mut pl).await.expect("extract");
    assert_eq!(auth.0.name, "Davis");
}

#[actix_web::test]
#[serial]
async fn extractor_missing_header_is_unauthorized() {
    set_secrets();
    let req = test::TestRequest::default().to_http_request();
    let mut pl = Payload::None;
    let err = Auth::from_request(&req, &mut pl).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[actix_web::test]
#[serial]
async fn extractor_header_without_token_segment_is_unauthorized() {
    set_secrets();
    // A bare token with no scheme word has no second segment to extract.
    let req = test::TestRequest::default()
        .insert_header(("Authorization", "sometoken"))
        .to_http_request();
    let mut pl = Payload::None;
    let err = Auth::from_request(&req, &mut pl).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[actix_web::test]
#[serial]
async fn extractor_rejects_bad_signature_as_forbidden() {
    set_secrets();
    let req = test::TestRequest::default()
        .insert_header(("Authorization", "Bearer notatoken"))
        .to_http_request();
    let mut pl = Payload::None;
    let err = Auth::from_request(&req, &mut pl).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[actix_web::test]
#[serial]
async fn extractor_rejects_refresh_token_on_posts_gate() {
    set_secrets();
    // Refresh tokens are signed with the other secret and must not pass the
    // access gate.
    let refresh = create_token(TokenKind::Refresh, "Davis", None).expect("token");
    let req = test::TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", refresh)))
        .to_http_request();
    let mut pl = Payload::None;
    let err = Auth::from_request(&req, &mut pl).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[actix_web::test]
#[serial]
async fn token_config_reads_optional_ttls() {
    env::remove_var("ACCESS_TOKEN_TTL_SECS");
    env::remove_var("REFRESH_TOKEN_TTL_SECS");
    let cfg = TokenConfig::from_env();
    assert_eq!(cfg.access_ttl, None);
    assert_eq!(cfg.refresh_ttl, None);

    env::set_var("ACCESS_TOKEN_TTL_SECS", "900");
    let cfg = TokenConfig::from_env();
    assert_eq!(cfg.ttl_for(TokenKind::Access), Some(900));
    assert_eq!(cfg.ttl_for(TokenKind::Refresh), None);
    env::remove_var("ACCESS_TOKEN_TTL_SECS");
}
