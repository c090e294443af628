use actix_web::{dev::Payload, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::{ready, Ready};

use crate::error::ApiError;

/// Which signing secret a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn secret(self) -> String {
        let var = match self {
            TokenKind::Access => "ACCESS_TOKEN_SECRET",
            TokenKind::Refresh => "REFRESH_TOKEN_SECRET",
        };
        env::var(var).unwrap_or_else(|_| panic!("{var} not set"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub name: String,
    /// Absent unless a TTL was configured; tokens without it never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Optional token lifetimes, in seconds. The default (no TTL on either kind)
/// matches the deployed behavior; expiry is opt-in configuration on the
/// signer, never an implicit default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenConfig {
    pub access_ttl: Option<u64>,
    pub refresh_ttl: Option<u64>,
}

impl TokenConfig {
    pub fn from_env() -> Self {
        fn ttl(var: &str) -> Option<u64> {
            env::var(var).ok().and_then(|v| v.parse().ok())
        }
        Self {
            access_ttl: ttl("ACCESS_TOKEN_TTL_SECS"),
            refresh_ttl: ttl("REFRESH_TOKEN_TTL_SECS"),
        }
    }

    pub fn ttl_for(&self, kind: TokenKind) -> Option<u64> {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

/// Sign a token carrying the identity, with an `exp` claim only when a TTL is
/// supplied.
pub fn create_token(
    kind: TokenKind,
    name: &str,
    ttl_secs: Option<u64>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = ttl_secs.map(|secs| {
        chrono::Utc::now()
            .checked_add_signed(chrono::Duration::seconds(secs as i64))
            .expect("valid timestamp")
            .timestamp() as usize
    });
    let claims = Claims { name: name.to_string(), exp };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(kind.secret().as_bytes()),
    )
}

/// Verify a token against the matching secret and return its claims.
pub fn decode_token(kind: TokenKind, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp is honored when present but tokens were historically minted
    // without one, so it cannot be a required claim.
    validation.required_spec_claims.clear();
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(kind.secret().as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Extractor gating the posts routes: yields the verified identity or rejects
/// the request before the handler runs.
///
/// 401 when the `Authorization` header is missing or has no token segment,
/// 403 when the segment fails verification. The scheme word is not inspected;
/// the token is whatever follows the first whitespace, mirroring the
/// published behavior.
#[derive(Debug)]
pub struct Auth(pub Claims);

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let token = match header.map(|h| h.split_whitespace().nth(1)) {
            Some(Some(token)) => token,
            _ => return ready(Err(ApiError::MissingToken)),
        };
        match decode_token(TokenKind::Access, token) {
            Ok(claims) => ready(Ok(Auth(claims))),
            Err(_) => ready(Err(ApiError::InvalidToken)),
        }
    }
}
