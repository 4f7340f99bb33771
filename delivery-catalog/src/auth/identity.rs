//! Bearer token → identity headers
//!
//! Tokens are issued elsewhere; this filter only verifies them (HS256) and
//! forwards the claims downstream as `X-User-Id`, `X-User-Email` and
//! `X-User-Role`. An absent or invalid token never rejects the request.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::extractor::{CurrentUser, Role};
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Claims carried by catalog bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// User email
    pub sub: String,
    /// Numeric id, either a JSON number or a numeric string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

impl IdentityClaims {
    pub fn user_id(&self) -> Option<i64> {
        match self.user_id.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<IdentityClaims> for CurrentUser {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.user_id(),
            role: claims.role.as_deref().map(Role::parse),
            email: Some(claims.sub),
        }
    }
}

/// Create a signed token (HS256)
pub fn create_token(
    user_id: i64,
    email: &str,
    role: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = IdentityClaims {
        sub: email.to_string(),
        user_id: Some(user_id.into()),
        role: Some(role.to_string()),
        exp: (now + ttl).timestamp().max(0) as usize,
        iat: Some(now.timestamp().max(0) as usize),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return its claims
pub fn verify_token(token: &str, secret: &str) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// `Bearer <token>` from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Diagnostic view of a token, decoded without trusting it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub algorithm: String,
    pub claims: serde_json::Value,
    pub signature_valid: bool,
    pub expired: bool,
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn inspect_token(token: &str, secret: &str) -> Result<TokenReport, jsonwebtoken::errors::Error> {
    let header = jsonwebtoken::decode_header(token)?;

    let mut insecure = Validation::new(header.alg);
    insecure.insecure_disable_signature_validation();
    insecure.validate_exp = false;
    insecure.required_spec_claims.clear();
    let claims = jsonwebtoken::decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &insecure,
    )?
    .claims;

    let expires_at = claims.get("exp").and_then(|v| v.as_i64());
    let expired = expires_at.is_some_and(|exp| exp < chrono::Utc::now().timestamp());

    let (signature_valid, error) = match verify_token(token, secret) {
        Ok(_) => (true, None),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => (true, Some(e.to_string())),
            _ => (false, Some(e.to_string())),
        },
    };

    Ok(TokenReport {
        algorithm: format!("{:?}", header.alg),
        claims,
        signature_valid,
        expired,
        expires_at,
        error,
    })
}

/// Applied to `/api/*`: replaces `X-User-*` headers with verified token claims
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.trust_identity_headers {
        let headers = request.headers_mut();
        for name in [USER_ID_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER] {
            headers.remove(name);
        }
    }

    let claims = bearer_token(request.headers()).and_then(|token| {
        verify_token(token, &state.config.jwt_secret)
            .map_err(|e| tracing::debug!(uri = %request.uri(), "JWT validation failed: {e}"))
            .ok()
    });

    if let Some(claims) = claims {
        let user = CurrentUser::from(claims);
        inject_headers(request.headers_mut(), &user);
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

fn inject_headers(headers: &mut HeaderMap, user: &CurrentUser) {
    let mut set = |name: &'static str, value: Option<String>| {
        if let Some(value) = value
            && let Ok(value) = HeaderValue::from_str(&value)
        {
            headers.insert(name, value);
        }
    };
    set(USER_ID_HEADER, user.user_id.map(|id| id.to_string()));
    set(USER_EMAIL_HEADER, user.email.clone());
    set(USER_ROLE_HEADER, user.role.as_ref().map(|r| r.as_str().to_string()));
}
