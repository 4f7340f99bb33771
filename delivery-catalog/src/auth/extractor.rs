//! Current user extractor
//!
//! Handlers receive whatever identity the filter established. The extractor
//! never rejects; handlers decide with `require_*` what they need.

use std::convert::Infallible;
use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use super::identity::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Business,
    Other(String),
}

impl Role {
    /// Accepts `ROLE_ADMIN` as well as `admin` style names
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let bare = trimmed
            .strip_prefix("ROLE_")
            .unwrap_or(trimmed)
            .to_ascii_uppercase();
        match bare.as_str() {
            "ADMIN" => Role::Admin,
            "BUSINESS" => Role::Business,
            _ => Role::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Business => "ROLE_BUSINESS",
            Role::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the caller, possibly anonymous
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentUser {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl CurrentUser {
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        Self {
            user_id: get(USER_ID_HEADER).and_then(|v| v.parse().ok()),
            email: get(USER_EMAIL_HEADER).map(String::from),
            role: get(USER_ROLE_HEADER).map(Role::parse),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.role.is_none()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref() == Some(role)
    }

    /// 401 without a user id
    pub fn require_user_id(&self) -> Result<i64, AppError> {
        self.user_id.ok_or_else(AppError::not_authenticated)
    }

    /// 401 for anonymous callers, 403 for any other role
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.has_role(&role) {
            return Ok(());
        }
        if self.is_anonymous() {
            return Err(AppError::not_authenticated());
        }
        let code = match role {
            Role::Admin => ErrorCode::AdminRequired,
            _ => ErrorCode::PermissionDenied,
        };
        Err(AppError::with_message(code, format!("Access denied: {role} role required"))
            .with_detail("requiredRole", role.as_str()))
    }

    /// Role check followed by the user id the write is attributed to
    pub fn require_role_user(&self, role: Role) -> Result<i64, AppError> {
        self.require_role(role)?;
        self.require_user_id()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the identity middleware
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn user(id: Option<i64>, role: Option<Role>) -> CurrentUser {
        CurrentUser {
            user_id: id,
            email: None,
            role,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("ROLE_ADMIN"), Role::Admin);
        assert_eq!(Role::parse("business"), Role::Business);
        assert_eq!(Role::parse("ROLE_USER"), Role::Other("ROLE_USER".into()));
        assert_eq!(Role::Business.to_string(), "ROLE_BUSINESS");
    }

    #[test]
    fn test_from_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("12"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("a@b.co"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("ROLE_BUSINESS"));
        let u = CurrentUser::from_headers(&headers);
        assert_eq!(u.user_id, Some(12));
        assert_eq!(u.email.as_deref(), Some("a@b.co"));
        assert_eq!(u.role, Some(Role::Business));
    }

    #[test]
    fn test_non_numeric_user_id_is_none() {
        let mut headers = http::HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(CurrentUser::from_headers(&headers).user_id, None);
    }

    #[test]
    fn test_require_role_statuses() {
        let anon = CurrentUser::default();
        assert_eq!(
            anon.require_role(Role::Business).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );

        let customer = user(Some(3), Some(Role::Other("ROLE_USER".into())));
        let err = customer.require_role(Role::Business).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);

        let err = customer.require_role(Role::Admin).unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);

        let owner = user(Some(3), Some(Role::Business));
        assert_eq!(owner.require_role_user(Role::Business).unwrap(), 3);
    }

    #[test]
    fn test_role_without_user_id() {
        let u = user(None, Some(Role::Business));
        assert!(u.require_role(Role::Business).is_ok());
        assert_eq!(
            u.require_role_user(Role::Business).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }
}
