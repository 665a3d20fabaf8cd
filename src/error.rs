// Error model for the auth/RBAC core.
//
// Every failure that crosses a component boundary is an `AuthError`, never a
// bare `String` — mirrors the teacher's `ApiError` (status_code / error_code /
// to_json / IntoResponse) but organized as the five categories the
// specification names instead of raw HTTP status buckets.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum ValidationCode {
    RequiredFields(Vec<String>),
    InvalidFormat(String),
    InvalidValue(String),
    TryToChangeRestrictedFields(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum AuthCode {
    InvalidCredentials,
    TokenInvalid,
    TokenExpired,
    TokenRevoked,
    RefreshTokenExpired,
    PermissionDenied,
}

#[derive(Debug, Clone)]
pub enum ConflictCode {
    DuplicateResource(String),
    DuplicateEmail,
    DuplicateUsername,
}

#[derive(Debug, Clone)]
pub enum InternalCode {
    DatabaseError,
    ServiceUnavailable,
    UnexpectedError,
}

/// The sole error vocabulary crossing component boundaries (spec §4.1).
#[derive(Debug, Clone)]
pub enum AuthError {
    Validation {
        code: ValidationCode,
        message: String,
        details: HashMap<String, String>,
    },
    Auth {
        code: AuthCode,
        message: String,
    },
    Conflict {
        code: ConflictCode,
        message: String,
    },
    NotFound {
        resource_type: String,
        key: String,
    },
    Internal {
        code: InternalCode,
        message: String,
    },
}

impl AuthError {
    pub fn required_fields(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        AuthError::Validation {
            message: format!("missing required fields: {}", fields.join(", ")),
            code: ValidationCode::RequiredFields(fields),
            details: HashMap::new(),
        }
    }

    pub fn invalid_format(field: impl Into<String>) -> Self {
        let field = field.into();
        AuthError::Validation {
            message: format!("invalid format for field '{field}'"),
            code: ValidationCode::InvalidFormat(field),
            details: HashMap::new(),
        }
    }

    pub fn invalid_value(field: impl Into<String>) -> Self {
        let field = field.into();
        AuthError::Validation {
            message: format!("invalid value for field '{field}'"),
            code: ValidationCode::InvalidValue(field),
            details: HashMap::new(),
        }
    }

    pub fn restricted_fields(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        AuthError::Validation {
            message: format!("cannot change restricted fields: {}", fields.join(", ")),
            code: ValidationCode::TryToChangeRestrictedFields(fields),
            details: HashMap::new(),
        }
    }

    pub fn invalid_credentials() -> Self {
        AuthError::Auth {
            code: AuthCode::InvalidCredentials,
            message: "invalid credentials".to_string(),
        }
    }

    pub fn token_invalid() -> Self {
        AuthError::Auth {
            code: AuthCode::TokenInvalid,
            message: "token is invalid".to_string(),
        }
    }

    pub fn token_expired() -> Self {
        AuthError::Auth {
            code: AuthCode::TokenExpired,
            message: "token has expired".to_string(),
        }
    }

    pub fn token_revoked() -> Self {
        AuthError::Auth {
            code: AuthCode::TokenRevoked,
            message: "token has been revoked".to_string(),
        }
    }

    pub fn refresh_token_expired() -> Self {
        AuthError::Auth {
            code: AuthCode::RefreshTokenExpired,
            message: "refresh token has expired".to_string(),
        }
    }

    pub fn permission_denied() -> Self {
        AuthError::Auth {
            code: AuthCode::PermissionDenied,
            message: "permission denied".to_string(),
        }
    }

    pub fn duplicate_resource(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        AuthError::Conflict {
            message: format!("{resource} already exists"),
            code: ConflictCode::DuplicateResource(resource),
        }
    }

    pub fn duplicate_email() -> Self {
        AuthError::Conflict {
            code: ConflictCode::DuplicateEmail,
            message: "email already in use within this tenant".to_string(),
        }
    }

    pub fn duplicate_username() -> Self {
        AuthError::Conflict {
            code: ConflictCode::DuplicateUsername,
            message: "username already in use within this tenant".to_string(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, key: impl Into<String>) -> Self {
        AuthError::NotFound {
            resource_type: resource_type.into(),
            key: key.into(),
        }
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        AuthError::Internal {
            code: InternalCode::DatabaseError,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        AuthError::Internal {
            code: InternalCode::ServiceUnavailable,
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        AuthError::Internal {
            code: InternalCode::UnexpectedError,
            message: message.into(),
        }
    }

    pub fn with_details(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let AuthError::Validation { details, .. } = &mut self {
            details.insert(key.into(), value.into());
        }
        self
    }

    /// Transport-level status mapping (spec §4.1): Validation→InvalidArgument,
    /// Auth→Unauthenticated/PermissionDenied, NotFound→NotFound,
    /// Conflict→AlreadyExists, Internal→Internal.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation { .. } => StatusCode::BAD_REQUEST,
            AuthError::Auth { code: AuthCode::PermissionDenied, .. } => StatusCode::FORBIDDEN,
            AuthError::Auth { .. } => StatusCode::UNAUTHORIZED,
            AuthError::Conflict { .. } => StatusCode::CONFLICT,
            AuthError::NotFound { .. } => StatusCode::NOT_FOUND,
            AuthError::Internal { code: InternalCode::ServiceUnavailable, .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Validation { code, .. } => match code {
                ValidationCode::RequiredFields(_) => "REQUIRED_FIELDS",
                ValidationCode::InvalidFormat(_) => "INVALID_FORMAT",
                ValidationCode::InvalidValue(_) => "INVALID_VALUE",
                ValidationCode::TryToChangeRestrictedFields(_) => "RESTRICTED_FIELDS",
            },
            AuthError::Auth { code, .. } => match code {
                AuthCode::InvalidCredentials => "INVALID_CREDENTIALS",
                AuthCode::TokenInvalid => "TOKEN_INVALID",
                AuthCode::TokenExpired => "TOKEN_EXPIRED",
                AuthCode::TokenRevoked => "TOKEN_REVOKED",
                AuthCode::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
                AuthCode::PermissionDenied => "PERMISSION_DENIED",
            },
            AuthError::Conflict { code, .. } => match code {
                ConflictCode::DuplicateResource(_) => "DUPLICATE_RESOURCE",
                ConflictCode::DuplicateEmail => "DUPLICATE_EMAIL",
                ConflictCode::DuplicateUsername => "DUPLICATE_USERNAME",
            },
            AuthError::NotFound { .. } => "NOT_FOUND",
            AuthError::Internal { code, .. } => match code {
                InternalCode::DatabaseError => "DATABASE_ERROR",
                InternalCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
                InternalCode::UnexpectedError => "UNEXPECTED_ERROR",
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            AuthError::Validation { message, .. }
            | AuthError::Auth { message, .. }
            | AuthError::Conflict { message, .. }
            | AuthError::Internal { message, .. } => message.clone(),
            AuthError::NotFound { resource_type, key } => {
                format!("{resource_type} '{key}' not found")
            }
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "code": self.error_code(),
            "message": self.message(),
        });
        if let AuthError::Validation { details, .. } = self {
            if !details.is_empty() {
                body["details"] = json!(details);
            }
        }
        body
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, Json(self.to_json())).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AuthError::not_found("resource", "unknown"),
            other => {
                tracing::error!("database error: {other}");
                AuthError::database_error("a database error occurred")
            }
        }
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("token cache error: {err}");
        AuthError::service_unavailable("token cache temporarily unavailable")
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("serialization error: {err}");
        AuthError::unexpected("failed to (de)serialize internal state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            AuthError::required_fields(["tenant_id"]).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn permission_denied_maps_to_403_not_401() {
        assert_eq!(AuthError::permission_denied().status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn token_invalid_maps_to_401() {
        assert_eq!(AuthError::token_invalid().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_message_includes_resource_and_key() {
        let err = AuthError::not_found("user", "u1");
        assert_eq!(err.message(), "user 'u1' not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
