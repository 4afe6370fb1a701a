//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hrm_shared::types::{EmployeeId, OrganizationId, UserId};
use hrm_shared::{AppError, Claims, JwtError};
use serde_json::json;

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "MISSING_TOKEN",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (error, message) = match e {
                JwtError::Expired => ("TOKEN_EXPIRED", "Token has expired"),
                _ => ("INVALID_TOKEN", "Invalid or malformed token"),
            };
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response()
        }
    }
}

/// Extractor for authenticated user claims.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let org = auth.organization_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.user_id())
    }

    /// Returns the organization ID from the claims.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        OrganizationId::from_uuid(self.0.organization_id())
    }

    /// Returns the employee record linked to the caller, if any.
    #[must_use]
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.0.employee_id().map(EmployeeId::from_uuid)
    }

    /// Returns the user's role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Whether the caller may review leave in its organization.
    #[must_use]
    pub fn is_reviewer(&self) -> bool {
        self.0.can_review_leave()
    }

    /// Fails unless the caller holds a reviewer role.
    pub fn require_reviewer(&self) -> Result<(), ApiError> {
        if self.is_reviewer() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' cannot review leave requests",
                self.role()
            ))
            .into())
        }
    }

    /// The caller's own employee record, required for self-service routes.
    pub fn require_employee(&self) -> Result<EmployeeId, ApiError> {
        self.employee_id().ok_or_else(|| {
            AppError::Forbidden("no employee record is linked to this user".into()).into()
        })
    }

    /// Reviewers may act on any employee; others only on themselves.
    pub fn require_self_or_reviewer(&self, employee_id: EmployeeId) -> Result<(), ApiError> {
        if self.is_reviewer() || self.employee_id() == Some(employee_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("cannot access another employee's leave".into()).into())
        }
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "UNAUTHORIZED",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn auth(role: &str, employee: Option<Uuid>) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            employee,
            role,
            Utc::now() + Duration::minutes(5),
        ))
    }

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("Basic abc", None)]
    #[case("", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_bearer_token(header), expected);
    }

    #[test]
    fn test_self_or_reviewer() {
        let own = Uuid::new_v4();
        let employee = auth("employee", Some(own));
        assert!(employee.require_self_or_reviewer(EmployeeId::from_uuid(own)).is_ok());
        assert!(employee.require_self_or_reviewer(EmployeeId::new()).is_err());
        assert!(employee.require_reviewer().is_err());

        let hr = auth("hr", None);
        assert!(hr.require_self_or_reviewer(EmployeeId::new()).is_ok());
        assert!(hr.require_employee().is_err());
    }
}
