//! Identity context carried by access tokens.
//!
//! Tokens are issued by the surrounding identity service; this service only
//! verifies them and reads the claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles allowed to change the status of leave requests.
pub const REVIEWER_ROLES: [&str; 3] = ["owner", "admin", "hr"];

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Organization ID (current context).
    pub org: Uuid,
    /// Employee record linked to the user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emp: Option<Uuid>,
    /// User's role in the organization.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer, checked only when the verifier is configured with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        org_id: Uuid,
        employee_id: Option<Uuid>,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            org: org_id,
            emp: employee_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: None,
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the organization ID from claims.
    #[must_use]
    pub const fn organization_id(&self) -> Uuid {
        self.org
    }

    /// Returns the employee ID linked to this user.
    #[must_use]
    pub const fn employee_id(&self) -> Option<Uuid> {
        self.emp
    }

    /// Whether this identity may review leave requests in its organization.
    #[must_use]
    pub fn can_review_leave(&self) -> bool {
        REVIEWER_ROLES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&self.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_with_role(role: &str) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            role,
            Utc::now() + Duration::minutes(5),
        )
    }

    #[test]
    fn test_reviewer_roles() {
        assert!(claims_with_role("hr").can_review_leave());
        assert!(claims_with_role("Admin").can_review_leave());
        assert!(claims_with_role("owner").can_review_leave());
        assert!(!claims_with_role("employee").can_review_leave());
        assert!(!claims_with_role("").can_review_leave());
    }

    #[test]
    fn test_employee_claim_is_optional_on_the_wire() {
        let json = r#"{"sub":"00000000-0000-0000-0000-000000000001","org":"00000000-0000-0000-0000-000000000002","role":"hr","iat":0,"exp":1}"#;
        let claims: Claims = serde_json::from_str(json).expect("claims should parse");
        assert_eq!(claims.employee_id(), None);
        assert!(!serde_json::to_string(&claims).unwrap().contains("emp"));
    }
}
