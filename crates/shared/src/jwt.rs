//! Access token verification.
//!
//! Tokens are minted by the identity service with a shared HS256 secret.
//! This service never issues them; [`JwtService`] only checks the signature,
//! expiry and (optionally) issuer, then hands back the [`Claims`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtSettings;

/// Verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret shared with the identity service.
    pub secret: String,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
    /// Required `iss` claim, if any.
    pub issuer: Option<String>,
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            leeway_secs: settings.leeway_secs,
            issuer: settings.issuer.clone(),
        }
    }
}

/// Why a bearer token was refused.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token was issued by someone else.
    #[error("token issuer is not accepted")]
    WrongIssuer,

    /// Bad signature, malformed payload or missing claims.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Verifies access tokens against the shared secret.
#[derive(Clone)]
pub struct JwtService {
    key: DecodingKey,
    rules: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("leeway", &self.rules.leeway)
            .field("issuer", &self.rules.iss)
            .field("key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Builds a verifier for HS256 tokens.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let mut rules = Validation::new(Algorithm::HS256);
        rules.leeway = config.leeway_secs;
        rules.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            rules.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            rules,
        }
    }

    /// Checks a bearer token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` past `exp` plus leeway,
    /// `JwtError::WrongIssuer` when an issuer is configured and does not match,
    /// and `JwtError::Invalid` for anything else.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.key, &self.rules)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidIssuer => JwtError::WrongIssuer,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

/// Token minting for tests and local tooling.
///
/// Only compiled with the `test-util` feature; production tokens come from
/// the identity service.
#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    use super::JwtConfig;
    use crate::auth::Claims;

    /// Signs claims the way the identity service does.
    pub struct TokenSigner {
        key: EncodingKey,
        issuer: Option<String>,
    }

    impl TokenSigner {
        /// Signer sharing the verifier's secret and issuer.
        #[must_use]
        pub fn new(config: &JwtConfig) -> Self {
            Self {
                key: EncodingKey::from_secret(config.secret.as_bytes()),
                issuer: config.issuer.clone(),
            }
        }

        /// Token valid for `ttl` from now. A negative `ttl` yields an expired token.
        ///
        /// # Errors
        ///
        /// Returns the encoder error if signing fails.
        pub fn token(
            &self,
            user_id: Uuid,
            org_id: Uuid,
            employee_id: Option<Uuid>,
            role: &str,
            ttl: Duration,
        ) -> Result<String, jsonwebtoken::errors::Error> {
            let mut claims = Claims::new(user_id, org_id, employee_id, role, Utc::now() + ttl);
            claims.iss.clone_from(&self.issuer);
            self.sign(&claims)
        }

        /// Signs arbitrary claims.
        ///
        /// # Errors
        ///
        /// Returns the encoder error if signing fails.
        pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
            encode(&Header::default(), claims, &self.key)
        }
    }
}
