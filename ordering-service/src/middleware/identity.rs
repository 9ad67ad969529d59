use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use service_core::error::AppError;
use thiserror::Error;

use crate::models::{IdentityContext, Role, UserId};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    #[error("Invalid subject id: {0}")]
    InvalidSubjectId(String),

    #[error("{0}")]
    InvalidRole(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::Unauthorized(anyhow::anyhow!(err))
    }
}

/// Source of the verified identity claims for the current request.
pub trait IdentityProvider {
    fn current_identity(&self) -> Result<IdentityContext, IdentityError>;
}

/// Identity claims forwarded by the trusted gateway.
///
/// Token verification happens upstream; the gateway strips any client-supplied
/// `x-user-*` headers and sets them from the verified claims. The role is
/// decided here, once, into the closed [`Role`] enum.
pub struct TrustedHeaders<'a> {
    headers: &'a HeaderMap,
}

impl<'a> TrustedHeaders<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }

    fn required(&self, name: &'static str) -> Result<&'a str, IdentityError> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(IdentityError::MissingHeader(name))
    }
}

impl IdentityProvider for TrustedHeaders<'_> {
    fn current_identity(&self) -> Result<IdentityContext, IdentityError> {
        let raw_id = self.required(USER_ID_HEADER)?;
        let subject_id: UserId = raw_id
            .parse()
            .ok()
            .filter(|id: &UserId| *id > 0)
            .ok_or_else(|| IdentityError::InvalidSubjectId(raw_id.to_string()))?;

        let email = self.required(USER_EMAIL_HEADER)?;
        let role: Role = self
            .required(USER_ROLE_HEADER)?
            .parse()
            .map_err(IdentityError::InvalidRole)?;

        Ok(IdentityContext::new(subject_id, email, role))
    }
}

/// Identity extractor for ordering-service handlers.
///
/// Rejects with 401 when the gateway headers are missing or malformed.
#[derive(Debug, Clone)]
pub struct Identity(pub IdentityContext);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = TrustedHeaders::new(&parts.headers)
            .current_identity()
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected request identity");
                AppError::from(e)
            })?;

        tracing::Span::current().record("user_id", identity.subject_id());

        Ok(Identity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: &str, email: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_str(email).unwrap());
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        headers
    }

    #[test]
    fn test_reads_claims_from_headers() {
        let headers = headers("5", "owner@example.com", "RESTAURANTE");
        let identity = TrustedHeaders::new(&headers).current_identity().unwrap();

        assert_eq!(identity.subject_id(), 5);
        assert_eq!(identity.email(), "owner@example.com");
        assert_eq!(identity.role(), Role::Restaurante);
    }

    #[test]
    fn test_legacy_role_prefix_is_accepted() {
        let headers = headers("1", "admin@example.com", "role_admin");
        let identity = TrustedHeaders::new(&headers).current_identity().unwrap();
        assert!(identity.is_admin());
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let mut headers = headers("10", "client@example.com", "CLIENTE");
        headers.remove(USER_ROLE_HEADER);
        assert_eq!(
            TrustedHeaders::new(&headers).current_identity(),
            Err(IdentityError::MissingHeader(USER_ROLE_HEADER))
        );
    }

    #[test]
    fn test_non_positive_or_garbage_subject_is_rejected() {
        for id in ["0", "-4", "abc"] {
            let headers = headers(id, "client@example.com", "CLIENTE");
            assert!(matches!(
                TrustedHeaders::new(&headers).current_identity(),
                Err(IdentityError::InvalidSubjectId(_))
            ));
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let headers = headers("10", "client@example.com", "SUPERUSER");
        assert!(matches!(
            TrustedHeaders::new(&headers).current_identity(),
            Err(IdentityError::InvalidRole(_))
        ));
    }
}
