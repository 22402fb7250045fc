//! Tenant extraction.
//!
//! Authentication happens upstream; by the time a request reaches this server
//! the caller's organization is carried in the `X-Tenant-Id` header.

use super::error::{api_error, ApiError};
use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use shared::models::TenantId;

/// Header carrying the caller's organization.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The tenant every log operation of a request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub TenantId);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match tenant {
            Some(id) => Ok(Self(TenantId::new(id))),
            None => {
                tracing::debug!(uri = %parts.uri, "Rejected request without tenant");
                Err(api_error(
                    StatusCode::UNAUTHORIZED,
                    "missing_tenant",
                    "The X-Tenant-Id header is required",
                ))
            }
        }
    }
}
