//! API route definitions.
//!
//! This module organizes all HTTP routes for the LogLens API server.

mod error;
mod health;
mod logs;
mod tenant;
mod upload;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use health::health_routes;
pub use logs::{logs_routes, CreateLogRequest, DeleteLogResponse, UpdateLogRequest};
pub use tenant::{Tenant, TENANT_HEADER};
pub use upload::{upload_routes, UploadResponse, UploadStats, ALLOWED_EXTENSIONS};
