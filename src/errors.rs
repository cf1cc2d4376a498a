//! Error values returned by the generated routes and by the router builder.
//!
//! Every handler fails with an [`ApiError`], rendered as
//!
//! ```json
//! {"error": "item with ID '7' not found"}
//! ```
//!
//! Parameter failures add a `details` list. Server-side faults are logged
//! through `tracing` when the response is rendered; the client only sees a
//! generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::{error::Error, fmt};

const DATABASE_FAILURE: &str = "A database error occurred";

#[derive(Debug)]
pub enum ApiError {
    /// No row matches `id`. Resolvers reuse it for unknown tenants.
    NotFound {
        resource: String,
        id: Option<String>,
    },
    /// Unknown `sortby` column, or a request a resolver refuses.
    BadRequest(String),
    /// A route guard rejected the request.
    Unauthorized(String),
    /// `item_id`, `skip` or `limit` could not be accepted.
    InvalidParameters(Vec<String>),
    /// Query failure. The driver error is logged, never returned.
    Database(DbErr),
    /// Server fault outside the database, such as a resolver handing back a
    /// dead connection.
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 422 carrying one message per rejected parameter.
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::InvalidParameters(errors)
    }

    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database(err)
    }

    /// `message` goes to the client, `detail` only to the log.
    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidParameters(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` field of the response body.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    fn trace(&self) {
        match self {
            Self::Database(err) => tracing::error!(error = %err, "query failed"),
            Self::Internal { detail, .. } => tracing::error!(detail = %detail, "internal error"),
            rejected => tracing::debug!(
                status = rejected.status_code().as_u16(),
                error = %rejected,
                "request rejected"
            ),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource, id: Some(id) } => {
                write!(f, "{resource} with ID '{id}' not found")
            }
            Self::NotFound { resource, id: None } => write!(f, "{resource} not found"),
            Self::BadRequest(message) | Self::Unauthorized(message) => f.write_str(message),
            Self::InvalidParameters(errors) => match errors.as_slice() {
                [single] => f.write_str(single),
                many => write!(f, "invalid parameters: {}", many.join("; ")),
            },
            Self::Database(_) => f.write_str(DATABASE_FAILURE),
            Self::Internal { message, .. } => f.write_str(message),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [String]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.trace();
        let details = match &self {
            Self::InvalidParameters(errors) => Some(errors.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Every `DbErr` reaching a route unhandled is a server fault. Missing rows
/// are mapped to [`ApiError::NotFound`] by the item routes themselves.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

/// Reasons [`CrudRouter::build`](crate::CrudRouter::build) refuses a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The static database handle has no driver behind it.
    DatabaseUnavailable { resource: &'static str },
    /// `paginate` must be greater than zero.
    InvalidPagination { max_limit: u64 },
    /// The route prefix contains a path capture, which would collide with `{item_id}`.
    InvalidPrefix { prefix: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseUnavailable { resource } => write!(
                f,
                "no database driver is connected for '{resource}'; \
                 connect a sqlite, postgresql or mysql backend before building the router"
            ),
            Self::InvalidPagination { max_limit } => {
                write!(f, "paginate must be greater than zero (got {max_limit})")
            }
            Self::InvalidPrefix { prefix } => {
                write!(f, "route prefix '{prefix}' must not contain path captures")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_item_names_resource_and_id() {
        let (status, body) = render(ApiError::not_found("item", Some("7".to_string()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "item with ID '7' not found"}));
    }

    #[tokio::test]
    async fn test_rejected_pagination_lists_every_parameter() {
        let err = ApiError::validation_failed(vec![
            "skip query parameter must be greater or equal to zero".to_string(),
            "limit query parameter must be greater then zero".to_string(),
        ]);
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
        assert!(body["error"].as_str().unwrap().starts_with("invalid parameters: skip"));
    }

    #[tokio::test]
    async fn test_bad_item_id_is_the_whole_message() {
        let err = ApiError::validation_failed(vec!["item_id must be an integer, got 'x'".into()]);
        let (_, body) = render(err).await;
        assert_eq!(body["error"], "item_id must be an integer, got 'x'");
        assert_eq!(body["details"], json!(["item_id must be an integer, got 'x'"]));
    }

    #[tokio::test]
    async fn test_constraint_violation_does_not_leak() {
        let err: ApiError = DbErr::Custom("UNIQUE constraint failed: items.name".into()).into();
        assert!(err.source().is_some());
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": DATABASE_FAILURE}));
    }

    #[test]
    fn test_record_not_found_from_a_query_is_a_server_fault() {
        // Only the item routes translate a missing row into 404.
        let err: ApiError = DbErr::RecordNotFound("items".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_dead_resolver_handle_hides_detail() {
        let err = ApiError::internal("Database unavailable", "tenant acme: pool closed");
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Database unavailable"}));
    }

    #[tokio::test]
    async fn test_guard_rejection_is_401() {
        let err = ApiError::unauthorized("missing or invalid x-api-key header");
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing or invalid x-api-key header");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidPagination { max_limit: 0 };
        assert_eq!(err.to_string(), "paginate must be greater than zero (got 0)");

        let err = ConfigError::DatabaseUnavailable { resource: "items" };
        assert!(err.to_string().contains("'items'"));
    }
}
