//! Per-request database selection.
//!
//! A router is built over a [`UsingDb`]: either one fixed connection, or a
//! [`DatabaseResolver`] that picks a connection from the request's path
//! parameters. Resolution happens once per request and every query of that
//! request runs against the returned handle, which pins an operation to one
//! tenant database or shard.
//!
//! ```rust,ignore
//! let tenants: HashMap<String, DatabaseConnection> = connect_tenants().await?;
//! let using_db = UsingDb::from_fn(move |params: &PathParams| {
//!     let tenant = params.get("tenant").unwrap_or_default();
//!     tenants
//!         .get(tenant)
//!         .cloned()
//!         .ok_or_else(|| ApiError::not_found("tenant", Some(tenant.to_string())))
//! });
//!
//! let items = CrudRouter::<Item>::new(using_db).build()?;
//! let app = Router::new().nest("/tenants/{tenant}", items);
//! ```

use crate::errors::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, rejection::PathRejection},
    http::request::Parts,
};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, fmt, future::Future, sync::Arc};

/// Path parameters captured by the matched route, including captures of
/// enclosing `Router::nest` prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for PathParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PathParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Path(params)) => Ok(Self(params)),
            Err(PathRejection::MissingPathParams(_)) => Ok(Self::default()),
            Err(rejection) => Err(ApiError::validation_failed(vec![rejection.body_text()])),
        }
    }
}

/// Strategy that maps a request's path parameters to a connection handle.
#[async_trait]
pub trait DatabaseResolver: Send + Sync {
    /// # Errors
    ///
    /// Whatever the resolver reports, typically `ApiError::NotFound` for an
    /// unknown tenant. It is returned to the client as is.
    async fn resolve(&self, params: &PathParams) -> Result<DatabaseConnection, ApiError>;
}

/// Adapts a synchronous closure into a [`DatabaseResolver`].
pub struct SyncResolver<F>(F);

#[async_trait]
impl<F> DatabaseResolver for SyncResolver<F>
where
    F: Fn(&PathParams) -> Result<DatabaseConnection, ApiError> + Send + Sync,
{
    async fn resolve(&self, params: &PathParams) -> Result<DatabaseConnection, ApiError> {
        (self.0)(params)
    }
}

/// Adapts a closure returning a future into a [`DatabaseResolver`].
pub struct AsyncResolver<F>(F);

#[async_trait]
impl<F, Fut> DatabaseResolver for AsyncResolver<F>
where
    F: Fn(PathParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<DatabaseConnection, ApiError>> + Send,
{
    async fn resolve(&self, params: &PathParams) -> Result<DatabaseConnection, ApiError> {
        (self.0)(params.clone()).await
    }
}

/// Database selector of a router.
#[derive(Clone)]
pub enum UsingDb {
    /// The same connection for every request.
    Static(DatabaseConnection),
    /// A connection chosen per request.
    Resolver(Arc<dyn DatabaseResolver>),
}

impl UsingDb {
    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&PathParams) -> Result<DatabaseConnection, ApiError> + Send + Sync + 'static,
    {
        Self::Resolver(Arc::new(SyncResolver(resolver)))
    }

    pub fn from_async_fn<F, Fut>(resolver: F) -> Self
    where
        F: Fn(PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<DatabaseConnection, ApiError>> + Send + 'static,
    {
        Self::Resolver(Arc::new(AsyncResolver(resolver)))
    }

    pub fn from_resolver(resolver: impl DatabaseResolver + 'static) -> Self {
        Self::Resolver(Arc::new(resolver))
    }

    /// Resolve the handle for one request.
    ///
    /// # Errors
    ///
    /// Resolver errors are passed through. A resolver that hands back a
    /// disconnected handle yields `ApiError::Internal`.
    pub async fn resolve(&self, params: &PathParams) -> Result<DatabaseConnection, ApiError> {
        let db = match self {
            Self::Static(db) => return Ok(db.clone()),
            Self::Resolver(resolver) => resolver.resolve(params).await?,
        };
        if matches!(db, DatabaseConnection::Disconnected) {
            return Err(ApiError::internal(
                "Database unavailable",
                format!("resolver returned a disconnected handle for {params:?}"),
            ));
        }
        Ok(db)
    }
}

impl From<DatabaseConnection> for UsingDb {
    fn from(db: DatabaseConnection) -> Self {
        Self::Static(db)
    }
}

impl fmt::Debug for UsingDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("UsingDb::Static"),
            Self::Resolver(_) => f.write_str("UsingDb::Resolver"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_static_handle_ignores_params() {
        let using_db = UsingDb::from(DatabaseConnection::Disconnected);
        let db = using_db.resolve(&PathParams::from([("tenant", "a")])).await;
        assert!(matches!(db, Ok(DatabaseConnection::Disconnected)));
    }

    #[tokio::test]
    async fn test_sync_resolver_error_passes_through() {
        let using_db = UsingDb::from_fn(|params: &PathParams| {
            Err(ApiError::not_found(
                "tenant",
                params.get("tenant").map(str::to_string),
            ))
        });
        let err = using_db
            .resolve(&PathParams::from([("tenant", "ghost")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "tenant with ID 'ghost' not found");
    }

    #[tokio::test]
    async fn test_async_resolver_is_awaited() {
        let using_db = UsingDb::from_async_fn(|params: PathParams| async move {
            tokio::task::yield_now().await;
            match params.get("shard") {
                Some("0") => Ok(DatabaseConnection::Disconnected),
                _ => Err(ApiError::bad_request("unknown shard")),
            }
        });

        let err = using_db
            .resolve(&PathParams::from([("shard", "1")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        // A disconnected handle from a resolver is a server-side fault.
        let err = using_db
            .resolve(&PathParams::from([("shard", "0")]))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
