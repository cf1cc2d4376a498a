//! Route dependencies.
//!
//! A [`RouteGuard`] runs before a generated handler and can reject the
//! request, which is how authentication or rate checks are attached to the
//! CRUD routes. Guards are configured router-wide and per route through
//! [`RouteOption`].

use crate::errors::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// A check evaluated against the request head before the handler runs.
#[async_trait]
pub trait RouteGuard: Send + Sync {
    /// # Errors
    ///
    /// The returned error becomes the response and the handler is skipped.
    async fn check(&self, parts: &Parts) -> Result<(), ApiError>;
}

/// Ordered guards of one route.
pub type Dependencies = Vec<Arc<dyn RouteGuard>>;

/// Whether a generated route is registered, and with which guards.
#[derive(Clone)]
pub enum RouteOption {
    Enabled(Dependencies),
    Disabled,
}

impl RouteOption {
    #[must_use]
    pub fn enabled() -> Self {
        Self::Enabled(Vec::new())
    }

    #[must_use]
    pub fn with_guard(guard: impl RouteGuard + 'static) -> Self {
        Self::Enabled(vec![Arc::new(guard)])
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub(crate) fn dependencies(&self) -> Option<&Dependencies> {
        match self {
            Self::Enabled(dependencies) => Some(dependencies),
            Self::Disabled => None,
        }
    }
}

impl Default for RouteOption {
    fn default() -> Self {
        Self::enabled()
    }
}

impl From<bool> for RouteOption {
    fn from(enabled: bool) -> Self {
        if enabled { Self::enabled() } else { Self::Disabled }
    }
}

impl From<Dependencies> for RouteOption {
    fn from(dependencies: Dependencies) -> Self {
        Self::Enabled(dependencies)
    }
}

/// Middleware body: run each guard in order, stop at the first rejection.
pub(crate) async fn run_guards(
    State(guards): State<Arc<Dependencies>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    for guard in guards.iter() {
        if let Err(err) = guard.check(&parts).await {
            return err.into_response();
        }
    }
    next.run(Request::from_parts(parts, body)).await
}

/// Rejects requests that lack a header with the expected value.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    name: &'static str,
    value: String,
}

impl RequireHeader {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[async_trait]
impl RouteGuard for RequireHeader {
    async fn check(&self, parts: &Parts) -> Result<(), ApiError> {
        let presented = parts
            .headers
            .get(self.name)
            .and_then(|value| value.to_str().ok());
        if presented == Some(self.value.as_str()) {
            Ok(())
        } else {
            tracing::debug!(header = self.name, "route guard rejected request");
            Err(ApiError::unauthorized(format!(
                "missing or invalid {} header",
                self.name
            )))
        }
    }
}
