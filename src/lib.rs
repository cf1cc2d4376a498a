//! Generated REST CRUD routes for Axum over Sea-ORM entities.
//!
//! Implement [`CRUDResource`] for the output schema of an entity, then build
//! its routes with [`CrudRouter`]:
//!
//! ```rust,ignore
//! let app = Router::new().merge(CrudRouter::<Item>::new(db).paginate(100).build()?);
//! ```

pub mod database;
pub mod errors;
pub mod guards;
pub mod models;
pub mod pagination;
pub mod router;
pub mod routes;
pub mod sort;
pub mod traits;

pub use database::{DatabaseResolver, PathParams, UsingDb};
pub use errors::{ApiError, ConfigError};
pub use guards::{Dependencies, RequireHeader, RouteGuard, RouteOption};
pub use models::{ListResponse, PaginatedResults, Pagination, PaginationParams};
pub use router::CrudRouter;
pub use serde_with;
pub use traits::{CRUDResource, ItemId, MergeIntoActiveModel};
