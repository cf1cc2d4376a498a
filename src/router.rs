use crate::database::UsingDb;
use crate::errors::ConfigError;
use crate::guards::{Dependencies, RouteGuard, RouteOption, run_guards};
use crate::routes::{self, CrudState, ITEM_ID};
use crate::traits::CRUDResource;
use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::{marker::PhantomData, sync::Arc};

/// Builds the six CRUD routes of a resource.
///
/// ```rust,ignore
/// let app = CrudRouter::<Item>::new(db)
///     .paginate(50)
///     .pagination_extra_data(true)
///     .delete_all_route(false)
///     .build()?;
/// ```
///
/// | Route        | Method   | Path                   |
/// |--------------|----------|------------------------|
/// | get all      | `GET`    | `{prefix}`             |
/// | create       | `POST`   | `{prefix}`             |
/// | delete all   | `DELETE` | `{prefix}`             |
/// | get one      | `GET`    | `{prefix}/{item_id}`   |
/// | update       | `PUT`    | `{prefix}/{item_id}`   |
/// | delete one   | `DELETE` | `{prefix}/{item_id}`   |
pub struct CrudRouter<T> {
    using_db: UsingDb,
    prefix: Option<String>,
    paginate: Option<u64>,
    pagination_extra_data: bool,
    dependencies: Dependencies,
    get_all_route: RouteOption,
    get_one_route: RouteOption,
    create_route: RouteOption,
    update_route: RouteOption,
    delete_one_route: RouteOption,
    delete_all_route: RouteOption,
    _resource: PhantomData<fn() -> T>,
}

impl<T> CrudRouter<T>
where
    T: CRUDResource,
{
    pub fn new(using_db: impl Into<UsingDb>) -> Self {
        Self {
            using_db: using_db.into(),
            prefix: None,
            paginate: None,
            pagination_extra_data: false,
            dependencies: Vec::new(),
            get_all_route: RouteOption::default(),
            get_one_route: RouteOption::default(),
            create_route: RouteOption::default(),
            update_route: RouteOption::default(),
            delete_one_route: RouteOption::default(),
            delete_all_route: RouteOption::default(),
            _resource: PhantomData,
        }
    }

    /// Path the routes are mounted under. Defaults to `/{RESOURCE_NAME_PLURAL}`.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Maximum page size, also the default `limit` of the list route.
    #[must_use]
    pub fn paginate(mut self, max_limit: u64) -> Self {
        self.paginate = Some(max_limit);
        self
    }

    /// Return `{results, count}` from the list routes instead of a bare array.
    #[must_use]
    pub fn pagination_extra_data(mut self, enabled: bool) -> Self {
        self.pagination_extra_data = enabled;
        self
    }

    /// Guard applied to every generated route, ahead of per-route guards.
    #[must_use]
    pub fn dependency(mut self, guard: impl RouteGuard + 'static) -> Self {
        self.dependencies.push(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn get_all_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.get_all_route = option.into();
        self
    }

    #[must_use]
    pub fn get_one_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.get_one_route = option.into();
        self
    }

    #[must_use]
    pub fn create_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.create_route = option.into();
        self
    }

    #[must_use]
    pub fn update_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.update_route = option.into();
        self
    }

    #[must_use]
    pub fn delete_one_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.delete_one_route = option.into();
        self
    }

    #[must_use]
    pub fn delete_all_route(mut self, option: impl Into<RouteOption>) -> Self {
        self.delete_all_route = option.into();
        self
    }

    /// Normalized mount path: one leading `/`, no trailing `/`, empty for root.
    fn normalized_prefix(&self) -> String {
        let raw = self
            .prefix
            .clone()
            .unwrap_or_else(|| T::RESOURCE_NAME_PLURAL.to_string());
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }

    fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        if let UsingDb::Static(DatabaseConnection::Disconnected) = self.using_db {
            return Err(ConfigError::DatabaseUnavailable {
                resource: T::RESOURCE_NAME_PLURAL,
            });
        }
        if let Some(0) = self.paginate {
            return Err(ConfigError::InvalidPagination { max_limit: 0 });
        }
        if prefix.contains(['{', '}']) {
            return Err(ConfigError::InvalidPrefix {
                prefix: prefix.to_string(),
            });
        }
        Ok(())
    }

    fn attach(
        &self,
        slot: Option<MethodRouter<CrudState>>,
        route: MethodRouter<CrudState>,
        option: &RouteOption,
    ) -> Option<MethodRouter<CrudState>> {
        let Some(own) = option.dependencies() else {
            return slot;
        };
        let guards: Dependencies = self.dependencies.iter().chain(own).cloned().collect();
        let route = if guards.is_empty() {
            route
        } else {
            route.route_layer(middleware::from_fn_with_state(Arc::new(guards), run_guards))
        };
        Some(match slot {
            Some(existing) => existing.merge(route),
            None => route,
        })
    }

    /// Register the enabled routes on a new `axum::Router`.
    ///
    /// The returned router carries its own state and can be merged into or
    /// nested under an application router. When nested under a path with
    /// captures (for example `/tenants/{tenant}`), those captures reach the
    /// database resolver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the static database handle is disconnected,
    /// `paginate` is zero, or the prefix contains path captures.
    pub fn build(self) -> Result<Router, ConfigError> {
        let prefix = self.normalized_prefix();
        self.validate(&prefix)?;

        let mut collection = None;
        collection = self.attach(collection, get(routes::get_all::<T>), &self.get_all_route);
        collection = self.attach(collection, post(routes::create_one::<T>), &self.create_route);
        collection = self.attach(
            collection,
            delete(routes::delete_all::<T>),
            &self.delete_all_route,
        );

        let mut item = None;
        item = self.attach(item, get(routes::get_one::<T>), &self.get_one_route);
        item = self.attach(item, put(routes::update_one::<T>), &self.update_route);
        item = self.attach(item, delete(routes::delete_one::<T>), &self.delete_one_route);

        let collection_path = if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.clone()
        };
        let item_path = format!("{prefix}/{{{ITEM_ID}}}");

        let mut router = Router::new();
        if let Some(collection) = collection {
            router = router.route(&collection_path, collection);
        }
        if let Some(item) = item {
            router = router.route(&item_path, item);
        }

        tracing::debug!(
            resource = T::RESOURCE_NAME_PLURAL,
            collection = %collection_path,
            item = %item_path,
            paginate = ?self.paginate,
            extra_data = self.pagination_extra_data,
            "registered CRUD routes"
        );

        Ok(router.with_state(CrudState {
            using_db: self.using_db,
            paginate: self.paginate,
            pagination_extra_data: self.pagination_extra_data,
        }))
    }
}
