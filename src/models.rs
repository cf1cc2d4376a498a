use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters accepted by the list route.
///
/// # Pagination
/// `skip` is the number of rows to pass over and `limit` the maximum number
/// of rows returned, for example `?skip=20&limit=10`.
///
/// # Sorting
/// `sortby` names a column. Prefix it with `-` to sort descending, for
/// example `?sortby=-created_at`. Without it rows come back in primary key
/// order.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of rows to skip.
    #[param(example = 0)]
    pub skip: Option<i64>,
    /// Maximum number of rows to return.
    #[param(example = 25)]
    pub limit: Option<i64>,
    /// Column to order by, `-` prefix for descending.
    #[param(example = "-id")]
    pub sortby: Option<String>,
}

/// Validated pagination triplet handed to [`CRUDResource::get_all`](crate::CRUDResource::get_all).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: Option<u64>,
    pub sortby: Option<String>,
}

impl Pagination {
    /// Every row, default order. Used by the delete-all route to report what is left.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            skip: 0,
            limit: None,
            sortby: None,
        }
    }
}

/// List body returned when `pagination_extra_data` is enabled.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResults<T> {
    pub results: Vec<T>,
    /// Total row count, independent of `skip` and `limit`.
    pub count: u64,
}

/// Body of the list and delete-all routes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Items(Vec<T>),
    Paginated(PaginatedResults<T>),
}
