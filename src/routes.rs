use crate::database::{PathParams, UsingDb};
use crate::errors::ApiError;
use crate::models::{ListResponse, PaginatedResults, Pagination};
use crate::sort::parse_sortby;
use crate::traits::{CRUDResource, ItemId};
use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use sea_orm::{DatabaseConnection, DbErr};

/// Name of the path capture holding the primary key.
pub const ITEM_ID: &str = "item_id";

/// Router state shared by the generated handlers.
#[derive(Clone, Debug)]
pub struct CrudState {
    pub using_db: UsingDb,
    /// Maximum and default page size.
    pub paginate: Option<u64>,
    /// Wrap list responses in `{results, count}`.
    pub pagination_extra_data: bool,
}

/// `/{item_id}` capture plus every other path parameter of the request.
#[derive(Debug, Clone)]
pub struct ItemPath {
    pub item_id: ItemId,
    pub params: PathParams,
}

impl<S> FromRequestParts<S> for ItemPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = PathParams::from_request_parts(parts, state).await?;
        let raw = params.get(ITEM_ID).ok_or_else(|| {
            ApiError::validation_failed(vec![format!("missing {ITEM_ID} path parameter")])
        })?;
        let item_id = raw.parse::<ItemId>().map_err(|_| {
            ApiError::validation_failed(vec![format!("{ITEM_ID} must be an integer, got '{raw}'")])
        })?;
        Ok(Self { item_id, params })
    }
}

async fn list_items<T>(
    db: &DatabaseConnection,
    pagination: &Pagination,
    pagination_extra_data: bool,
) -> Result<ListResponse<T>, ApiError>
where
    T: CRUDResource,
{
    let (order_column, order_direction) = parse_sortby(
        pagination.sortby.as_deref(),
        &T::sortable_columns(),
        T::default_index_column(),
    )?;

    let items = T::get_all(
        db,
        order_column,
        order_direction,
        pagination.skip,
        pagination.limit,
    )
    .await?;

    if pagination_extra_data {
        let count = T::total_count(db).await?;
        Ok(ListResponse::Paginated(PaginatedResults {
            results: items,
            count,
        }))
    } else {
        Ok(ListResponse::Items(items))
    }
}

async fn fetch_one<T>(db: &DatabaseConnection, item_id: ItemId) -> Result<T, ApiError>
where
    T: CRUDResource,
{
    match T::get_one(db, item_id).await {
        Ok(item) => Ok(item),
        Err(DbErr::RecordNotFound(_)) => Err(ApiError::not_found(
            T::RESOURCE_NAME_SINGULAR,
            Some(item_id.to_string()),
        )),
        Err(err) => Err(ApiError::database(err)),
    }
}

/// `GET {prefix}`: one page of items.
///
/// # Errors
///
/// 400 for an unknown `sortby` column, 422 for invalid pagination, 500 on
/// database failure.
pub async fn get_all<T>(
    State(state): State<CrudState>,
    params: PathParams,
    pagination: Pagination,
) -> Result<Json<ListResponse<T>>, ApiError>
where
    T: CRUDResource,
{
    tracing::debug!(
        resource = T::RESOURCE_NAME_PLURAL,
        skip = pagination.skip,
        limit = ?pagination.limit,
        sortby = ?pagination.sortby,
        "listing items"
    );
    let db = state.using_db.resolve(&params).await?;
    list_items::<T>(&db, &pagination, state.pagination_extra_data)
        .await
        .map(Json)
}

/// `GET {prefix}/{item_id}`
///
/// # Errors
///
/// 404 when no item has this id.
pub async fn get_one<T>(
    State(state): State<CrudState>,
    ItemPath { item_id, params }: ItemPath,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let db = state.using_db.resolve(&params).await?;
    fetch_one::<T>(&db, item_id).await.map(Json)
}

/// `POST {prefix}`: insert and return the stored item.
///
/// # Errors
///
/// Constraint violations surface as 500.
pub async fn create_one<T>(
    State(state): State<CrudState>,
    params: PathParams,
    Json(payload): Json<T::CreateModel>,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let db = state.using_db.resolve(&params).await?;
    let created = T::create(&db, payload).await.map_err(ApiError::database)?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, "created item");
    Ok(Json(created))
}

/// `PUT {prefix}/{item_id}`: partial update, then the item as it now reads.
///
/// # Errors
///
/// 404 when no item has this id.
pub async fn update_one<T>(
    State(state): State<CrudState>,
    ItemPath { item_id, params }: ItemPath,
    Json(payload): Json<T::UpdateModel>,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let db = state.using_db.resolve(&params).await?;
    let rows = T::update(&db, item_id, payload)
        .await
        .map_err(ApiError::database)?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, item_id, rows, "updated item");
    fetch_one::<T>(&db, item_id).await.map(Json)
}

/// `DELETE {prefix}/{item_id}`: returns the item as it was before deletion.
///
/// # Errors
///
/// 404 when no item has this id.
pub async fn delete_one<T>(
    State(state): State<CrudState>,
    ItemPath { item_id, params }: ItemPath,
) -> Result<Json<T>, ApiError>
where
    T: CRUDResource,
{
    let db = state.using_db.resolve(&params).await?;
    let item = fetch_one::<T>(&db, item_id).await?;
    T::delete(&db, item_id).await.map_err(ApiError::database)?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, item_id, "deleted item");
    Ok(Json(item))
}

/// `DELETE {prefix}`: removes every item and returns what is left, shaped
/// like the list route.
///
/// # Errors
///
/// 500 on database failure.
pub async fn delete_all<T>(
    State(state): State<CrudState>,
    params: PathParams,
) -> Result<Json<ListResponse<T>>, ApiError>
where
    T: CRUDResource,
{
    let db = state.using_db.resolve(&params).await?;
    let rows = T::delete_all(&db).await.map_err(ApiError::database)?;
    tracing::debug!(resource = T::RESOURCE_NAME_PLURAL, rows, "deleted all items");
    list_items::<T>(&db, &Pagination::unbounded(), state.pagination_extra_data)
        .await
        .map(Json)
}
