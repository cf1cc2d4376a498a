use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IdenStatic, Iterable, Order, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use serde::{Serialize, de::DeserializeOwned};

/// Primary key type of every routed resource.
pub type ItemId = i32;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Copy the fields present in this update model onto `existing`, leaving
    /// every other field untouched.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if a field cannot be converted.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// A Sea-ORM entity exposed through the generated CRUD routes.
///
/// `Self` is the output schema: rows are converted with `From<Model>` and
/// serialized as the response body. `CreateModel` and `UpdateModel` are the
/// request bodies of the create and update routes.
#[async_trait]
pub trait CRUDResource: Sized + Send + Sync + Serialize + 'static
where
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait<Column = Self::ColumnType> + Sync;
    type ColumnType: ColumnTrait + Copy + std::fmt::Debug + Send + Sync;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync;
    type CreateModel: Into<Self::ActiveModelType> + DeserializeOwned + Send;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModelType> + DeserializeOwned + Send + Sync;

    /// Integer primary key column.
    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    /// One page of rows ordered by `sortby` (primary key when absent).
    ///
    /// # Errors
    ///
    /// Propagates any `DbErr` from the query.
    async fn get_all(
        db: &DatabaseConnection,
        order_column: Self::ColumnType,
        order_direction: Order,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Self>, DbErr> {
        // SQLite rejects OFFSET without LIMIT, so an unbounded page still
        // carries the largest limit every backend accepts.
        let models = Self::EntityType::find()
            .order_by(order_column, order_direction)
            .offset(offset)
            .limit(limit.unwrap_or(i64::MAX.unsigned_abs()))
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    /// # Errors
    ///
    /// `DbErr::RecordNotFound` when no row has this id.
    async fn get_one(db: &DatabaseConnection, id: ItemId) -> Result<Self, DbErr> {
        let model = Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!(
                "{} not found",
                Self::RESOURCE_NAME_SINGULAR
            )))?;
        Ok(Self::from(model))
    }

    /// Insert a row and return it as stored, server-assigned key included.
    ///
    /// # Errors
    ///
    /// Constraint violations and connection failures propagate as `DbErr`.
    async fn create(
        db: &DatabaseConnection,
        create_model: Self::CreateModel,
    ) -> Result<Self, DbErr> {
        let active_model: Self::ActiveModelType = create_model.into();
        let result = Self::EntityType::insert(active_model).exec(db).await?;
        let model = Self::EntityType::find_by_id(result.last_insert_id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!(
                "{} not found",
                Self::RESOURCE_NAME_SINGULAR
            )))?;
        Ok(Self::from(model))
    }

    /// Apply the fields present in `update_model` to the row with this id.
    ///
    /// Returns the number of rows touched; a missing id is not an error here.
    ///
    /// # Errors
    ///
    /// Propagates any `DbErr` from the merge or the query.
    async fn update(
        db: &DatabaseConnection,
        id: ItemId,
        update_model: Self::UpdateModel,
    ) -> Result<u64, DbErr> {
        let blank = <Self::ActiveModelType as ActiveModelBehavior>::new();
        let patch = update_model.merge_into_activemodel(blank)?;
        if Self::ColumnType::iter().all(|column| patch.is_not_set(column)) {
            return Ok(0);
        }
        let result = Self::EntityType::update_many()
            .set(patch)
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// # Errors
    ///
    /// Propagates any `DbErr` from the query.
    async fn delete(db: &DatabaseConnection, id: ItemId) -> Result<u64, DbErr> {
        let result = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete every row of the table.
    ///
    /// # Errors
    ///
    /// Propagates any `DbErr` from the query.
    async fn delete_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
        let result = Self::EntityType::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }

    /// Row count of the whole table.
    ///
    /// # Errors
    ///
    /// Propagates any `DbErr` from the query.
    async fn total_count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        let count: Option<i64> = Self::EntityType::find()
            .select_only()
            .column_as(Expr::col(Self::ID_COLUMN).count(), "count")
            .into_tuple()
            .one(db)
            .await?;
        Ok(count.map_or(0, |count| u64::try_from(count).unwrap_or(0)))
    }

    #[must_use]
    fn default_index_column() -> Self::ColumnType {
        Self::ID_COLUMN
    }

    /// Columns accepted by `sortby`. Every column of the entity by default.
    #[must_use]
    fn sortable_columns() -> Vec<(String, Self::ColumnType)> {
        Self::ColumnType::iter()
            .map(|column| (column.as_str().to_owned(), column))
            .collect()
    }
}
