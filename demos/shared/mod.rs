use async_trait::async_trait;
use crudrouter::{CRUDResource, MergeIntoActiveModel};
use sea_orm::{
    ActiveValue, ConnectionTrait, Database, DatabaseConnection, Schema, entity::prelude::*,
};
use serde::{Deserialize, Serialize};

/// Shared todo model used by the demos
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Serialize)]
pub struct Todo {
    id: i32,
    title: String,
    completed: bool,
}

impl From<Model> for Todo {
    fn from(model: Model) -> Self {
        Todo {
            id: model.id,
            title: model.title,
            completed: model.completed,
        }
    }
}

#[derive(Deserialize)]
pub struct TodoCreate {
    title: String,
    #[serde(default)]
    completed: bool,
}

impl From<TodoCreate> for ActiveModel {
    fn from(create: TodoCreate) -> Self {
        ActiveModel {
            id: ActiveValue::NotSet,
            title: ActiveValue::Set(create.title),
            completed: ActiveValue::Set(create.completed),
        }
    }
}

#[derive(Deserialize)]
pub struct TodoUpdate {
    title: Option<String>,
    completed: Option<bool>,
}

impl MergeIntoActiveModel<ActiveModel> for TodoUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(title) = self.title {
            existing.title = ActiveValue::Set(title);
        }
        if let Some(completed) = self.completed {
            existing.completed = ActiveValue::Set(completed);
        }
        Ok(existing)
    }
}

#[async_trait]
impl CRUDResource for Todo {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = TodoCreate;
    type UpdateModel = TodoUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "todo";
    const RESOURCE_NAME_PLURAL: &'static str = "todos";
}

/// Connect and create the `todos` table if it is missing
pub async fn setup_todo_database(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    let backend = db.get_database_backend();
    let mut create_table = Schema::new(backend).create_table_from_entity(Entity);
    create_table.if_not_exists();
    db.execute(backend.build(&create_table)).await?;
    Ok(db)
}
