use async_trait::async_trait;
use crudrouter::{CRUDResource, MergeIntoActiveModel};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Item {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            description: model.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ItemCreate> for ActiveModel {
    fn from(create: ItemCreate) -> Self {
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(create.name),
            quantity: ActiveValue::Set(create.quantity),
            description: ActiveValue::Set(create.description),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    /// Absent leaves the column alone, `null` clears it.
    #[serde(default, with = "crudrouter::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
}

impl MergeIntoActiveModel<ActiveModel> for ItemUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = ActiveValue::Set(name);
        }
        if let Some(quantity) = self.quantity {
            existing.quantity = ActiveValue::Set(quantity);
        }
        if let Some(description) = self.description {
            existing.description = ActiveValue::Set(description);
        }
        Ok(existing)
    }
}

#[async_trait]
impl CRUDResource for Item {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = ItemCreate;
    type UpdateModel = ItemUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "item";
    const RESOURCE_NAME_PLURAL: &'static str = "items";
}
