use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use crudrouter::CrudRouter;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;

pub mod item_entity;

use item_entity::Item;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    CrudRouter::<Item>::new(db)
        .build()
        .expect("Failed to build item router")
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create `(name, quantity)` items through the API, in order.
pub async fn seed_items(app: &Router, uri: &str, items: &[(&str, i32)]) -> Vec<Value> {
    let mut created = Vec::with_capacity(items.len());
    for (name, quantity) in items {
        let (status, body) = send(
            app,
            Method::POST,
            uri,
            Some(serde_json::json!({ "name": name, "quantity": quantity })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "seeding {name} failed: {body}");
        created.push(body);
    }
    created
}

/// Names of a bare list body, in response order.
pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateItemTable)]
    }
}

pub struct CreateItemTable;

impl MigrationName for CreateItemTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_item_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateItemTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(ItemTable)
            .if_not_exists()
            .col(
                ColumnDef::new(ItemColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(ItemColumn::Name).string().not_null())
            .col(
                ColumnDef::new(ItemColumn::Quantity)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(ItemColumn::Description).text().null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemTable).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ItemColumn {
    Id,
    Name,
    Quantity,
    Description,
}

impl Iden for ItemColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Quantity => "quantity",
                Self::Description => "description",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct ItemTable;

impl Iden for ItemTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "items").unwrap();
    }
}
