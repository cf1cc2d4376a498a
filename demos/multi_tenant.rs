//! One SQLite file per tenant, chosen from the URL
//!
//! ```bash
//! cargo run --example multi_tenant
//! ```
//!
//! `/tenants/acme/todos` and `/tenants/globex/todos` are separate databases
//! (`acme.db`, `globex.db`), opened on first use.

mod shared;

use axum::Router;
use crudrouter::{ApiError, CrudRouter, PathParams, RequireHeader, UsingDb};
use sea_orm::DatabaseConnection;
use shared::{Todo, setup_todo_database};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

type TenantPool = Arc<Mutex<HashMap<String, DatabaseConnection>>>;

async fn tenant_database(
    pool: TenantPool,
    params: PathParams,
) -> Result<DatabaseConnection, ApiError> {
    let tenant = params.get("tenant").unwrap_or_default();
    if tenant.is_empty() || !tenant.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::bad_request("tenant must be alphanumeric"));
    }

    let mut tenants = pool.lock().await;
    if let Some(db) = tenants.get(tenant) {
        return Ok(db.clone());
    }

    let db = setup_todo_database(&format!("sqlite:{tenant}.db?mode=rwc"))
        .await
        .map_err(ApiError::database)?;
    tracing::info!(tenant, "opened tenant database");
    tenants.insert(tenant.to_string(), db.clone());
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crudrouter=debug,info")),
        )
        .compact()
        .init();

    let pool = TenantPool::default();
    let using_db = UsingDb::from_async_fn(move |params| tenant_database(pool.clone(), params));

    let todos = CrudRouter::<Todo>::new(using_db)
        .paginate(50)
        .dependency(RequireHeader::new("x-api-key", "demo"))
        .delete_all_route(false)
        .build()?;
    let app = Router::new().nest("/tenants/{tenant}", todos);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on http://localhost:3000/tenants/{{tenant}}/todos");
    axum::serve(listener, app).await?;

    Ok(())
}
