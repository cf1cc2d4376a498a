//! Minimal CRUD API
//!
//! ```bash
//! cargo run --example minimal
//! ```
//!
//! Then try:
//! - `curl -X POST localhost:3000/todos -H 'content-type: application/json' \
//!   -d '{"title":"write docs"}'`
//! - `curl 'localhost:3000/todos?limit=10&sortby=-id'`

mod shared;

use axum::Router;
use crudrouter::CrudRouter;
use shared::{Todo, setup_todo_database};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crudrouter=debug,info")),
        )
        .compact()
        .init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = setup_todo_database(&database_url).await?;

    let app = Router::new().merge(
        CrudRouter::<Todo>::new(db)
            .paginate(100)
            .pagination_extra_data(true)
            .build()?,
    );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on http://localhost:3000/todos");
    axum::serve(listener, app).await?;

    Ok(())
}
