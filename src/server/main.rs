use std::sync::Arc;

use todo_web::adapters::HttpServer;
use todo_web::config::ServerConfig;
use todo_web::storage::sqlite::SqliteTodoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = ServerConfig::from_env();
    let store = Arc::new(SqliteTodoStore::connect(&config.database_url).await?);
    let server = HttpServer::new(store)?;
    server.serve(&config.bind_addr).await?;
    Ok(())
}
