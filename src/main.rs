use anyhow::Context;
use bb8_postgres::bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::NoTls;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use lunchly::config::Config;
use lunchly::controller::{self, AppState};
use lunchly::repositories::postgres_repo::PostgresConnectionRepo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let manager = PostgresConnectionManager::new_from_stringlike(&config.database_url, NoTls)
        .context("Invalid DATABASE_URL")?;
    let postgres_connection = Pool::builder()
        .max_size(config.postgres_pool_size)
        .connection_timeout(config.postgres_connection_timeout())
        .build(manager)
        .await
        .context("Failed to build postgres connection pool")?;
    info!("Connected to postgres with pool size {}", config.postgres_pool_size);

    PostgresConnectionRepo::new(postgres_connection.clone())
        .migrate()
        .await?;

    controller::serve(AppState { postgres_connection }, &config).await
}
