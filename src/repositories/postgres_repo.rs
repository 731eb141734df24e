use anyhow::{anyhow, Context};
use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::NoTls;
use tracing::{info, warn};

pub const RETRY_LIMIT: usize = 5;

const SCHEMA: &str = include_str!("schema.sql");

pub struct PostgresConnectionRepo {
    postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresConnectionRepo {
    pub fn new(
        postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
    ) -> Self {
        Self {
            postgres_connection
        }
    }

    pub(crate) async fn get_postgres_connection(
        &self,
    ) -> anyhow::Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>> {
        for _ in 0..RETRY_LIMIT {
            match self.postgres_connection.get().await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!("Failed to retrieve postgres connection due to: {}, retrying in 3s", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                    continue;
                }
            }
        }

        Err(anyhow!("Failed to retrieve a valid connection from postgres pool, BAILING"))
    }

    /// Creates the customers and reservations tables when they are missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.get_postgres_connection().await?;
        conn.batch_execute(SCHEMA)
            .await
            .context("Failed to apply lunchly schema")?;

        info!("Database schema is up to date");
        Ok(())
    }
}
