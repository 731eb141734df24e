#![allow(dead_code)]

use bb8_postgres::bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::NoTls;
use time::OffsetDateTime;
use tokio::sync::OnceCell;
use lunchly::controller::AppState;
use lunchly::repositories::postgres_repo::PostgresConnectionRepo;

static SCHEMA_APPLIED: OnceCell<()> = OnceCell::const_new();

/// App state over a pool that never connects unless a handler reaches the database.
pub fn lazy_app_state() -> AppState {
    let manager = PostgresConnectionManager::new_from_stringlike("host=127.0.0.1 port=1 user=lunchly", NoTls)
        .unwrap();

    AppState {
        postgres_connection: Pool::builder().build_unchecked(manager),
    }
}

/// Repo backed by `DATABASE_URL`, or `None` when no database is configured.
pub async fn live_repo() -> Option<PostgresConnectionRepo> {
    dotenv::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let manager = PostgresConnectionManager::new_from_stringlike(database_url, NoTls).unwrap();
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .await
        .unwrap();
    let repo = PostgresConnectionRepo::new(pool);

    SCHEMA_APPLIED
        .get_or_try_init(|| repo.migrate())
        .await
        .unwrap();

    Some(repo)
}

/// Distinguishes rows written by concurrently running tests.
pub fn unique_suffix() -> String {
    OffsetDateTime::now_utc().unix_timestamp_nanos().to_string()
}
