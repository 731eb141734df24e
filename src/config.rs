use std::net::IpAddr;
use std::time::Duration;
use clap::Parser;

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    /// libpq connection string, either key/value or `postgres://` form
    #[clap(env, long)]
    pub database_url: String,

    #[clap(env, long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated list of origins allowed by CORS
    #[clap(env, long, default_value = "http://localhost:3000")]
    pub origin_urls: String,

    #[clap(env, long, default_value_t = 10)]
    pub postgres_pool_size: u32,

    /// Seconds to wait for a pooled connection before a retry
    #[clap(env, long, default_value_t = 5)]
    pub postgres_connection_timeout_secs: u64,

    /// Maximum number of requests served at once
    #[clap(env, long, default_value_t = 512)]
    pub concurrency_limit: usize,
}

impl Config {
    pub fn postgres_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.postgres_connection_timeout_secs)
    }
}
