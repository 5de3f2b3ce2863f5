//! Server configuration read from the environment (and `.env`).

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT") {
            Ok(p) => p.parse().with_context(|| format!("invalid PORT: {p}"))?,
            Err(_) => 3000,
        };
        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(n) => n
                .parse()
                .with_context(|| format!("invalid DATABASE_MAX_CONNECTIONS: {n}"))?,
            Err(_) => 10,
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
