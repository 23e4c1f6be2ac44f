//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first if present.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `sqlite:` connection URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid PORT {raw:?}"))?,
            None => 3000,
        };
        let log_format = match get("LOG_FORMAT").map(str::to_ascii_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("invalid LOG_FORMAT {other:?}, expected \"text\" or \"json\""),
        };

        Ok(Config {
            host: get("HOST").unwrap_or("127.0.0.1").to_string(),
            port,
            database_url: get("DATABASE_URL").map(str::to_string),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
