//! Bingo session server.
//!
//! Configured from the environment:
//!
//! | variable | default |
//! |---|---|
//! | `BINGO_BIND` | `127.0.0.1:5000` |
//! | `BINGO_IDLE_TIMEOUT_SECS` | `60` |
//! | `BINGO_PING_INTERVAL_SECS` | `20` |
//! | `BINGO_WIN_LINES` | `5` |
//! | `RUST_LOG` | `info` |
//!
//! Set `BINGO_BIND=0.0.0.0:5000` to accept players from other hosts.

use std::str::FromStr;
use std::time::Duration;

use bingo::DEFAULT_BIND_ADDR;
use bingo::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Settings {
    bind: String,
    config: ServerConfig,
}

impl Settings {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = ServerConfig::default();
        if let Some(secs) = parse_var::<u64>(&lookup, "BINGO_IDLE_TIMEOUT_SECS")? {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "BINGO_PING_INTERVAL_SECS")? {
            if secs == 0 {
                return Err("BINGO_PING_INTERVAL_SECS must be at least 1".to_string());
            }
            config.ping_interval = Duration::from_secs(secs);
        }
        if config.ping_interval >= config.idle_timeout {
            return Err(
                "BINGO_PING_INTERVAL_SECS must be shorter than BINGO_IDLE_TIMEOUT_SECS".to_string(),
            );
        }
        if let Some(lines) = parse_var::<usize>(&lookup, "BINGO_WIN_LINES")? {
            if lines == 0 || lines > bingo::room::LINE_COUNT {
                return Err(format!(
                    "BINGO_WIN_LINES must be between 1 and {}",
                    bingo::room::LINE_COUNT
                ));
            }
            config.room.win_lines = lines;
        }

        Ok(Self {
            bind: lookup("BINGO_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            config,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key}: cannot parse {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        bind = %settings.bind,
        idle_timeout_secs = settings.config.idle_timeout.as_secs(),
        ping_interval_secs = settings.config.ping_interval.as_secs(),
        win_lines = settings.config.room.win_lines,
        "starting bingo server"
    );

    let server = BingoServer::builder()
        .bind(&settings.bind)
        .config(settings.config)
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
