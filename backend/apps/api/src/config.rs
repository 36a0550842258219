//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use quest::QuestConfig;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const DEFAULT_STATIC_DIR: &str = "dist";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    pub frontend_origins: Vec<String>,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host: IpAddr = match env::var("HOST") {
            Ok(host) => host.parse().with_context(|| format!("HOST is not an IP address: {host}"))?,
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = parse_or("PORT", DEFAULT_PORT)?;

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            addr: SocketAddr::new(host, port),
            database_url,
            max_connections,
            frontend_origins,
            static_dir,
        })
    }
}

/// Quest Master configuration
///
/// Debug builds fall back to the well-known development PIN; release builds
/// refuse to start without `MASTER_PIN`. `TRUST_FORWARDED_FOR=true` keys PIN
/// lockouts by `X-Forwarded-For` and belongs only behind a proxy that sets it.
pub fn quest_config_from_env() -> anyhow::Result<QuestConfig> {
    let mut config = match env::var("MASTER_PIN") {
        Ok(pin) if !pin.trim().is_empty() => QuestConfig::with_master_pin(pin.trim()),
        _ if cfg!(debug_assertions) => {
            tracing::warn!("MASTER_PIN not set, using the development master PIN");
            QuestConfig::development()
        }
        _ => anyhow::bail!("MASTER_PIN must be set in production"),
    };
    config.trust_forwarded_for = parse_or("TRUST_FORWARDED_FOR", false)?;
    Ok(config)
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {value}")),
        Err(_) => Ok(default),
    }
}
