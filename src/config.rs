use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{bail, Context};

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub session_days: i64,
    pub secure_cookies: bool,
    pub in_memory: bool,
}

impl Config {
    /// Reads the environment; `args` are the process arguments after the program name.
    pub fn load<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut in_memory = false;
        for arg in args {
            match arg.as_str() {
                "--in-memory" => in_memory = true,
                other => bail!("Unknown argument `{}`", other),
            }
        }

        let database_url = env::var("DATABASE_URL").ok();
        if database_url.is_none() && !in_memory {
            bail!("DATABASE_URL must be set unless --in-memory is given");
        }

        Ok(Self {
            addr: try_load("PORTAL_ADDR", "127.0.0.1:3000")?,
            database_url,
            max_connections: try_load("PORTAL_DB_MAX_CONNECTIONS", "5")?,
            session_days: try_load("PORTAL_SESSION_DAYS", "2")?,
            secure_cookies: try_load("PORTAL_SECURE_COOKIES", "false")?,
            in_memory,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    raw.parse()
        .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Invalid {} value `{}`", key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_unset_keys() {
        let port: SocketAddr = try_load("PORTAL_TEST_UNSET_ADDR", "127.0.0.1:3000").unwrap();
        assert_eq!(port.port(), 3000);
        let flag: bool = try_load("PORTAL_TEST_UNSET_FLAG", "false").unwrap();
        assert!(!flag);
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(Config::load(vec!["--verbose".to_string()]).is_err());
    }

    #[test]
    fn in_memory_needs_no_database() {
        let config = Config::load(vec!["--in-memory".to_string()]).unwrap();
        assert!(config.in_memory);
    }
}
