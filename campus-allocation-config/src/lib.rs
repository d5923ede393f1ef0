use core::fmt::{Debug, Display};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "campus.toml";
pub const ENV_PREFIX: &str = "CAMPUS_";

/// Number of units in each pool. Only read at startup and on reset.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PoolsConfig {
    pub pc: usize,
    pub book: usize,
    pub seat: usize,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            pc: 10,
            book: 50,
            seat: 30,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub listen_address: SocketAddr,
    pub seed_sample_data: bool,
    pub pools: PoolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5000)),
            seed_sample_data: true,
            pools: PoolsConfig::default(),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// `campus.toml` in the working directory, overridden by `CAMPUS_*`
/// environment variables. Nested keys use a double underscore, e.g.
/// `CAMPUS_POOLS__PC=4`.
#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
