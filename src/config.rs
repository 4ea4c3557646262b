//! Configuration management for Pagemark

use serde::Deserialize;
use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_SENTENCES_PER_PAGE: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Directory holding `<id>.json` and `<id>.txt` books
    pub root: PathBuf,
    pub sentences_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./pagemark.db".to_string(),
            },
            library: LibraryConfig {
                root: PathBuf::from("./library"),
                sentences_per_page: DEFAULT_SENTENCES_PER_PAGE,
            },
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to defaults
    /// for anything unset. Malformed numbers are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            library: LibraryConfig {
                root: env::var("LIBRARY_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.library.root),
                sentences_per_page: parse_var::<usize>("SENTENCES_PER_PAGE")?
                    .unwrap_or(defaults.library.sentences_per_page)
                    .max(1),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|source| ConfigError::InvalidNumber { name, source }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.library.sentences_per_page, 50);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("PAGEMARK_TEST_NUMBER", "fifty");
        assert!(matches!(
            parse_var::<usize>("PAGEMARK_TEST_NUMBER"),
            Err(ConfigError::InvalidNumber { name: "PAGEMARK_TEST_NUMBER", .. })
        ));

        env::set_var("PAGEMARK_TEST_NUMBER", " 25 ");
        assert_eq!(parse_var::<usize>("PAGEMARK_TEST_NUMBER").unwrap(), Some(25));
        env::remove_var("PAGEMARK_TEST_NUMBER");
    }
}
