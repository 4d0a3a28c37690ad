use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_FONT_DIR: &str = "public/fonts";
pub const DEFAULT_FONT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/dev/examples/fonts/helvetiker_regular.typeface.json";

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directory served under `/fonts` and filled by `/api/setup`
    pub font_dir: PathBuf,
    /// Where a missing typeface is downloaded from
    pub font_source_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FONT_SERVER_ADDR '{value}' is not a socket address: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

impl ServerConfig {
    /// `FONT_SERVER_ADDR`, `FONT_DIR` and `FONT_SOURCE_URL`, with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_value = get("FONT_SERVER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        Ok(Self {
            addr,
            font_dir: get("FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_DIR)),
            font_source_url: get("FONT_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_FONT_SOURCE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.addr, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(c.font_dir, PathBuf::from("public/fonts"));
        assert_eq!(c.font_source_url, DEFAULT_FONT_SOURCE_URL);
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let c = config(&[
            ("FONT_SERVER_ADDR", "127.0.0.1:8080"),
            ("FONT_DIR", "/srv/fonts"),
            ("FONT_SOURCE_URL", "  "),
        ])
        .unwrap();
        assert_eq!(c.addr.port(), 8080);
        assert_eq!(c.font_dir, PathBuf::from("/srv/fonts"));
        assert_eq!(c.font_source_url, DEFAULT_FONT_SOURCE_URL);
    }

    #[test]
    fn test_invalid_addr() {
        let err = config(&[("FONT_SERVER_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().contains("localhost"));
    }
}
