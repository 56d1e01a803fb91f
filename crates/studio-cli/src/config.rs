use std::env;
use std::path::{Path, PathBuf};

use studio_models::Registry;
use studio_relay::RelayConfig;
use studio_relay::replicate::ReplicateConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

/// Everything `studio serve` needs, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub catalog: Option<PathBuf>,
    pub relay: RelayConfig,
    pub replicate: ReplicateConfig,
}

impl ServerConfig {
    /// Flags win over the environment; the environment wins over defaults.
    pub fn load(host: Option<String>, port: Option<u16>, catalog: Option<PathBuf>) -> Self {
        Self {
            host: host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.unwrap_or(DEFAULT_PORT),
            catalog: catalog.or_else(catalog_from_env),
            relay: RelayConfig::from_env(),
            replicate: ReplicateConfig::from_env(),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where `studio generate` sends requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub catalog: Option<PathBuf>,
}

impl ClientConfig {
    pub fn load(relay_url: Option<String>, catalog: Option<PathBuf>) -> Self {
        Self {
            relay_url: relay_url
                .or_else(|| non_empty_var("STUDIO_RELAY_URL"))
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            catalog: catalog.or_else(catalog_from_env),
        }
    }
}

/// The catalog file if one is configured, otherwise the built-in catalog.
pub fn load_registry(catalog: Option<&Path>) -> Result<Registry, studio_models::Error> {
    match catalog {
        Some(path) => {
            let registry = Registry::load(path)?;
            tracing::info!(path = %path.display(), models = registry.len(), "loaded catalog file");
            Ok(registry)
        }
        None => Ok(Registry::builtin()),
    }
}

pub fn catalog_from_env() -> Option<PathBuf> {
    non_empty_var("STUDIO_CATALOG").map(PathBuf::from)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::load(
            Some("0.0.0.0".into()),
            Some(8080),
            Some("models.json".into()),
        );
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.catalog.as_deref(), Some(Path::new("models.json")));

        let client = ClientConfig::load(Some("http://relay.internal:9000".into()), None);
        assert_eq!(client.relay_url, "http://relay.internal:9000");
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let err = load_registry(Some(Path::new("/nonexistent/studio-catalog.json")))
            .expect_err("no such file");
        assert!(matches!(err, studio_models::Error::Io(_)));
        assert_eq!(load_registry(None).expect("builtin").len(), 4);
    }
}
