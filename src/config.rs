//! Prediction service configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "ONCOSERVE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub n_features: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config file path, honouring `ONCOSERVE_CONFIG` when set
    pub fn default_path() -> String {
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        if self.server.max_body_bytes == 0 {
            anyhow::bail!("server.max_body_bytes must be non-zero");
        }
        if self.model.n_features == 0 {
            anyhow::bail!("model.n_features must be non-zero");
        }
        Ok(())
    }

    /// Socket address string the REST listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 6874,
                max_body_bytes: default_max_body_bytes(),
            },
            model: ModelConfig {
                path: PathBuf::from("models/breast_cancer.json"),
                n_features: 30,
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:6874");
        assert_eq!(config.model.n_features, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[model]
path = "models/other.json"
n_features = 4
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
        assert_eq!(config.model.path, PathBuf::from("models/other.json"));
        assert_eq!(config.model.n_features, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_zero_features() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 6874

[model]
path = "m.json"
n_features = 0
"#
        )
        .unwrap();

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::load("/nonexistent/oncoserve.toml").is_err());
    }
}
