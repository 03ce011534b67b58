use crate::core::errors::{Error, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_STALENESS_SECS: u64 = 10;
pub const DEFAULT_SIGN_URL_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Command line of the `ossdir` server.
#[derive(Debug, Clone, Parser)]
#[command(name = "ossdir", version, about = "Directory-tree view over an object store bucket")]
pub struct Cli {
    /// JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Overrides `apiPort` from the configuration file.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Overrides `storeUrl` (`memory://` or `file:///some/dir`).
    #[arg(long)]
    pub store_url: Option<String>,
}

/// Process configuration. Key names follow the deployed `config.json` files.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub oss_endpoint: String,
    #[serde(default)]
    pub oss_access_key_id: String,
    #[serde(default)]
    pub oss_access_key_secret: String,
    #[serde(default)]
    pub oss_bucket: String,
    #[serde(default)]
    pub oss_region: Option<String>,
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub api_port: u16,
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
    #[serde(default = "default_sign_url_secs")]
    pub sign_url_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_staleness_secs() -> u64 {
    DEFAULT_STALENESS_SECS
}

fn default_sign_url_secs() -> u64 {
    DEFAULT_SIGN_URL_SECS
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("invalid json: {e}")))
    }

    /// Applies command line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.api_port = port;
        }
        if let Some(url) = &cli.store_url {
            self.store_url = Some(url.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            return Err(Error::Config("apiPort is missing".into()));
        }
        if self.store_url.is_none() && self.oss_bucket.trim().is_empty() {
            return Err(Error::Config("ossBucket is missing".into()));
        }
        Ok(())
    }

    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }

    pub fn sign_url_ttl(&self) -> Duration {
        Duration::from_secs(self.sign_url_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deployed_key_names() {
        let config = Config::from_json(
            r#"{
                "ossEndpoint": "https://oss-cn-hangzhou.aliyuncs.com",
                "ossAccessKeyId": "id",
                "ossAccessKeySecret": "secret",
                "ossBucket": "files",
                "apiPort": 8080
            }"#,
        )
        .unwrap();

        assert_eq!(config.oss_bucket, "files");
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.staleness(), Duration::from_secs(10));
        assert_eq!(config.sign_url_ttl(), Duration::from_secs(60));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_missing_bucket_without_store_url() {
        let config = Config::from_json(r#"{"apiPort": 8080}"#).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = Config::from_json(r#"{"apiPort": 8080, "storeUrl": "memory://"}"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cli_overrides_port_and_store() {
        let mut config = Config::from_json(r#"{"apiPort": 8080, "ossBucket": "b"}"#).unwrap();
        let cli = Cli::parse_from(["ossdir", "--port", "9000", "--store-url", "memory://"]);
        config.apply_cli(&cli);

        assert_eq!(config.api_port, 9000);
        assert_eq!(config.store_url.as_deref(), Some("memory://"));
    }
}
