use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
    /// Serve HTTPS when present.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TlsConfig {
    #[serde(default)]
    pub cert_path: String,
    #[serde(default)]
    pub key_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(default_worker_threads()),
            shutdown_grace_secs: default_shutdown_grace(),
            tls: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// File the check collection is mirrored to.
    #[serde(default = "default_repo_path")]
    pub repo_path: String,
    /// Remove the persisted collection before the store opens.
    #[serde(default)]
    pub reset_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { repo_path: default_repo_path(), reset_on_start: false }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_worker_threads() -> usize { 4 }
fn default_shutdown_grace() -> u64 { 10 }
fn default_repo_path() -> String { "data/endpoints.bin".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// Build a config purely from environment variables, using defaults for anything unset.
pub fn from_env() -> AppConfig {
    from_lookup(|key| std::env::var(key).ok())
}

fn from_lookup<F>(lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = AppConfig::default();
    if let Some(host) = lookup("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
        cfg.server.worker_threads = Some(w);
    }
    if let Some(g) = lookup("SHUTDOWN_GRACE_SECS").and_then(|v| v.parse::<u64>().ok()) {
        cfg.server.shutdown_grace_secs = g;
    }
    let cert = lookup("TLS_CERT_PATH");
    let key = lookup("TLS_KEY_PATH");
    if cert.is_some() || key.is_some() {
        cfg.server.tls = Some(TlsConfig {
            cert_path: cert.unwrap_or_default(),
            key_path: key.unwrap_or_default(),
        });
    }
    if let Some(path) = lookup("REPO_PATH") {
        cfg.storage.repo_path = path;
    }
    if let Some(reset) = lookup("REPO_RESET") {
        cfg.storage.reset_on_start = matches!(reset.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
    cfg
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Prefer `config.toml` (or `CONFIG_PATH`); fall back to environment variables
    /// only when the file does not exist. A malformed file is an error.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => from_env(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        // 未配置或配置为 0 时回落到默认线程数
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(default_worker_threads()),
        }
        if self.shutdown_grace_secs == 0 {
            return Err(anyhow!("server.shutdown_grace_secs must be a positive number of seconds"));
        }
        if let Some(tls) = &self.tls {
            tls.validate()?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl TlsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cert_path.trim().is_empty() || self.key_path.trim().is_empty() {
            return Err(anyhow!("server.tls needs both cert_path and key_path (TLS_CERT_PATH / TLS_KEY_PATH)"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repo_path.trim().is_empty() {
            return Err(anyhow!("storage.repo_path is empty; set it in config.toml or REPO_PATH"));
        }
        Ok(())
    }
}
