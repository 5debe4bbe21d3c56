use crate::{
    config::{Environment, PortalConfig},
    paths::PortalPaths,
};
use eyre::Context as _;
use secrecy::SecretString;
use std::{fs, path::Path, path::PathBuf};

/// Env var holding the hex API private key. It is never written to disk.
pub const API_PRIVATE_KEY_ENV: &str = "COBOWEB3_API_PRIVATE_KEY";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

/// Apply environment variable overrides to the config.
fn apply_env_overrides(cfg: &mut PortalConfig) {
    /// Helper: if an env var is set and non-empty, apply `setter` with the trimmed value.
    fn apply_env(var: &str, setter: impl FnOnce(&str)) {
        if let Ok(u) = std::env::var(var) {
            let t = u.trim();
            if !t.is_empty() {
                setter(t);
            }
        }
    }

    apply_env("COBOWEB3_ENV", |v| {
        if let Some(env) = Environment::parse(v) {
            cfg.environment = env;
        }
    });
    apply_env("COBOWEB3_BASE_URL", |v| {
        cfg.base_url = Some(v.to_owned());
    });
    apply_env("COBOWEB3_HTTP_TIMEOUT_SECONDS", |v| {
        if let Ok(n) = v.parse::<u64>() {
            if n > 0 {
                cfg.http.timeout_seconds = n;
            }
        }
    });
}

pub fn parse_config(path: &Path) -> eyre::Result<PortalConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PortalConfig = toml::from_str(&s).context("parse config.toml")?;
    Ok(cfg)
}

/// The API private key from the environment, if set.
pub fn api_private_key_from_env() -> Option<SecretString> {
    std::env::var(API_PRIVATE_KEY_ENV)
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .map(SecretString::from)
}

impl ConfigStore {
    pub fn new(paths: &PortalPaths) -> Self {
        Self {
            path: paths.config_dir.join("config.toml"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `config.toml` (defaults if absent) and layer env overrides on top.
    pub fn load(&self) -> eyre::Result<PortalConfig> {
        let mut cfg = if self.path.exists() {
            parse_config(&self.path)?
        } else {
            PortalConfig::default()
        };
        apply_env_overrides(&mut cfg);
        Ok(cfg)
    }
}
