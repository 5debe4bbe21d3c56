use coboweb3::{
    config::Environment,
    paths::PortalPaths,
    platform::http::ApiSigner,
    store::{self, ConfigStore},
};
use eyre::Context as _;
use serde_json::json;
use std::path::PathBuf;

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

struct PathsReport {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_file: PathBuf,
}

struct ConfigReport {
    path: PathBuf,
    exists: bool,
    parse_ok: bool,
    error: Option<String>,
    environment_configured: Option<&'static str>,
}

struct PlatformReport {
    environment: &'static str,
    base_url: String,
    timeout_seconds: u64,
}

struct ApiKeyReport {
    set: bool,
    /// Derived public key (the value sent as `Biz-Api-Key`). Never the secret.
    public_key: Option<String>,
    error: Option<String>,
}

struct DoctorReport {
    version: &'static str,
    paths: PathsReport,
    config: ConfigReport,
    platform: PlatformReport,
    api_key: ApiKeyReport,
    env: serde_json::Value,
}

fn collect_api_key() -> ApiKeyReport {
    match store::api_private_key_from_env() {
        None => ApiKeyReport {
            set: false,
            public_key: None,
            error: None,
        },
        Some(secret) => match ApiSigner::from_hex_secret(&secret) {
            Ok(signer) => ApiKeyReport {
                set: true,
                public_key: Some(signer.api_key()),
                error: None,
            },
            Err(e) => ApiKeyReport {
                set: true,
                public_key: None,
                error: Some(e.to_string()),
            },
        },
    }
}

fn collect(paths: &PortalPaths, env_override: Option<Environment>) -> DoctorReport {
    let config_store = ConfigStore::new(paths);
    let config_path = config_store.path().to_path_buf();
    let config_exists = config_path.exists();
    let (config_ok, config_err, file_cfg) = if config_exists {
        match store::parse_config(&config_path) {
            Ok(cfg) => (true, None, Some(cfg)),
            Err(e) => (false, Some(format!("{e:#}")), None),
        }
    } else {
        (false, None, None)
    };

    // Effective view: same layering as a real run, falling back to defaults if the file is bad.
    let mut effective = config_store.load().unwrap_or_default();
    if let Some(env) = env_override {
        effective.environment = env;
    }

    let api_key = collect_api_key();
    let env = json!({
      "COBOWEB3_CONFIG_DIR": env_opt("COBOWEB3_CONFIG_DIR"),
      "COBOWEB3_DATA_DIR": env_opt("COBOWEB3_DATA_DIR"),
      "COBOWEB3_ENV": env_opt("COBOWEB3_ENV"),
      "COBOWEB3_BASE_URL": env_opt("COBOWEB3_BASE_URL"),
      "COBOWEB3_API_PRIVATE_KEY_set": api_key.set,
    });

    DoctorReport {
        version: env!("CARGO_PKG_VERSION"),
        paths: PathsReport {
            config_dir: paths.config_dir.clone(),
            data_dir: paths.data_dir.clone(),
            log_file: paths.log_file.clone(),
        },
        config: ConfigReport {
            path: config_path,
            exists: config_exists,
            parse_ok: config_ok,
            error: config_err,
            environment_configured: file_cfg.as_ref().map(|c| c.environment.as_str()),
        },
        platform: PlatformReport {
            environment: effective.environment.as_str(),
            base_url: effective.effective_base_url().to_owned(),
            timeout_seconds: effective.http.timeout_seconds,
        },
        api_key,
        env,
    }
}

fn print_json(out: &mut impl std::io::Write, r: &DoctorReport) -> eyre::Result<()> {
    let s = serde_json::to_string_pretty(&json!({
      "ok": true,
      "version": r.version,
      "paths": {
        "config_dir": r.paths.config_dir,
        "data_dir": r.paths.data_dir,
        "log_file": r.paths.log_file,
      },
      "config": {
        "path": r.config.path,
        "exists": r.config.exists,
        "parse_ok": r.config.parse_ok,
        "error": r.config.error,
        "environment": r.config.environment_configured,
      },
      "platform": {
        "environment": r.platform.environment,
        "base_url": r.platform.base_url,
        "timeout_seconds": r.platform.timeout_seconds,
      },
      "api_key": {
        "set": r.api_key.set,
        "public_key": r.api_key.public_key,
        "error": r.api_key.error,
      },
      "env": r.env,
      "hints": [
        "Set COBOWEB3_API_PRIVATE_KEY to the hex Ed25519 API secret; register api_key.public_key with the platform.",
        "Use --env sandbox (or COBOWEB3_ENV) before pointing at prod.",
      ]
    }))
    .context("serialize doctor json")?;
    writeln!(out, "{s}").context("write doctor json")?;
    Ok(())
}

fn print_human(out: &mut impl std::io::Write, r: &DoctorReport) -> eyre::Result<()> {
    writeln!(out, "coboweb3 doctor (v{})", r.version).context("write header")?;
    writeln!(out).context("write newline")?;

    writeln!(out, "Paths:").context("write paths header")?;
    writeln!(out, "  config_dir: {}", r.paths.config_dir.display()).context("write paths")?;
    writeln!(out, "  data_dir:   {}", r.paths.data_dir.display()).context("write paths")?;
    writeln!(out, "  log_file:   {}", r.paths.log_file.display()).context("write paths")?;
    writeln!(out).context("write newline")?;

    writeln!(out, "Config:").context("write config header")?;
    writeln!(out, "  config.toml: {}", r.config.path.display()).context("write config")?;
    if !r.config.exists {
        writeln!(out, "  status: missing (defaults in use)").context("write config")?;
    } else if r.config.parse_ok {
        writeln!(
            out,
            "  status: ok (environment: {})",
            r.config.environment_configured.unwrap_or("dev")
        )
        .context("write config")?;
    } else {
        writeln!(out, "  status: parse failed").context("write config")?;
        if let Some(e) = &r.config.error {
            let first = e.lines().next().unwrap_or("parse error");
            writeln!(out, "  error: {first}").context("write config")?;
        }
    }
    writeln!(out).context("write newline")?;

    writeln!(out, "Platform:").context("write platform header")?;
    writeln!(out, "  environment: {}", r.platform.environment).context("write platform")?;
    writeln!(out, "  base_url:    {}", r.platform.base_url).context("write platform")?;
    writeln!(out, "  timeout:     {}s", r.platform.timeout_seconds).context("write platform")?;
    writeln!(out).context("write newline")?;

    writeln!(out, "API key:").context("write api key header")?;
    writeln!(out, "  set: {}", r.api_key.set).context("write api key")?;
    if let Some(pk) = &r.api_key.public_key {
        writeln!(out, "  public_key: {pk}").context("write api key")?;
    }
    if let Some(e) = &r.api_key.error {
        writeln!(out, "  error: {e}").context("write api key")?;
    }
    Ok(())
}

pub fn run(
    paths: &PortalPaths,
    env_override: Option<Environment>,
    as_json: bool,
) -> eyre::Result<()> {
    let report = collect(paths, env_override);
    let mut out = std::io::stdout().lock();
    if as_json {
        print_json(&mut out, &report)?;
    } else {
        print_human(&mut out, &report)?;
    }
    Ok(())
}
