use std::process::Command;

use eyre::Context as _;

const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
const PUBLIC_HEX: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

fn coboweb3(cfg_dir: &tempfile::TempDir, data_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("coboweb3"));
    cmd.env("COBOWEB3_CONFIG_DIR", cfg_dir.path())
        .env("COBOWEB3_DATA_DIR", data_dir.path())
        .env_remove("COBOWEB3_API_PRIVATE_KEY")
        .env_remove("COBOWEB3_ENV")
        .env_remove("COBOWEB3_BASE_URL");
    cmd
}

#[test]
fn doctor_json_runs_and_returns_valid_json() -> eyre::Result<()> {
    let cfg_dir = tempfile::tempdir()?;
    let data_dir = tempfile::tempdir()?;

    let out = coboweb3(&cfg_dir, &data_dir)
        .args(["doctor", "--json"])
        .output()
        .context("run coboweb3 doctor --json")?;

    assert!(
        out.status.success(),
        "doctor exited non-zero: status={:?}, stderr={}",
        out.status.code(),
        String::from_utf8_lossy(&out.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).context("parse doctor json")?;
    assert_eq!(v.get("ok").and_then(serde_json::Value::as_bool), Some(true));
    assert!(v.get("version").and_then(|x| x.as_str()).is_some());
    assert!(v.get("paths").and_then(|x| x.as_object()).is_some());
    assert_eq!(
        v.pointer("/platform/environment").and_then(|x| x.as_str()),
        Some("dev")
    );
    assert_eq!(
        v.pointer("/api_key/set").and_then(serde_json::Value::as_bool),
        Some(false)
    );
    Ok(())
}

#[test]
fn doctor_reports_derived_key_and_env_override() -> eyre::Result<()> {
    let cfg_dir = tempfile::tempdir()?;
    let data_dir = tempfile::tempdir()?;
    std::fs::write(
        cfg_dir.path().join("config.toml"),
        "environment = \"prod\"\n",
    )?;

    let out = coboweb3(&cfg_dir, &data_dir)
        .env("COBOWEB3_API_PRIVATE_KEY", SEED_HEX)
        .args(["--env", "sandbox", "doctor", "--json"])
        .output()
        .context("run coboweb3 doctor")?;
    assert!(out.status.success(), "doctor failed: {out:?}");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(
        v.pointer("/config/environment").and_then(|x| x.as_str()),
        Some("prod")
    );
    assert_eq!(
        v.pointer("/platform/base_url").and_then(|x| x.as_str()),
        Some("https://api.sandbox.cobo.com/v2")
    );
    assert_eq!(
        v.pointer("/api_key/public_key").and_then(|x| x.as_str()),
        Some(PUBLIC_HEX)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(!stdout.contains(SEED_HEX), "doctor leaked the secret");
    Ok(())
}

#[test]
fn doctor_treats_blank_api_key_as_unset() -> eyre::Result<()> {
    let cfg_dir = tempfile::tempdir()?;
    let data_dir = tempfile::tempdir()?;

    let out = coboweb3(&cfg_dir, &data_dir)
        .env("COBOWEB3_API_PRIVATE_KEY", "  ")
        .args(["doctor", "--json"])
        .output()
        .context("run coboweb3 doctor")?;
    assert!(out.status.success(), "doctor failed: {out:?}");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(
        v.pointer("/api_key/set").and_then(serde_json::Value::as_bool),
        Some(false)
    );
    assert_eq!(
        v.pointer("/env/COBOWEB3_API_PRIVATE_KEY_set")
            .and_then(serde_json::Value::as_bool),
        Some(false)
    );
    Ok(())
}

#[test]
fn registry_lists_chain_table_offline() -> eyre::Result<()> {
    let cfg_dir = tempfile::tempdir()?;
    let data_dir = tempfile::tempdir()?;

    let out = coboweb3(&cfg_dir, &data_dir)
        .arg("registry")
        .output()
        .context("run coboweb3 registry")?;
    assert!(out.status.success(), "registry failed: {out:?}");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    let rows = v.as_array().ok_or_else(|| eyre::eyre!("expected array"))?;
    assert!(rows.iter().any(|r| {
        r.get("chain_id").and_then(serde_json::Value::as_u64) == Some(42161)
            && r.get("token").and_then(|t| t.as_str()) == Some("ARBITRUM_ETH")
    }));
    Ok(())
}

#[test]
fn platform_commands_require_api_key() -> eyre::Result<()> {
    let cfg_dir = tempfile::tempdir()?;
    let data_dir = tempfile::tempdir()?;

    assert_cmd::Command::from_std(coboweb3(&cfg_dir, &data_dir))
        .arg("wallets")
        .assert()
        .failure()
        .stderr(predicates::str::contains("COBOWEB3_API_PRIVATE_KEY"));
    Ok(())
}
