//! Centralised helpers for CLI output. Results go to stdout as JSON; human hints go to stderr.

use coboweb3::ErrorReport;
use eyre::Context as _;
use serde::Serialize;
use serde_json::json;
use std::io::Write as _;

/// Pretty-print `value` as one JSON document on stdout.
pub fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output")?;
    writeln!(std::io::stdout().lock(), "{s}").context("write output")?;
    Ok(())
}

/// `{"ok":false,"error":{"code","message"}}` on stdout, so scripts can branch on `code`.
pub fn print_error(report: &ErrorReport) -> eyre::Result<()> {
    print_json(&json!({
        "ok": false,
        "error": report,
    }))
}

/// Write a one-line hint to stderr (human-operator info only).
pub fn print_hint(s: &str) {
    let mut stderr = std::io::stderr().lock();
    if writeln!(stderr, "{s}").is_err() {
        return;
    }
    let _flush = stderr.flush();
}
