//! Shared E2E helpers for `tinybean` binary tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variables read by the config loader.
const CONFIG_VARS: &[&str] = &[
    "TINYBEAN_DEBUG",
    "TINYBEAN_SCOPE_PREFIX",
    "TINYBEAN_POOL_MAX",
    "TINYBEAN_POOL_OVERFLOW",
    "TINYBEAN_POOL_TIMEOUT_MS",
    "RUST_LOG",
];

/// Build a Command isolated from the caller's home and environment.
///
/// Returns (command, _guard) — keep the guard alive for the test's duration.
pub fn tinybean_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let home = tempfile::tempdir().expect("create temp home");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("tinybean");
    cmd.timeout(TIMEOUT);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path());
    cmd.args(["-C", home.path().to_str().expect("valid utf8")]);
    (cmd, home)
}

/// Path to a file of the cart demo.
pub fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/cart")
        .join(file)
}
