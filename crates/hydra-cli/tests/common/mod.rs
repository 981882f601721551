//! Shared helpers for `hydra` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::time::Duration;
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(10);

const HYDRA_VARS: &[&str] = &[
    "RUST_LOG",
    "HYDRA_DEBUG",
    "HYDRA_MAX_DISPATCH_DEPTH",
    "HYDRA_PROJECTS_DIR",
    "HYDRA_LOG_LEVEL",
];

/// A `hydra` command isolated from the caller's home and environment.
///
/// The returned guard owns the fake home and project root.
pub fn hydra_cmd() -> (assert_cmd::Command, TempDir) {
    let home = tempfile::tempdir().expect("temp home");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("hydra");
    cmd.timeout(TIMEOUT)
        .env("HOME", home.path())
        .arg("-C")
        .arg(home.path());
    for var in HYDRA_VARS {
        cmd.env_remove(var);
    }
    (cmd, home)
}
