use anyhow::{bail, Context, Result};
use std::env;
use std::process::Command;

/// Environment variable listing extra cargo features, separated by spaces.
pub const ENV_FEATURES: &str = "PEAKLETS_FEATURES";

/// Options derived from the host machine used to configure cargo commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub features: Vec<String>,
    pub example: String,
}

impl BuildConfig {
    /// Join features into a single string suitable for passing to cargo.
    pub fn features_arg(&self) -> Option<String> {
        if self.features.is_empty() {
            None
        } else {
            Some(self.features.join(" "))
        }
    }

    pub fn parallel(&self) -> bool {
        self.features.iter().any(|f| f == "parallel")
    }
}

/// Detect build configuration from the current machine.
pub fn detect_config() -> BuildConfig {
    let nproc = detect_nproc();
    let extra = env::var(ENV_FEATURES).unwrap_or_default();
    compute_config(nproc, &extra)
}

fn detect_nproc() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Compute a [`BuildConfig`] from supplied inputs. This is separated for testing.
pub fn compute_config(nproc: usize, extra: &str) -> BuildConfig {
    let mut features: Vec<String> = Vec::new();
    if nproc > 1 {
        features.push("parallel".into());
    }
    for feat in extra.split_whitespace() {
        if !features.iter().any(|f| f == feat) {
            features.push(feat.to_string());
        }
    }

    let example = if features.iter().any(|f| f == "parallel") {
        "parallel_batch".to_string()
    } else {
        "basic_usage".to_string()
    };

    BuildConfig { features, example }
}

fn with_features(mut cmd: Command, cfg: &BuildConfig) -> Command {
    if let Some(f) = cfg.features_arg() {
        cmd.arg("--features").arg(f);
    }
    cmd
}

pub fn build_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["build", "--workspace"]);
    with_features(cmd, cfg)
}

/// Library tests, with the property suites enabled.
pub fn test_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["test", "-p", "peaklets"]);
    let mut cfg = cfg.clone();
    if !cfg.features.iter().any(|f| f == "internal-tests") {
        cfg.features.push("internal-tests".into());
    }
    with_features(cmd, &cfg)
}

pub fn clippy_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["clippy", "--workspace", "--all-targets", "--all-features"]);
    cmd
}

pub fn fmt_command() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["fmt", "--all"]);
    cmd
}

pub fn demo_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--example", &cfg.example, "--release"]);
    with_features(cmd, cfg)
}

pub fn bench_libs_command(cfg: &BuildConfig) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["bench", "--manifest-path", "peaklets-bench/Cargo.toml"]);
    if cfg.parallel() {
        cmd.args(["--features", "parallel"]);
    }
    cmd
}

/// Run the sanity checker on a file, or on a generated signal of
/// `synthetic` samples when no file is given.
pub fn sanity_command(input: Option<&str>, synthetic: Option<usize>, png: Option<&str>) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-r", "-p", "sanity-check", "--"]);
    if let Some(input) = input {
        cmd.arg(input);
    }
    if let Some(len) = synthetic {
        cmd.arg("--synthetic").arg(len.to_string());
    }
    if let Some(png) = png {
        cmd.arg("--png").arg(png);
    }
    cmd
}

/// Run `cmd` to completion, failing on a non-zero exit status.
pub fn run(mut cmd: Command) -> Result<()> {
    let shown = format!("{:?}", cmd);
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {shown}"))?;
    if !status.success() {
        bail!("{shown} exited with {status}");
    }
    Ok(())
}
