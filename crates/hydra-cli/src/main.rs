//! hydra: project and workspace engine on the command line
//!
//! Every command builds one engine, turns its input into intents and
//! prints one JSON response per intent on stdout. Logs go to stderr.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`HYDRA_*`)
//! 3. Project config (`.hydra/config.toml` under `--project`)
//! 4. Global config (`~/.hydra/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Logging
//!
//! `--debug` > `--log-level` > `RUST_LOG` > `logging.level` > `warn`.

mod app;
mod git;
mod local;
mod response;

use anyhow::{Context, Result};
use app::HydraApp;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use hydra_runtime::config::{ConfigLoader, ConfigResolver, HydraConfig};
use hydra_types::Intent;
use response::{ErrorPayload, Response};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "hydra")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Project root for `.hydra/config.toml` (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Log level (also: HYDRA_LOG_LEVEL)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Maximum nested dispatch depth (also: HYDRA_MAX_DISPATCH_DEPTH)
    #[arg(
        long,
        value_name = "N",
        global = true,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    max_depth: Option<usize>,

    /// Where remote projects are cloned (also: HYDRA_PROJECTS_DIR)
    #[arg(long, value_name = "DIR", global = true)]
    projects_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch one intent and print its response
    Dispatch {
        /// Intent type, e.g. `project:open`
        intent_type: String,
        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,
    },
    /// Read one `{"type", "payload"}` intent per line from stdin
    Session,
    /// List the intent types the engine routes
    Intents,
    /// Print the resolved configuration as TOML
    Config,
}

/// CLI flags as the highest-priority config layer.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    log_level: Option<String>,
    max_depth: Option<usize>,
    projects_dir: Option<PathBuf>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });
        Self {
            project_root,
            debug: args.debug,
            log_level: args.log_level.clone(),
            max_depth: args.max_depth,
            projects_dir: args.projects_dir.clone(),
        }
    }

    fn resolve(&self) -> Result<HydraConfig> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()
            .context("config error")?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut HydraConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = Some(level.clone());
        }
        if let Some(depth) = self.max_depth {
            config.engine.max_dispatch_depth = depth;
        }
        if let Some(ref dir) = self.projects_dir {
            config.workspace.projects_dir = Some(dir.clone());
        }
    }
}

/// Terminal filter: debug > explicit `--log-level` > `RUST_LOG` > config > warn.
fn log_filter(args: &Args, config: &HydraConfig) -> EnvFilter {
    if args.debug || config.debug {
        return EnvFilter::new("debug");
    }
    if let Some(ref level) = args.log_level {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.logging.level.as_deref().unwrap_or("warn"))
    })
}

fn init_tracing(filter: EnvFilter) {
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.resolve()?;

    init_tracing(log_filter(&args, &config));
    tracing::debug!(project = %resolver.project_root.display(), "config resolved");

    match args.command {
        Command::Config => {
            print!("{}", config.to_toml()?);
        }
        Command::Intents => {
            let app = HydraApp::new(&config)?;
            for intent_type in app.dispatcher().registered_types() {
                println!("{intent_type}");
            }
        }
        Command::Dispatch {
            intent_type,
            payload,
        } => {
            let app = HydraApp::new(&config)?;
            let response = match serde_json::from_str(&payload) {
                Ok(payload) => app.handle(Intent::new(intent_type, payload)).await,
                Err(e) => Response::Error {
                    error: ErrorPayload::invalid_request(format!("payload is not JSON: {e}")),
                },
            };
            println!("{}", response.to_line());
            if response.is_error() {
                std::process::exit(1);
            }
        }
        Command::Session => {
            let app = HydraApp::new(&config)?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await.context("cannot read stdin")? {
                if line.trim().is_empty() {
                    continue;
                }
                println!("{}", app.handle_line(&line).await.to_line());
            }
            tracing::debug!(
                open_projects = app.app_state().projects().len(),
                "session ended"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["hydra"];
        argv.extend_from_slice(extra);
        argv.push("config");
        Args::try_parse_from(argv).expect("parses")
    }

    #[test]
    fn flags_override_loaded_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = args(&[
            "--debug",
            "--max-depth",
            "3",
            "--log-level",
            "info",
            "--projects-dir",
            "/srv/projects",
        ]);
        let resolver = CliConfigResolver {
            project_root: dir.path().to_path_buf(),
            ..CliConfigResolver::from_args(&args)
        };

        let mut config = HydraConfig::default();
        resolver.apply(&mut config);

        assert!(config.debug);
        assert_eq!(config.engine.max_dispatch_depth, 3);
        assert_eq!(config.logging.level.as_deref(), Some("info"));
        assert_eq!(
            config.workspace.projects_dir,
            Some(PathBuf::from("/srv/projects"))
        );
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let resolver = CliConfigResolver::from_args(&args(&[]));
        let mut config = HydraConfig::default();
        resolver.apply(&mut config);
        assert_eq!(config, HydraConfig::default());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let res = Args::try_parse_from(["hydra", "--max-depth", "0", "intents"]);
        assert!(res.is_err());
    }

    #[test]
    fn dispatch_payload_defaults_to_empty_object() {
        let args = Args::try_parse_from(["hydra", "dispatch", "ui:set-mode"]).expect("parses");
        match args.command {
            Command::Dispatch { payload, .. } => assert_eq!(payload, "{}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
