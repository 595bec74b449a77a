//! TinyBean CLI - deployment descriptor inspector
//!
//! # Commands
//!
//! - `tinybean inspect <ejb-jar.xml> [--vendor <jboss.xml>]`: parses the
//!   descriptors and prints where every home would be bound. Nothing is
//!   instantiated.
//! - `tinybean config`: prints the resolved configuration as TOML.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`TINYBEAN_*`)
//! 3. Project config (`.tinybean/config.toml` under `-C`, default: cwd)
//! 4. Global config (`~/.tinybean/config.toml`)
//! 5. Default values (lowest priority)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tinybean_descriptor::{parse_ejb_jar, Deployment};
use tinybean_naming::{ConventionResolver, NameResolver, VendorResolver};
use tinybean_runtime::config::{ConfigLoader, ConfigResolver, ContainerConfig};
use tinybean_runtime::plan_bindings;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// TinyBean CLI - session component container tooling
#[derive(Parser, Debug)]
#[command(name = "tinybean")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the naming plan for a deployment descriptor
    Inspect {
        /// Standard deployment descriptor (ejb-jar.xml)
        descriptor: PathBuf,

        /// Vendor naming descriptor (jboss.xml)
        #[arg(long, value_name = "PATH")]
        vendor: Option<PathBuf>,

        /// Scope prefix for conventional names (also: TINYBEAN_SCOPE_PREFIX)
        #[arg(long, value_name = "PREFIX")]
        scope_prefix: Option<String>,

        /// Print bindings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration
    Config,
}

/// CLI-based configuration resolver.
///
/// Applies CLI argument overrides on top of what [`ConfigLoader`]
/// produced from files and environment.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    scope_prefix: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        });
        let scope_prefix = match &args.command {
            Command::Inspect { scope_prefix, .. } => scope_prefix.clone(),
            Command::Config => None,
        };

        Self {
            project_root,
            debug: args.debug,
            scope_prefix,
        }
    }

    fn load(&self) -> Result<ContainerConfig> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()
            .context("Config error")?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut ContainerConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(ref prefix) = self.scope_prefix {
            config.naming.scope_prefix.clone_from(prefix);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.load()?;
    init_tracing(log_filter(&config, args.verbose));
    info!(
        path = %resolver.project_root.display(),
        debug = config.debug,
        "Project root"
    );

    match args.command {
        Command::Inspect {
            descriptor,
            vendor,
            json,
            ..
        } => inspect(&config, &descriptor, vendor.as_deref(), json),
        Command::Config => {
            print!("{}", config.to_toml().context("cannot render config")?);
            Ok(())
        }
    }
}

/// Terminal filter: debug (flag, `TINYBEAN_DEBUG` or config file) >
/// --verbose > `RUST_LOG` > default "warn".
fn log_filter(config: &ContainerConfig, verbose: bool) -> EnvFilter {
    if config.debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Logs go to stderr so stdout carries only the command's output.
fn init_tracing(filter: EnvFilter) {
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

/// Prints the bindings a deploy of `descriptor` would produce.
fn inspect(config: &ContainerConfig, descriptor: &Path, vendor: Option<&Path>, json: bool) -> Result<()> {
    let deployment = read_deployment(descriptor)?;
    let prefix = config.naming.scope_prefix.clone();
    let resolver: Box<dyn NameResolver> = match vendor {
        Some(path) => {
            let reader = open(path)?;
            let vendor = VendorResolver::from_descriptor(reader)
                .with_context(|| format!("invalid vendor descriptor {}", path.display()))?;
            debug!(overrides = vendor.overrides().len(), "vendor naming loaded");
            Box::new(vendor.with_scope_prefix(prefix))
        }
        None => Box::new(ConventionResolver::new(prefix)),
    };

    let plan = plan_bindings(&deployment, resolver.as_ref());
    info!(
        components = deployment.len(),
        bindings = plan.len(),
        "naming plan resolved"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        for binding in &plan {
            println!("{binding}");
        }
    }
    Ok(())
}

fn read_deployment(path: &Path) -> Result<Deployment> {
    parse_ejb_jar(open(path)?).with_context(|| format!("invalid descriptor {}", path.display()))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(BufReader::new(file))
}
