use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::backend::{open_backend, PackageSource};
use crate::config::resolve::load_resolve_config;
use crate::config::settings::{parse_backend_choice, parse_output_format, parse_repo_mode};
use crate::config::{ConfigError, OutputFormat, ResolveConfig, SettingsFile, TransportSettings};
use crate::core::package::PackageRecord;
use crate::error::{ApkgraphError, Result};
use crate::graph::{build_graph_from, viz};
use crate::util::{logging, output};

#[derive(Parser, Debug)]
#[command(name = "apkgraph")]
#[command(about = "Alpine package dependency graph resolver", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a package and print its transitive dependency graph
    Resolve(ResolveArgs),
    /// Print the effective configuration
    Config(SourceArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    #[arg(short = 'p', long = "package")]
    pub package: Option<String>,
    #[arg(long = "version")]
    pub package_version: Option<String>,
    #[arg(short = 'r', long = "repo")]
    pub repo: Option<String>,
    #[arg(short = 'm', long)]
    pub mode: Option<String>,
    #[arg(long)]
    pub backend: Option<String>,
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(short, long)]
    pub format: Option<String>,
    #[arg(long)]
    pub ascii: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

impl SourceArgs {
    fn to_settings(&self) -> std::result::Result<SettingsFile, ConfigError> {
        let repo_mode = self
            .mode
            .as_deref()
            .map(|mode| {
                parse_repo_mode(mode).ok_or_else(|| ConfigError::Invalid {
                    field: "repo_mode",
                    value: mode.to_string(),
                })
            })
            .transpose()?;
        let backend = self
            .backend
            .as_deref()
            .map(|backend| {
                parse_backend_choice(backend).ok_or_else(|| ConfigError::Invalid {
                    field: "backend",
                    value: backend.to_string(),
                })
            })
            .transpose()?;
        let transport = self.timeout.map(|secs| TransportSettings {
            timeout_secs: Some(secs),
            ..TransportSettings::default()
        });

        Ok(SettingsFile {
            package_name: self.package.clone(),
            repository_url: self.repo.clone(),
            repo_mode,
            package_version: self.package_version.clone(),
            backend,
            transport,
            ..SettingsFile::default()
        })
    }
}

pub fn run() {
    let cli = Cli::parse();
    let color = !cli.no_color && console::colors_enabled_stderr();
    if cli.no_color {
        output::set_colors(false);
    }
    logging::init_logging(cli.verbose, cli.quiet, color);

    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Resolve(args) => handle_resolve(args, cli.config),
        Commands::Config(args) => handle_config(args, cli.config),
        Commands::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "apkgraph",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

fn load_config(config_path: Option<PathBuf>, overrides: SettingsFile) -> Result<ResolveConfig> {
    let cwd = std::env::current_dir()?;
    Ok(load_resolve_config(cwd, config_path, overrides)?)
}

fn handle_config(args: SourceArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, args.to_settings()?)?;
    for (param, value) in config.entries() {
        println!("{} = {}", param, value);
    }
    Ok(())
}

fn handle_resolve(args: ResolveArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut overrides = args.source.to_settings()?;
    if let Some(format) = args.format.as_deref() {
        let parsed = parse_output_format(format).ok_or_else(|| ConfigError::Invalid {
            field: "format",
            value: format.to_string(),
        })?;
        overrides.format = Some(parsed);
    }
    if args.ascii {
        overrides.ascii_output = Some(true);
    }
    let config = load_config(config_path, overrides)?;

    let mut backend = open_backend(&config)?;
    let root = resolve_root(backend.as_mut(), &config)?;
    print_direct_dependencies(&root);

    let resolution = build_graph_from(backend.as_mut(), &root)?;

    match config.format {
        OutputFormat::Json => {
            let json = viz::render_json(&root, &resolution)
                .map_err(|err| ApkgraphError::Other(anyhow::Error::new(err)))?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Dot => {
            print!("{}", viz::render_dot(&resolution.graph));
            return Ok(());
        }
        OutputFormat::Tree => {
            print!(
                "{}",
                viz::render_tree(&root.name, &resolution.graph, config.ascii_output)
            );
        }
        OutputFormat::Flat => {
            print!("{}", viz::render_flat(&root.name, &resolution.graph));
        }
    }

    if !resolution.cycles.is_empty() {
        println!();
        println!("cycles:");
        print!("{}", viz::render_cycles(&resolution.cycles));
    }
    output::info(&format!(
        "{} packages visited, {} cycles",
        resolution.visited.len(),
        resolution.cycles.len()
    ));
    Ok(())
}

fn resolve_root(source: &mut dyn PackageSource, config: &ResolveConfig) -> Result<PackageRecord> {
    match config.package_version.as_deref() {
        Some(version) => output::heading(&format!(
            "resolving '{}' version {} via {} backend",
            config.package_name,
            version,
            source.kind()
        )),
        None => output::heading(&format!(
            "resolving '{}' (any version) via {} backend",
            config.package_name,
            source.kind()
        )),
    }

    match source.lookup(&config.package_name, config.package_version.as_deref()) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(ApkgraphError::Other(anyhow::anyhow!(
            "package '{}' not found in repository",
            config.package_name
        ))),
        Err(err) => {
            if let ApkgraphError::VersionNotFound {
                requested,
                available,
                ..
            } = &err
            {
                output::warn(&format!(
                    "version {} not found, available versions:",
                    requested
                ));
                for version in available {
                    output::warn(&format!("  - {}", version));
                }
            }
            Err(err)
        }
    }
}

fn print_direct_dependencies(root: &PackageRecord) {
    output::heading(&format!(
        "{}-{} depends on:",
        root.name,
        root.version_or_unknown()
    ));
    let dependencies = root.dependencies();
    if dependencies.is_empty() {
        output::info("  (no dependencies)");
    }
    for dependency in dependencies {
        output::info(&format!("  - {}", dependency));
    }
}
