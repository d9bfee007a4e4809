//! graphsync - content-addressed workspace sync for a remote code graph
//!
//! Mirrors a local source tree into a remote graph store, shipping only the
//! files whose content changed since the store last saw them, queries the
//! store about the synchronized code, and manages generated header comments.

mod display;
mod json_output;
mod progress;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use graphsync_config::{Config, ConfigBuilder, ConfigLoader, LoggingConfig};
use graphsync_remote::{ClientConfig, HttpHeaderGenerator, HttpRemoteStore};
use graphsync_sync::{
    workspace_id, HeaderDocumenter, HeaderScope, ProgressReporter, SyncEngine, SyncOptions,
    SyncRequest,
};
use graphsync_types::{HeaderGenerator, RelativePath};
use json_output::SyncResultJson;
use std::path::{Path, PathBuf};
use tracing::info;

/// graphsync - content-addressed workspace sync for a remote code graph
#[derive(Parser)]
#[command(
    name = "graphsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Content-addressed workspace sync for a remote code graph",
    long_about = "graphsync mirrors a local source tree into a remote graph store.\n\
                  Files are compared by SHA-256 against the store's manifest and only\n\
                  added, modified or deleted paths are submitted."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Remote store base URL (overrides remote.base_url)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a workspace with the remote store
    Sync {
        /// Workspace root
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Dry run - show what would be submitted
        #[arg(long)]
        dry_run: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask a question about a synchronized workspace
    Ask {
        /// Natural-language question
        question: String,
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Show the manifest the remote store holds for a workspace
    Manifest {
        /// Workspace root
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Print the stored content of a file
    Cat {
        /// Path relative to the workspace root
        path: String,
        /// Workspace root
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print the workspace id of a root
    Id {
        /// Workspace root
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Show remote graph node counts
    Status,
    /// Add or remove generated header comments
    Header {
        #[command(subcommand)]
        action: HeaderAction,
    },
    /// Check that the header-comment service is up
    Health,
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write the configuration to a file instead (format from the extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HeaderAction {
    /// Generate headers for code files that lack one
    Generate(HeaderArgs),
    /// Remove generated headers
    Clear(HeaderArgs),
}

#[derive(clap::Args)]
struct HeaderArgs {
    /// A code file, or a directory of code files
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Also process subdirectories, minus the excluded ones
    #[arg(short, long)]
    recursive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.server.as_deref())?;

    // Initialize logging
    init_logging(cli.debug, cli.quiet, cli.verbose, &config.logging)?;

    info!("graphsync v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute command
    match cli.command {
        Commands::Sync {
            root,
            dry_run,
            json,
        } => {
            sync_command(&config, &root, dry_run, json, cli.quiet, cli.verbose).await?;
        }
        Commands::Ask { question, root } => {
            let answer = engine(&config)?.ask(&root, &question).await?;
            println!("{}", answer);
        }
        Commands::Manifest { root } => {
            let manifest = engine(&config)?.remote_manifest(&root).await?;
            display::display_manifest(&manifest);
        }
        Commands::Cat { path, root } => {
            let content = engine(&config)?
                .fetch_file(&root, &RelativePath::new(path))
                .await?;
            print!("{}", content);
        }
        Commands::Id { root } => {
            println!("{}", workspace_id(&root)?);
        }
        Commands::Status => {
            let status = engine(&config)?.status().await?;
            display::display_status(&status);
        }
        Commands::Header { action } => {
            header_command(&config, action, cli.quiet, cli.verbose).await?;
        }
        Commands::Health => {
            let health = header_generator(&config)?.health().await?;
            display::display_health(&health);
            if !health.is_healthy() {
                bail!("Header service reported status '{}'", health.status);
            }
        }
        Commands::Config { default, output } => {
            config_command(&config, default, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, server: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };

    if let Some(server) = server {
        config.remote.base_url = server.to_string();
        ConfigBuilder::validate(&config).context("Invalid --server URL")?;
    }

    Ok(config)
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

fn engine(config: &Config) -> Result<SyncEngine<HttpRemoteStore>> {
    let store = HttpRemoteStore::with_config(ClientConfig::from(config.remote.clone()))?;
    Ok(SyncEngine::with_config(store, &config.scan))
}

fn header_generator(config: &Config) -> Result<HttpHeaderGenerator> {
    let client_config = ClientConfig::for_header_service(config.remote.clone(), &config.header);
    Ok(HttpHeaderGenerator::with_config(client_config)?)
}

async fn header_command(
    config: &Config,
    action: HeaderAction,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    let documenter =
        HeaderDocumenter::with_config(header_generator(config)?, &config.header, &config.scan);

    let (verb, report) = match action {
        HeaderAction::Generate(args) => {
            let scope = HeaderScope::for_path(&args.path, args.recursive);
            ("generated", documenter.generate(&scope).await?)
        }
        HeaderAction::Clear(args) => {
            let scope = HeaderScope::for_path(&args.path, args.recursive);
            ("cleared", documenter.clear(&scope).await?)
        }
    };

    if !quiet {
        display::display_header_report(verb, &report, verbose);
    }
    if !report.is_success() {
        bail!("{} files could not be processed", report.failed.len());
    }
    Ok(())
}

async fn sync_command(
    config: &Config,
    root: &Path,
    dry_run: bool,
    json: bool,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    info!("Starting sync of {}", root.display());
    let show_progress = !quiet && !json;

    if show_progress {
        println!(
            "{} Synchronizing {} with {}",
            style("⟲").blue().bold(),
            style(root.display()).cyan(),
            style(&config.remote.base_url).cyan()
        );
    }

    let options = SyncOptions { dry_run };
    let request = SyncRequest::new(root).with_options(options);
    let mut reporter = ProgressReporter::new(request.request_id);
    let events = reporter.take_event_receiver();
    let spinner = match events {
        Some(events) if show_progress => Some(progress::spawn_spinner(events)),
        _ => None,
    };

    let result = engine(config)?
        .sync_with_progress(request, &reporter)
        .await;
    drop(reporter);
    if let Some(spinner) = spinner {
        let _ = spinner.await;
    }
    let result = result?;

    if json {
        let output = SyncResultJson::new(root, &result);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !quiet {
        display::display_sync_result(&result, verbose);
    }

    info!("Sync completed");
    Ok(())
}

fn config_command(config: &Config, default: bool, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        let selected = if default { Config::default() } else { config.clone() };
        ConfigLoader::save_to_file(&selected, path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        println!(
            "{} Configuration written to {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        print!("{}", ConfigLoader::render(&Config::default(), None)?);
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        match ConfigLoader::config_exists() {
            Some(path) => println!("# loaded from {}", path.display()),
            None => println!("# no configuration file found, using defaults"),
        }
        print!("{}", ConfigLoader::render(config, None)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["graphsync", "sync"], ".", false, false)]
    #[case(&["graphsync", "sync", "/work/repo", "--dry-run"], "/work/repo", true, false)]
    #[case(&["graphsync", "--quiet", "sync", "repo", "--json"], "repo", false, true)]
    fn test_parse_sync(
        #[case] args: &[&str],
        #[case] expected_root: &str,
        #[case] expected_dry_run: bool,
        #[case] expected_json: bool,
    ) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Sync {
                root,
                dry_run,
                json,
            } => {
                assert_eq!(root, PathBuf::from(expected_root));
                assert_eq!(dry_run, expected_dry_run);
                assert_eq!(json, expected_json);
            }
            _ => panic!("expected sync command"),
        }
    }

    #[test]
    fn test_parse_ask_with_global_server() {
        let cli = Cli::try_parse_from([
            "graphsync",
            "ask",
            "where is main defined?",
            "--root",
            "/work/repo",
            "--server",
            "http://graph:8000/api/graph",
        ])
        .unwrap();

        assert_eq!(cli.server.as_deref(), Some("http://graph:8000/api/graph"));
        match cli.command {
            Commands::Ask { question, root } => {
                assert_eq!(question, "where is main defined?");
                assert_eq!(root, PathBuf::from("/work/repo"));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[rstest]
    #[case(&["graphsync", "header", "generate"], ".", false, true)]
    #[case(&["graphsync", "header", "generate", "src", "-r"], "src", true, true)]
    #[case(&["graphsync", "header", "clear", "main.py"], "main.py", false, false)]
    fn test_parse_header(
        #[case] args: &[&str],
        #[case] expected_path: &str,
        #[case] expected_recursive: bool,
        #[case] expected_generate: bool,
    ) {
        let cli = Cli::try_parse_from(args).unwrap();
        let Commands::Header { action } = cli.command else {
            panic!("expected header command");
        };
        let (args, generate) = match action {
            HeaderAction::Generate(args) => (args, true),
            HeaderAction::Clear(args) => (args, false),
        };
        assert_eq!(args.path, PathBuf::from(expected_path));
        assert_eq!(args.recursive, expected_recursive);
        assert_eq!(generate, expected_generate);
    }

    #[test]
    fn test_header_generator_uses_header_service_url() {
        let mut config = Config::default();
        config.header.base_url = "http://docs:8000".to_string();
        let generator = header_generator(&config).unwrap();
        assert_eq!(generator.config().base_url, "http://docs:8000");
        assert_eq!(generator.config().request_timeout, config.remote.request_timeout());
    }

    #[test]
    fn test_config_output_writes_loadable_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("graphsync.toml");
        let mut config = Config::default();
        config.remote.base_url = "http://graph:9000/api/graph".to_string();

        config_command(&config, false, Some(&path)).unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded.remote.base_url, "http://graph:9000/api/graph");
        assert_eq!(loaded.header, config.header);
    }

    #[test]
    fn test_server_override_is_validated() {
        assert!(load_config(None, Some("not-a-url")).is_err());
        let config = load_config(None, Some("https://graph.example.com/api/graph")).unwrap();
        assert_eq!(config.remote.base_url, "https://graph.example.com/api/graph");
    }
}
