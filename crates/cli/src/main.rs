//! mfs - one command line for resources, archives, local files and S3
//!
//! Every command addresses its input as `<fs>:<path>`, where `<fs>` is
//! `res`, `cp`, `local` or a configured alias.

use anyhow::Context;
use clap::Parser;
use mfs_core::{Config, ConfigManager};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;
mod target;

use commands::Commands;
use exit_code::ExitCode;
use output::{Formatter, OutputConfig};

/// Environment variable holding the log filter
const LOG_ENV: &str = "MFS_LOG";

#[derive(Parser, Debug)]
#[command(name = "mfs", version, about, long_about = None)]
struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = run(cli).await;
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli) -> ExitCode {
    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            let formatter = Formatter::new(OutputConfig {
                json: cli.json,
                no_color: cli.no_color,
                quiet: cli.quiet,
            });
            formatter.error(&format!("{e:#}"));
            return ExitCode::GeneralError;
        }
    };

    let output_config = output_config(&cli, &config);
    commands::execute(cli.command, &config, output_config).await
}

fn load_config() -> anyhow::Result<Config> {
    let manager = ConfigManager::new().context("failed to locate configuration")?;
    let config = manager
        .load()
        .with_context(|| format!("failed to load {}", manager.config_path().display()))?;
    tracing::debug!(path = %manager.config_path().display(), "loaded configuration");
    Ok(config)
}

/// Flags win over the configured defaults
fn output_config(cli: &Cli, config: &Config) -> OutputConfig {
    let color_off = match config.defaults.color.as_str() {
        "never" => true,
        "always" => false,
        _ => !console::colors_enabled(),
    };
    OutputConfig {
        json: cli.json || config.defaults.output == "json",
        no_color: cli.no_color || color_off,
        quiet: cli.quiet,
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["mfs", "ls", "cp:/lib", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(!cli.debug);
        match cli.command {
            Commands::Ls(args) => {
                assert_eq!(args.target, "cp:/lib");
                assert!(!args.long);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_put_and_alias() {
        let cli = Cli::try_parse_from(["mfs", "put", "-", "local:/tmp/x", "--append"]).unwrap();
        match cli.command {
            Commands::Put(args) => {
                assert_eq!(args.source, "-");
                assert!(args.append);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "mfs",
            "alias",
            "set",
            "minio",
            "http://localhost:9000",
            "ak",
            "sk",
            "--bucket-lookup",
            "path",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Alias(_)));
    }

    #[test]
    fn test_cli_rejects_missing_target() {
        assert!(Cli::try_parse_from(["mfs", "cat"]).is_err());
        assert!(Cli::try_parse_from(["mfs", "mv", "local:/a"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_output_config_defaults() {
        let cli = Cli::try_parse_from(["mfs", "stat", "local:/"]).unwrap();
        let mut config = Config::default();
        config.defaults.output = "json".to_string();
        config.defaults.color = "never".to_string();

        let output = output_config(&cli, &config);
        assert!(output.json);
        assert!(output.no_color);
        assert!(!output.quiet);
    }
}
