//! Command definitions and dispatch

use std::sync::Arc;

use clap::Subcommand;
use mfs_core::{Config, Error, FileSystem};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use crate::target::{self, Target};

pub mod alias;
pub mod cat;
pub mod completions;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod realpath;
pub mod rm;
pub mod stat;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a directory
    Ls(ls::LsArgs),

    /// Write a file to stdout
    Cat(cat::CatArgs),

    /// Show metadata for a path
    Stat(stat::StatArgs),

    /// Write a local file or stdin to a target
    Put(put::PutArgs),

    /// Move a file within one filesystem
    Mv(mv::MvArgs),

    /// Delete a file, directory or bucket
    Rm(rm::RmArgs),

    /// Create a directory or bucket
    Mkdir(mkdir::MkdirArgs),

    /// Print the canonical form of a path
    Realpath(realpath::RealpathArgs),

    /// Manage object-store aliases
    #[command(subcommand)]
    Alias(alias::AliasCommands),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Run a parsed command
pub async fn execute(command: Commands, config: &Config, output_config: OutputConfig) -> ExitCode {
    match command {
        Commands::Ls(args) => ls::execute(args, config, output_config).await,
        Commands::Cat(args) => cat::execute(args, config, output_config).await,
        Commands::Stat(args) => stat::execute(args, config, output_config).await,
        Commands::Put(args) => put::execute(args, config, output_config).await,
        Commands::Mv(args) => mv::execute(args, config, output_config).await,
        Commands::Rm(args) => rm::execute(args, config, output_config).await,
        Commands::Mkdir(args) => mkdir::execute(args, config, output_config).await,
        Commands::Realpath(args) => realpath::execute(args, config, output_config).await,
        Commands::Alias(cmd) => alias::execute(cmd, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Parse a target and open its filesystem, reporting failures
pub(crate) async fn open_target(
    input: &str,
    config: &Config,
    formatter: &Formatter,
) -> Result<(Arc<dyn FileSystem>, Target), ExitCode> {
    let target = match target::parse_target(input) {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&e);
            return Err(ExitCode::UsageError);
        }
    };

    match target::open(&target.fs, config).await {
        Ok(fs) => Ok((fs, target)),
        Err(Error::AliasNotFound(name)) => {
            formatter.error(&format!("Alias '{name}' not found"));
            Err(ExitCode::NotFound)
        }
        Err(e) => Err(report(formatter, &format!("Failed to open '{}'", target.fs), &e)),
    }
}

/// Print an error with context and map it to an exit code
pub(crate) fn report(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}
