//! cat command - Write a file to stdout

use clap::Args;
use mfs_core::{Config, Error};
use tokio::io::AsyncWriteExt;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Write a file to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    /// File to print (<fs>:<path>)
    pub target: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let mut source = match fs.source(&target.path).await {
        Ok(s) => s,
        Err(e) => return report(&formatter, &format!("Failed to open '{target}'"), &e),
    };

    let mut stdout = tokio::io::stdout();
    let copied = tokio::io::copy(&mut source, &mut stdout).await;
    let flushed = stdout.flush().await;

    match copied.and(flushed) {
        Ok(()) => ExitCode::Success,
        Err(e) => report(&formatter, &format!("Failed to read '{target}'"), &Error::Io(e)),
    }
}
