//! realpath command - Print the canonical form of a path
//!
//! For resource filesystems this applies the allow-list, so it doubles as a
//! scope check.

use clap::Args;
use mfs_core::Config;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Print the canonical form of a path
#[derive(Args, Debug)]
pub struct RealpathArgs {
    /// Path to canonicalize (<fs>:<path>)
    pub target: String,

    /// Print the host filesystem path instead
    #[arg(short, long)]
    pub system: bool,
}

/// Execute the realpath command
pub async fn execute(args: RealpathArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let resolved = if args.system {
        match fs.to_system_path(&target.path).await {
            Ok(Some(host)) => host.display().to_string(),
            Ok(None) => {
                formatter.error(&format!("'{target}' has no host filesystem path"));
                return ExitCode::Unsupported;
            }
            Err(e) => return report(&formatter, &format!("Failed to resolve '{target}'"), &e),
        }
    } else {
        match fs.canonicalize(&target.path).await {
            Ok(path) => format!("{}:{path}", target.fs),
            Err(e) => {
                return report(&formatter, &format!("Failed to canonicalize '{target}'"), &e);
            }
        }
    };

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "target": target.to_string(),
            "resolved": resolved,
        }));
    } else {
        formatter.println(&resolved);
    }

    ExitCode::Success
}
