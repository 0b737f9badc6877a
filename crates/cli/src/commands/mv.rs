//! mv command - Move a file within one filesystem

use clap::Args;
use mfs_core::Config;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use crate::target::parse_target;

/// Move a file within one filesystem
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source (<fs>:<path>)
    pub source: String,

    /// Destination on the same filesystem (<fs>:<path>)
    pub target: String,
}

/// Execute the mv command
pub async fn execute(args: MvArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let destination = match parse_target(&args.target) {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let (fs, source) = match open_target(&args.source, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    if source.fs != destination.fs {
        formatter.error(&format!(
            "Cannot move across filesystems ('{}' to '{}')",
            source.fs, destination.fs
        ));
        return ExitCode::UsageError;
    }

    if let Err(e) = fs.atomic_move(&source.path, &destination.path).await {
        return report(&formatter, &format!("Failed to move '{source}'"), &e);
    }

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "source": source.to_string(),
            "target": destination.to_string(),
        }));
    } else {
        formatter.success(&format!("Moved {source} to {destination}"));
    }

    ExitCode::Success
}
