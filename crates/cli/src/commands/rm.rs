//! rm command - Delete a file, empty directory or bucket

use clap::Args;
use mfs_core::Config;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Delete a file, empty directory or bucket
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Path to delete (<fs>:<path>)
    pub target: String,

    /// Succeed when the path does not exist
    #[arg(short, long)]
    pub force: bool,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    match fs.delete(&target.path).await {
        Ok(()) => {}
        Err(e) if args.force && e.is_not_found() => {
            tracing::debug!(path = %target, "nothing to delete");
        }
        Err(e) => return report(&formatter, &format!("Failed to delete '{target}'"), &e),
    }

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "deleted": target.to_string() }));
    } else {
        formatter.success(&format!("Deleted {target}"));
    }

    ExitCode::Success
}
