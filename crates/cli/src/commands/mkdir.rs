//! mkdir command - Create a directory or bucket

use clap::Args;
use mfs_core::Config;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a directory, or a bucket on an object store
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Directory to create (<fs>:<path>)
    pub target: String,
}

/// Execute the mkdir command
pub async fn execute(args: MkdirArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    if let Err(e) = fs.create_directory(&target.path).await {
        return report(&formatter, &format!("Failed to create '{target}'"), &e);
    }

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "created": target.to_string() }));
    } else {
        formatter.success(&format!("Created {target}"));
    }

    ExitCode::Success
}
