//! ls command - List a directory
//!
//! Entries come back sorted from the filesystem. With `--long`, metadata is
//! fetched for each entry.

use clap::Args;
use mfs_core::{Config, FileMetadata, VPath};
use serde::Serialize;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

/// List a directory
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Directory to list (<fs>:<path>)
    pub target: String,

    /// Show kind, size and modification time
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct LsOutput {
    path: String,
    entries: Vec<EntryOutput>,
}

#[derive(Debug, Serialize)]
struct EntryOutput {
    path: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_dir: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
}

impl EntryOutput {
    fn new(path: &VPath, meta: Option<&FileMetadata>) -> Self {
        Self {
            path: path.to_string(),
            name: path.name().unwrap_or("/").to_string(),
            is_dir: meta.map(FileMetadata::is_dir),
            size_bytes: meta.and_then(|m| m.size),
            size_human: meta.and_then(|m| m.size).map(format_size),
            last_modified: meta.and_then(|m| m.modified).map(|t| t.to_string()),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let children = match fs.list(&target.path).await {
        Ok(c) => c,
        Err(e) => return report(&formatter, &format!("Failed to list '{target}'"), &e),
    };

    let mut entries = Vec::with_capacity(children.len());
    for child in &children {
        let meta = if args.long {
            match fs.metadata_or_none(child).await {
                Ok(m) => m,
                Err(e) => return report(&formatter, &format!("Failed to stat '{child}'"), &e),
            }
        } else {
            None
        };
        entries.push((child, meta));
    }

    if formatter.is_json() {
        let output = LsOutput {
            path: target.to_string(),
            entries: entries
                .iter()
                .map(|(path, meta)| EntryOutput::new(path, meta.as_ref()))
                .collect(),
        };
        formatter.json(&output);
        return ExitCode::Success;
    }

    for (path, meta) in &entries {
        formatter.println(&format_entry(&formatter, path, meta.as_ref(), args.long));
    }

    ExitCode::Success
}

fn format_entry(
    formatter: &Formatter,
    path: &VPath,
    meta: Option<&FileMetadata>,
    long: bool,
) -> String {
    let name = path.name().unwrap_or("/");
    let is_dir = meta.is_some_and(FileMetadata::is_dir);
    let styled_name = if is_dir {
        formatter.style_dir(&format!("{name}/"))
    } else {
        formatter.style_file(name)
    };

    if !long {
        return styled_name;
    }

    let date = meta
        .and_then(|m| m.modified)
        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".repeat(19));
    let size = match meta {
        Some(m) if m.is_dir() => "DIR".to_string(),
        Some(m) => m.size.map(format_size).unwrap_or_else(|| "-".to_string()),
        None => "?".to_string(),
    };

    format!(
        "[{}] {} {styled_name}",
        formatter.style_date(&date),
        formatter.style_size(&format!("{size:>10}"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_output_without_metadata() {
        let entry = EntryOutput::new(&VPath::parse("/lib/a.txt"), None);
        assert_eq!(entry.name, "a.txt");
        assert!(entry.is_dir.is_none());
        assert!(entry.size_bytes.is_none());
    }

    #[test]
    fn test_format_entry_long() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        let meta = FileMetadata::file(2048);
        let line = format_entry(&formatter, &VPath::parse("/x/data.bin"), Some(&meta), true);
        assert!(line.ends_with("2 KiB data.bin"));

        let dir = FileMetadata::directory();
        let line = format_entry(&formatter, &VPath::parse("/x/sub"), Some(&dir), false);
        assert_eq!(line, "sub/");
    }
}
