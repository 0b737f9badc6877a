//! stat command - Show metadata for a path

use clap::Args;
use mfs_core::{Config, FileMetadata};
use serde::Serialize;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

/// Show metadata for a path
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Path to inspect (<fs>:<path>)
    pub target: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    target: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_path: Option<String>,
}

impl StatOutput {
    fn new(target: String, meta: FileMetadata, system_path: Option<String>) -> Self {
        Self {
            target,
            kind: if meta.is_dir() { "directory" } else { "file" },
            size_bytes: meta.size,
            size_human: meta.size.map(format_size),
            last_modified: meta.modified.map(|t| t.to_string()),
            etag: meta.etag,
            content_type: meta.content_type,
            system_path,
        }
    }
}

/// Execute the stat command
pub async fn execute(args: StatArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let meta = match fs.metadata(&target.path).await {
        Ok(m) => m,
        Err(e) => return report(&formatter, &format!("Failed to stat '{target}'"), &e),
    };

    // A missing host mapping is normal for archives and object stores
    let system_path = fs
        .to_system_path(&target.path)
        .await
        .ok()
        .flatten()
        .map(|p| p.display().to_string());

    let output = StatOutput::new(target.to_string(), meta, system_path);

    if formatter.is_json() {
        formatter.json(&output);
        return ExitCode::Success;
    }

    let mut rows = vec![("Target", output.target.clone()), ("Kind", output.kind.to_string())];
    if let (Some(bytes), Some(human)) = (output.size_bytes, &output.size_human) {
        rows.push(("Size", formatter.style_size(&format!("{human} ({bytes} bytes)"))));
    }
    if let Some(modified) = &output.last_modified {
        rows.push(("Modified", formatter.style_date(modified)));
    }
    if let Some(etag) = &output.etag {
        rows.push(("ETag", etag.clone()));
    }
    if let Some(content_type) = &output.content_type {
        rows.push(("Type", content_type.clone()));
    }
    if let Some(path) = &output.system_path {
        rows.push(("Host path", path.clone()));
    }

    for (key, value) in rows {
        let styled_key = formatter.style_key(&format!("{key:<10}"));
        formatter.println(&format!("{styled_key}: {value}"));
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_output_for_directory() {
        let output = StatOutput::new("cp:/lib".to_string(), FileMetadata::directory(), None);
        assert_eq!(output.kind, "directory");
        assert!(output.size_bytes.is_none());

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["kind"], "directory");
        assert!(json.get("size_bytes").is_none());
    }

    #[test]
    fn test_stat_output_for_file() {
        let output = StatOutput::new(
            "local:/tmp/a".to_string(),
            FileMetadata::file(1024),
            Some("/tmp/a".to_string()),
        );
        assert_eq!(output.kind, "file");
        assert_eq!(output.size_human.as_deref(), Some("1 KiB"));
        assert_eq!(output.system_path.as_deref(), Some("/tmp/a"));
    }
}
