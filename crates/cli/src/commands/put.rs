//! put command - Write a local file or stdin to a target
//!
//! The whole payload is buffered before it is handed to the filesystem.

use std::path::Path;

use clap::Args;
use mfs_core::{Config, Error, FileSystem, VPath};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::commands::{open_target, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, format_size};

/// Write a local file or stdin to a target
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload, or `-` for stdin
    pub source: String,

    /// Destination (<fs>:<path>)
    pub target: String,

    /// Append to the destination instead of replacing it
    #[arg(short, long)]
    pub append: bool,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    target: String,
    size_bytes: u64,
    appended: bool,
}

/// Execute the put command
pub async fn execute(args: PutArgs, config: &Config, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let data = match read_input(&args.source).await {
        Ok(d) => d,
        Err(e) => return report(&formatter, &format!("Failed to read '{}'", args.source), &e),
    };

    let (fs, target) = match open_target(&args.target, config, &formatter).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let size = data.len() as u64;
    if let Err(e) = write(fs.as_ref(), &target.path, data, args.append).await {
        return report(&formatter, &format!("Failed to write '{target}'"), &e);
    }

    if formatter.is_json() {
        formatter.json(&PutOutput {
            target: target.to_string(),
            size_bytes: size,
            appended: args.append,
        });
    } else {
        let verb = if args.append { "Appended" } else { "Wrote" };
        formatter.success(&format!(
            "{verb} {} to {target}",
            formatter.style_size(&format_size(size))
        ));
    }

    ExitCode::Success
}

async fn read_input(source: &str) -> mfs_core::Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        return Ok(buf);
    }
    tokio::fs::read(Path::new(source)).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(source.to_string())
        } else {
            Error::Io(e)
        }
    })
}

async fn write(
    fs: &dyn FileSystem,
    path: &VPath,
    data: Vec<u8>,
    append: bool,
) -> mfs_core::Result<()> {
    if append {
        fs.appending_sink(path, data).await
    } else {
        fs.sink(path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfs_core::LocalFs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_append_on_local_fs() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());
        let path = VPath::parse("/out/log.txt");

        fs.create_directory(&VPath::parse("/out")).await.unwrap();
        write(&fs, &path, b"one\n".to_vec(), false).await.unwrap();
        write(&fs, &path, b"two\n".to_vec(), true).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("out/log.txt")).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("in.bin");
        std::fs::write(&file, [1u8, 2, 3]).unwrap();

        let data = read_input(&file.to_string_lossy()).await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        let missing = dir.path().join("missing.bin");
        let err = read_input(&missing.to_string_lossy()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
