//! Output handling

mod formatter;

pub use formatter::Formatter;

/// Output switches shared by every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Emit JSON instead of styled text
    pub json: bool,

    pub no_color: bool,

    /// Suppress non-error output
    pub quiet: bool,
}

/// Human-readable binary size, e.g. `1 KiB`
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
