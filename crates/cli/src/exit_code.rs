//! Process exit codes
//!
//! Every command returns an [`ExitCode`]; `main` hands it to the OS.

use mfs_core::Error;

/// Exit status reported by `mfs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Unclassified failure
    GeneralError = 1,

    /// Bad arguments or target syntax
    UsageError = 2,

    /// Object store unreachable or rejected the request
    NetworkError = 3,

    /// Path, bucket, object or alias does not exist
    NotFound = 5,

    /// The backend cannot perform the operation
    Unsupported = 6,

    /// Path rejected by the resource allow-list
    OutOfScope = 7,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::NotFound(_) | Error::AliasNotFound(_) => ExitCode::NotFound,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ExitCode::NotFound,
            Error::OutOfScope(_) => ExitCode::OutOfScope,
            Error::Unsupported(_) | Error::ReadOnly(_) => ExitCode::Unsupported,
            Error::InvalidPath(_) => ExitCode::UsageError,
            Error::Network(_) => ExitCode::NetworkError,
            Error::MalformedLocation(_)
            | Error::Config(_)
            | Error::Archive(_)
            | Error::Io(_)
            | Error::General(_) => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::NotFound("/x".into())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&Error::AliasNotFound("s3".into())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&Error::OutOfScope("/secret".into())),
            ExitCode::OutOfScope
        );
        assert_eq!(
            ExitCode::from(&Error::ReadOnly("/x".into())),
            ExitCode::Unsupported
        );
        assert_eq!(
            ExitCode::from(&Error::Unsupported("list".into())),
            ExitCode::Unsupported
        );
        assert_eq!(
            ExitCode::from(&Error::Network("timeout".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "gone"
            ))),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&Error::MalformedLocation("jar:file:/a.jar".into())),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
        assert_eq!(ExitCode::OutOfScope.as_i32(), 7);
    }
}
