//! Error types for target platform operations.

/// Errors that can occur while resolving a target platform.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Platform name not recognized.
    #[error("unknown platform '{name}' (expected one of: native, jvm)")]
    UnknownPlatform {
        /// The name that failed to resolve.
        name: String,
    },

    /// Word size outside the supported set.
    #[error("unsupported word size: {bits} bits (expected 32 or 64)")]
    UnsupportedWordSize {
        /// The rejected width.
        bits: u8,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
