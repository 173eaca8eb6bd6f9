//! Bridge generation error types.

use stubgen_targets::Platform;

use crate::signature::Direction;
use crate::value::Side;

/// Errors that can occur during bridge generation.
///
/// Every variant except the parsing ones is a usage error: the caller drove
/// the generator out of order or handed it an ill-typed value.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// `finalize` was called on a manager that was already finalized.
    #[error("bridges already finalized")]
    AlreadyFinalized,

    /// A bridge was inserted after `finalize`.
    #[error("cannot insert bridge for entity #{caller} after finalization")]
    InsertAfterFinalize { caller: usize },

    /// An expression from the wrong side was supplied.
    #[error("{context}: expected a {expected} expression, got a {found} one")]
    WrongSide {
        context: String,
        expected: Side,
        found: Side,
    },

    /// A bridge parameter declared as void.
    #[error("{context}: parameter {index} has type void")]
    VoidParameter { context: String, index: usize },

    /// A type name outside the closed set of bridged types.
    #[error("unknown bridged type '{name}'")]
    UnknownBridgedType { name: String },

    /// The selected platform has no mechanism for this call direction.
    #[error("{direction} bridges are not supported on the {platform} platform")]
    UnsupportedDirection {
        direction: Direction,
        platform: Platform,
    },

    /// Failed to parse a C function signature.
    #[error("invalid C signature: {detail}")]
    InvalidCSignature { detail: String },

    /// A C type with no counterpart in the bridged catalog.
    #[error("C type '{ty}' cannot be bridged: {reason}")]
    Unbridgeable { ty: String, reason: String },

    /// Failed to parse a bridge declaration file.
    #[error("invalid bridge declaration: {detail}")]
    InvalidDeclaration { detail: String },

    /// Target platform error.
    #[error("target error: {0}")]
    Target(#[from] stubgen_targets::TargetError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
