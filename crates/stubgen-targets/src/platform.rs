//! Native flavours a bridge can be generated for.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// The native side of a bridge.
///
/// Both flavours share the managed side; they differ in how the managed
/// runtime finds the native symbol and in the C spelling of each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Managed code linked directly against C symbols.
    #[default]
    Native,
    /// Managed code running on a JVM, calling through JNI.
    Jvm,
}

impl Platform {
    /// All supported platforms, in display order.
    pub const ALL: [Platform; 2] = [Platform::Native, Platform::Jvm];

    /// Parse a platform from its lowercase name.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "jvm" => Ok(Self::Jvm),
            other => Err(TargetError::UnknownPlatform {
                name: other.to_string(),
            }),
        }
    }

    /// One-line human description.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Native => "C symbols linked into the managed binary",
            Self::Jvm => "JNI entry points loaded by the JVM",
        }
    }

    /// Headers every generated native source needs.
    pub fn prelude_includes(&self) -> &'static [&'static str] {
        match self {
            Self::Native => &["stdint.h"],
            Self::Jvm => &["stdint.h", "jni.h"],
        }
    }

    /// Whether managed declarations must name their native symbol explicitly.
    ///
    /// JNI resolves symbols from the declaring class instead.
    pub fn needs_symbol_annotation(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Whether native code can call back into managed functions.
    pub fn supports_native_to_managed(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Leading parameters every JNI entry point receives before its own.
    pub fn implicit_native_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Native => &[],
            Self::Jvm => &[("jniEnv", "JNIEnv*"), ("jclss", "jclass")],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Jvm => write!(f, "jvm"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Validate a pointer width in bits.
pub fn check_word_bits(bits: u8) -> Result<u8> {
    match bits {
        32 | 64 => Ok(bits),
        other => Err(TargetError::UnsupportedWordSize { bits: other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_platforms() {
        assert_eq!(Platform::parse("native").unwrap(), Platform::Native);
        assert_eq!(Platform::parse("JVM").unwrap(), Platform::Jvm);
        assert_eq!(" jvm ".parse::<Platform>().unwrap(), Platform::Jvm);
        assert!(Platform::parse("wasm").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for p in Platform::ALL {
            assert_eq!(Platform::parse(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn jvm_entry_points_take_env_and_class() {
        let params = Platform::Jvm.implicit_native_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ("jniEnv", "JNIEnv*"));
        assert!(Platform::Native.implicit_native_params().is_empty());
    }

    #[test]
    fn callbacks_only_on_native() {
        assert!(Platform::Native.supports_native_to_managed());
        assert!(!Platform::Jvm.supports_native_to_managed());
        assert!(Platform::Native.needs_symbol_annotation());
        assert!(!Platform::Jvm.needs_symbol_annotation());
    }

    #[test]
    fn word_bits() {
        assert_eq!(check_word_bits(64).unwrap(), 64);
        assert_eq!(check_word_bits(32).unwrap(), 32);
        let err = check_word_bits(16).unwrap_err();
        assert!(err.to_string().contains("16"));
    }
}
