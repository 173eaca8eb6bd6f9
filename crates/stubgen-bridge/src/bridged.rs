//! The closed catalog of types that can cross a bridge.
//!
//! Every [`BridgedType`] has an exact counterpart on both sides, so a bridge
//! call is always a fixed-size copy with no marshaling layer and no runtime
//! validation.

use serde::{Deserialize, Serialize};
use stubgen_targets::Platform;

use crate::error::{BridgeError, Result};

/// A type with exact counterparts on the managed and native sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgedType {
    Byte,
    Short,
    Int,
    Long,
    #[serde(rename = "ubyte")]
    UByte,
    #[serde(rename = "ushort")]
    UShort,
    #[serde(rename = "uint")]
    UInt,
    #[serde(rename = "ulong")]
    ULong,
    Float,
    Double,
    NativePtr,
    #[serde(rename = "objc_pointer")]
    ObjCPointer,
    Void,
}

/// How one [`BridgedType`] is spelled on each side for a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Representation {
    /// Fully qualified managed type name.
    pub managed: &'static str,
    /// Native type as written in generated C.
    pub native: &'static str,
    /// Managed conversion applied to a more general value, e.g. `toInt`.
    pub conversion: Option<&'static str>,
}

impl BridgedType {
    /// Every variant, in declaration order.
    pub const ALL: [BridgedType; 13] = [
        BridgedType::Byte,
        BridgedType::Short,
        BridgedType::Int,
        BridgedType::Long,
        BridgedType::UByte,
        BridgedType::UShort,
        BridgedType::UInt,
        BridgedType::ULong,
        BridgedType::Float,
        BridgedType::Double,
        BridgedType::NativePtr,
        BridgedType::ObjCPointer,
        BridgedType::Void,
    ];

    /// Fully qualified managed counterpart.
    pub fn managed_type(&self) -> &'static str {
        match self {
            Self::Byte => "kotlin.Byte",
            Self::Short => "kotlin.Short",
            Self::Int => "kotlin.Int",
            Self::Long => "kotlin.Long",
            Self::UByte => "kotlin.UByte",
            Self::UShort => "kotlin.UShort",
            Self::UInt => "kotlin.UInt",
            Self::ULong => "kotlin.ULong",
            Self::Float => "kotlin.Float",
            Self::Double => "kotlin.Double",
            Self::NativePtr | Self::ObjCPointer => "kotlinx.cinterop.NativePtr",
            Self::Void => "kotlin.Unit",
        }
    }

    /// Managed conversion operator for adapting a more general value.
    pub fn conversion(&self) -> Option<&'static str> {
        match self {
            Self::Byte => Some("toByte"),
            Self::Short => Some("toShort"),
            Self::Int => Some("toInt"),
            Self::Long => Some("toLong"),
            Self::UByte => Some("toUByte"),
            Self::UShort => Some("toUShort"),
            Self::UInt => Some("toUInt"),
            Self::ULong => Some("toULong"),
            Self::Float => Some("toFloat"),
            Self::Double => Some("toDouble"),
            Self::NativePtr | Self::ObjCPointer | Self::Void => None,
        }
    }

    /// Signed type of the same width; every other type maps to itself.
    pub fn signed_counterpart(&self) -> Self {
        match self {
            Self::UByte => Self::Byte,
            Self::UShort => Self::Short,
            Self::UInt => Self::Int,
            Self::ULong => Self::Long,
            other => *other,
        }
    }

    /// Native spelling on `platform`.
    pub fn native_type(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Native => match self {
                Self::Byte => "int8_t",
                Self::Short => "int16_t",
                Self::Int => "int32_t",
                Self::Long => "int64_t",
                Self::UByte => "uint8_t",
                Self::UShort => "uint16_t",
                Self::UInt => "uint32_t",
                Self::ULong => "uint64_t",
                Self::Float => "float",
                Self::Double => "double",
                Self::NativePtr => "void*",
                Self::ObjCPointer => "id",
                Self::Void => "void",
            },
            // JNI has no unsigned types; the bit pattern is carried unchanged.
            Platform::Jvm => match self {
                Self::Byte | Self::UByte => "jbyte",
                Self::Short | Self::UShort => "jshort",
                Self::Int | Self::UInt => "jint",
                Self::Long | Self::ULong => "jlong",
                Self::Float => "jfloat",
                Self::Double => "jdouble",
                Self::NativePtr | Self::ObjCPointer => "jlong",
                Self::Void => "void",
            },
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Parse a bridged type from its snake_case name.
    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s.trim())
            .ok_or_else(|| BridgeError::UnknownBridgedType {
                name: s.trim().to_string(),
            })
    }

    /// The snake_case name used in declaration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::UByte => "ubyte",
            Self::UShort => "ushort",
            Self::UInt => "uint",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::NativePtr => "native_ptr",
            Self::ObjCPointer => "objc_pointer",
            Self::Void => "void",
        }
    }
}

impl std::fmt::Display for BridgedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up both sides' spelling of `ty` on `platform`.
pub fn representation_for(ty: BridgedType, platform: Platform) -> Representation {
    Representation {
        managed: ty.managed_type(),
        native: ty.native_type(platform),
        conversion: ty.conversion(),
    }
}
