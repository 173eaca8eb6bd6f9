//! Mapping C prototype types onto the bridged catalog.
//!
//! Only types with a fixed-size, lossless bridged counterpart map; anything
//! else makes the declaring entity unbridgeable.

use stubgen_targets::Platform;

use crate::bridged::BridgedType;
use crate::csig::{CType, IntRank};
use crate::error::{BridgeError, Result};

/// Map a C type to its bridged counterpart.
///
/// `long` and `size_t` follow the target word size. Every pointer becomes
/// [`BridgedType::NativePtr`], whatever it points to.
pub fn bridged_type_from_ctype(ct: &CType, word_bits: u8) -> Result<BridgedType> {
    let wide = word_bits >= 64;
    let ty = match ct {
        CType::Void => BridgedType::Void,
        CType::Integer { rank, unsigned } => {
            let bits = match rank {
                IntRank::Char => 8,
                IntRank::Short => 16,
                IntRank::Int => 32,
                IntRank::Long if wide => 64,
                IntRank::Long => 32,
                IntRank::LongLong => 64,
            };
            integer(bits, *unsigned)
        }
        CType::Fixed { bits, unsigned } => integer(*bits, *unsigned),
        CType::SizeT => integer(if wide { 64 } else { 32 }, true),
        CType::Float => BridgedType::Float,
        CType::Double => BridgedType::Double,
        CType::Pointer(_) => BridgedType::NativePtr,
        CType::Const(inner) => bridged_type_from_ctype(inner, word_bits)?,
        CType::Bool => return Err(unbridgeable(ct, "booleans have no fixed-width counterpart")),
        CType::LongDouble => return Err(unbridgeable(ct, "extended precision is not portable")),
        CType::Struct(_) | CType::Named(_) => {
            return Err(unbridgeable(ct, "aggregates can only be passed by pointer"))
        }
    };
    Ok(ty)
}

fn integer(bits: u8, unsigned: bool) -> BridgedType {
    match (bits, unsigned) {
        (8, false) => BridgedType::Byte,
        (16, false) => BridgedType::Short,
        (32, false) => BridgedType::Int,
        (64, false) => BridgedType::Long,
        (8, true) => BridgedType::UByte,
        (16, true) => BridgedType::UShort,
        (32, true) => BridgedType::UInt,
        (_, true) => BridgedType::ULong,
        (_, false) => BridgedType::Long,
    }
}

fn unbridgeable(ct: &CType, reason: &str) -> BridgeError {
    BridgeError::Unbridgeable {
        ty: ct.to_string(),
        reason: reason.to_string(),
    }
}

/// Native expression passing bridge parameter `param` to a C parameter of type `ct`.
///
/// On JNI, pointers travel as `jlong` and must be cast back explicitly.
pub fn native_argument(ct: &CType, param: &str, platform: Platform) -> String {
    match (platform, ct.unqualified()) {
        (Platform::Jvm, CType::Pointer(_)) => format!("({ct})(intptr_t){param}"),
        _ => param.to_string(),
    }
}

/// Native expression adapting a C call result of type `ct` to the bridge's return type.
///
/// The bridge casts its result to the bridged native type, which covers
/// typed pointers on `native`. JNI needs the pointer widened first.
pub fn native_result(ct: &CType, call: &str, platform: Platform) -> String {
    match (platform, ct.unqualified()) {
        (Platform::Jvm, CType::Pointer(_)) => format!("(intptr_t){call}"),
        _ => call.to_string(),
    }
}
