//! Target platform model for the stubgen bridge generator.
//!
//! A bridge is emitted for exactly one native flavour:
//! - **native:** plain C symbols resolved by the managed runtime's linker
//! - **jvm:** JNI entry points resolved by the JVM's native method lookup
//!
//! The platform decides the native spelling of every bridged type and how
//! a generated symbol is mangled.

pub mod error;
pub mod mangle;
pub mod platform;

pub use error::TargetError;
pub use platform::Platform;
