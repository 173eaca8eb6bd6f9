//! Bridge generation between managed code and native C.
//!
//! A bridge is a pair of definitions, one managed and one native, that lets
//! a call cross the boundary in one direction. Bridges with the same shape
//! and call target are emitted once and share a symbol.
//!
//! ## Modules
//!
//! - [`bridged`] — The catalog of primitive types that can cross the boundary
//! - [`value`] — Side-tagged expressions and typed values
//! - [`scope`] — Code builders and managed import tracking
//! - [`backed`] — Handles for entities that own bridges, and their dependencies
//! - [`signature`] — Bridge signatures and symbol naming
//! - [`manager`] — Deduplication, ordering and finalization of bridge text
//! - [`generator`] — The managed-to-native and native-to-managed generators
//! - [`csig`] — C function prototype parser
//! - [`declaration`] — `.bridge.toml` declaration file parsing
//! - [`marshal`] — C type to bridged type mapping
//! - [`stubs`] — Stub generation for a whole declaration

pub mod backed;
pub mod bridged;
pub mod csig;
pub mod declaration;
pub mod error;
pub mod generator;
pub mod manager;
pub mod marshal;
pub mod scope;
pub mod signature;
pub mod stubs;
pub mod value;

pub use backed::{NativeBacked, NativeBackedArena};
pub use bridged::BridgedType;
pub use declaration::BridgeDeclaration;
pub use error::BridgeError;
pub use generator::BridgeGenerator;
pub use manager::{BridgeManager, NativeTextBridges};
pub use signature::{BridgeSignature, Direction, SymbolNaming};
pub use stubs::{generate_stubs, GeneratedStubs, StubOptions};
pub use value::{Expr, Side, TypedValue};
