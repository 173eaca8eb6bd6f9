//! Bridge call shapes and the symbols assigned to them.

use stubgen_targets::{mangle, Platform};

use crate::bridged::BridgedType;

/// Which way a bridge call crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Managed code calls into native code.
    ManagedToNative,
    /// Native code calls back into managed code.
    NativeToManaged,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ManagedToNative => write!(f, "managed-to-native"),
            Self::NativeToManaged => write!(f, "native-to-managed"),
        }
    }
}

/// Canonical key of a bridge definition. Two requests with equal signatures
/// share one definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BridgeSignature {
    pub direction: Direction,
    pub params: Vec<BridgedType>,
    pub ret: BridgedType,
    /// The call may be reordered or hoisted by later passes.
    pub independent: bool,
    /// What the body calls, for requests whose bodies differ by callee.
    /// Unkeyed requests of the same shape share one definition.
    pub target: Option<String>,
}

impl BridgeSignature {
    pub fn new(
        direction: Direction,
        params: impl IntoIterator<Item = BridgedType>,
        ret: BridgedType,
        independent: bool,
    ) -> Self {
        Self {
            direction,
            params: params.into_iter().collect(),
            ret,
            independent,
            target: None,
        }
    }

    /// Key the signature by the entity its body calls.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl std::fmt::Display for BridgeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (", self.direction)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)?;
        if self.independent {
            write!(f, " [independent]")?;
        }
        if let Some(target) = &self.target {
            write!(f, " via {target}")?;
        }
        Ok(())
    }
}

/// Position of a definition in the manager's insertion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BridgeId(pub(crate) usize);

impl BridgeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Names under which one bridge is known on each side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BridgeSymbol {
    /// Sequence number the names were derived from.
    pub ordinal: usize,
    /// Managed function name, e.g. `kniBridge0`.
    pub managed_name: String,
    /// Native symbol the managed function binds to.
    pub native_name: String,
}

/// Derives symbol names for a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNaming {
    pub platform: Platform,
    /// Managed package the bridges are declared in.
    pub package: String,
    /// Class that holds top-level managed functions, needed for JNI names.
    pub jvm_file_class: String,
}

/// Prefix of every managed bridge function name.
pub const BRIDGE_NAME_PREFIX: &str = "kniBridge";

impl SymbolNaming {
    pub fn new(platform: Platform, package: impl Into<String>) -> Self {
        Self {
            platform,
            package: package.into(),
            jvm_file_class: "BridgesKt".to_string(),
        }
    }

    pub fn with_jvm_file_class(mut self, class: impl Into<String>) -> Self {
        self.jvm_file_class = class.into();
        self
    }

    pub fn symbol(&self, ordinal: usize) -> BridgeSymbol {
        let managed_name = format!("{BRIDGE_NAME_PREFIX}{ordinal}");
        let native_name = match self.platform {
            Platform::Native => mangle::native_symbol(&self.package, &managed_name),
            Platform::Jvm => mangle::jni_symbol(&self.package, &self.jvm_file_class, &managed_name),
        };
        BridgeSymbol {
            ordinal,
            managed_name,
            native_name,
        }
    }
}
