//! Bridge declaration file (`.bridge.toml`) parsing.
//!
//! A declaration names one C library, the functions managed code calls in
//! it, and the callbacks native code makes back into managed code.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// A complete bridge declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeDeclaration {
    pub library: Library,
    #[serde(default)]
    pub functions: Vec<ForeignFunction>,
    #[serde(default)]
    pub callbacks: Vec<Callback>,
}

/// The native library being bridged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    /// Library name (e.g. "libm"); also names the generated files.
    pub name: String,
    /// Managed package for the generated declarations.
    #[serde(default)]
    pub package: Option<String>,
    /// Headers the native stubs include.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Linker flag, recorded in the generated native source.
    #[serde(default)]
    pub link: Option<String>,
}

/// A C function callable from managed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignFunction {
    /// C symbol, reused as the managed wrapper name.
    pub name: String,
    #[serde(alias = "c-signature")]
    pub c_signature: String,
    /// Free of side effects, so calls may be reordered.
    #[serde(default)]
    pub independent: bool,
    #[serde(default)]
    pub excluded: bool,
}

/// A C entry point whose body calls back into a managed function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callback {
    /// C symbol of the generated trampoline.
    pub name: String,
    #[serde(alias = "c-signature")]
    pub c_signature: String,
    /// Managed function the trampoline forwards to.
    #[serde(alias = "managed-function")]
    pub managed_function: String,
    #[serde(default)]
    pub excluded: bool,
}

impl BridgeDeclaration {
    /// Parse a declaration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let decl: BridgeDeclaration = toml::from_str(input)?;

        if decl.library.name.trim().is_empty() {
            return Err(BridgeError::InvalidDeclaration {
                detail: "library.name is required".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        let names = decl
            .functions
            .iter()
            .map(|f| &f.name)
            .chain(decl.callbacks.iter().map(|c| &c.name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(BridgeError::InvalidDeclaration {
                    detail: format!("'{name}' is declared more than once"),
                });
            }
        }

        Ok(decl)
    }

    /// Parse a declaration from a file path.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn active_functions(&self) -> impl Iterator<Item = &ForeignFunction> {
        self.functions.iter().filter(|f| !f.excluded)
    }

    pub fn active_callbacks(&self) -> impl Iterator<Item = &Callback> {
        self.callbacks.iter().filter(|c| !c.excluded)
    }

    /// Managed package: the declared one, or the library name made safe.
    pub fn package(&self) -> String {
        match &self.library.package {
            Some(pkg) => pkg.clone(),
            None => stubgen_targets::mangle::c_identifier(&self.library.name).to_lowercase(),
        }
    }
}
