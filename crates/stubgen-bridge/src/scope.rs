//! Text scopes that bridge bodies are written into.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::{Expr, Side};

/// Line appender for one bridge body.
///
/// A builder is created fresh for every body and dropped once its lines are
/// copied into the bridge definition. Names handed out by [`fresh_name`]
/// always contain an underscore, so they never clash with the `p{i}`
/// parameters of the enclosing bridge function.
///
/// [`fresh_name`]: CodeBuilder::fresh_name
#[derive(Debug)]
pub struct CodeBuilder {
    side: Side,
    lines: Vec<String>,
    next_local: usize,
}

impl CodeBuilder {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            lines: Vec::new(),
            next_local: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Append one line of source text.
    pub fn out(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// A local name unique within this builder.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        let name = format!("{prefix}_{}", self.next_local);
        self.next_local += 1;
        name
    }

    /// Wrap `text` as an expression of this builder's side.
    pub fn expr(&self, text: impl Into<String>) -> Expr {
        match self.side {
            Side::Managed => Expr::managed(text),
            Side::Native => Expr::native(text),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Top-level managed file scope: renders type references and collects imports.
#[derive(Debug, Clone, Default)]
pub struct ManagedScope {
    package: String,
    /// Short name → fully qualified name it was bound to.
    bound: BTreeMap<String, String>,
    imports: BTreeSet<String>,
}

/// Package whose members are visible without an import.
const IMPLICIT_PACKAGE: &str = "kotlin";

impl ManagedScope {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Render a reference to `fq_name`, importing it when necessary.
    ///
    /// Falls back to the fully qualified name when the short name is
    /// already bound to a different declaration.
    pub fn reference(&mut self, fq_name: &str) -> String {
        let Some((pkg, short)) = fq_name.rsplit_once('.') else {
            return fq_name.to_string();
        };

        match self.bound.get(short) {
            Some(existing) if existing == fq_name => return short.to_string(),
            Some(_) => return fq_name.to_string(),
            None => {}
        }

        self.bound.insert(short.to_string(), fq_name.to_string());
        if pkg != IMPLICIT_PACKAGE && pkg != self.package {
            self.imports.insert(fq_name.to_string());
        }
        short.to_string()
    }

    /// Collected imports, sorted.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }
}
