//! Expressions and typed values on either side of a bridge.

use crate::bridged::BridgedType;
use crate::error::{BridgeError, Result};

/// Which side of the boundary a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Managed,
    Native,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed => write!(f, "managed"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// A source expression, tagged with the side it is written for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Managed(String),
    Native(String),
}

impl Expr {
    pub fn managed(text: impl Into<String>) -> Self {
        Self::Managed(text.into())
    }

    pub fn native(text: impl Into<String>) -> Self {
        Self::Native(text.into())
    }

    pub fn side(&self) -> Side {
        match self {
            Self::Managed(_) => Side::Managed,
            Self::Native(_) => Side::Native,
        }
    }

    /// The raw source text.
    pub fn text(&self) -> &str {
        match self {
            Self::Managed(t) | Self::Native(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Managed(t) | Self::Native(t) => t,
        }
    }

    /// Return the text if this expression belongs to `side`.
    pub fn expect_side(&self, side: Side, context: &str) -> Result<&str> {
        if self.side() == side {
            Ok(self.text())
        } else {
            Err(BridgeError::WrongSide {
                context: context.to_string(),
                expected: side,
                found: self.side(),
            })
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// An expression paired with the bridged type it evaluates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub ty: BridgedType,
    pub expr: Expr,
    /// The managed static type is wider than `ty` and needs the catalog conversion.
    pub generic: bool,
}

impl TypedValue {
    pub fn managed(ty: BridgedType, text: impl Into<String>) -> Self {
        Self {
            ty,
            expr: Expr::managed(text),
            generic: false,
        }
    }

    /// A managed value whose static type is more general than `ty`, such as
    /// a boxed number read back at a specific width.
    pub fn managed_generic(ty: BridgedType, text: impl Into<String>) -> Self {
        Self {
            ty,
            expr: Expr::managed(text),
            generic: true,
        }
    }

    pub fn native(ty: BridgedType, text: impl Into<String>) -> Self {
        Self {
            ty,
            expr: Expr::native(text),
            generic: false,
        }
    }

    /// Text to pass at a call site, with the conversion applied if needed.
    pub fn argument_text(&self) -> String {
        match (self.generic, self.ty.conversion()) {
            (true, Some(conversion)) => format!("{}.{conversion}()", self.expr.text()),
            _ => self.expr.text().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expr_side_checks() {
        let e = Expr::native("p0");
        assert_eq!(e.expect_side(Side::Native, "body").unwrap(), "p0");
        let err = e.expect_side(Side::Managed, "body").unwrap_err();
        assert_eq!(
            err.to_string(),
            "body: expected a managed expression, got a native one"
        );
    }

    #[test]
    fn generic_values_are_converted() {
        let v = TypedValue::managed_generic(BridgedType::Int, "boxed");
        assert_eq!(v.argument_text(), "boxed.toInt()");
        let plain = TypedValue::managed(BridgedType::Int, "x");
        assert_eq!(plain.argument_text(), "x");
    }

    #[test]
    fn pointers_pass_unconverted() {
        let v = TypedValue::managed_generic(BridgedType::NativePtr, "ptr");
        assert_eq!(v.argument_text(), "ptr");
    }
}
