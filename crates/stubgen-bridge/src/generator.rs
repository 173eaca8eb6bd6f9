//! The two directional bridge generators.
//!
//! A request produces a call expression on the requesting side and a pair
//! of definitions, one per side, that the [`BridgeManager`] stores under the
//! request's [`BridgeSignature`].
//!
//! Managed-to-native, `native` platform, `Int -> Int`:
//!
//! ```text
//! @SymbolName("pkg_kniBridge0")
//! private external fun kniBridge0(p0: Int): Int
//!
//! int32_t pkg_kniBridge0 (int32_t p0) {
//!     return (int32_t)p0;
//! }
//! ```
//!
//! Bodies are always invoked, even when the signature already has a
//! definition: the generator only guarantees deterministic naming. A caller
//! whose bodies have observable side effects must memoize identical
//! requests itself. The text produced for a repeated signature is dropped
//! in favour of the first definition.

use stubgen_targets::Platform;

use crate::backed::NativeBacked;
use crate::bridged::BridgedType;
use crate::error::{BridgeError, Result};
use crate::manager::{BridgeManager, NativeTextBridges};
use crate::scope::{CodeBuilder, ManagedScope};
use crate::signature::{BridgeId, BridgeSignature, BridgeSymbol, Direction, SymbolNaming};
use crate::value::{Expr, Side, TypedValue};

const SYMBOL_NAME_ANNOTATION: &str = "kotlinx.cinterop.SymbolName";
const INDEPENDENT_ANNOTATION: &str = "kotlin.native.internal.Independent";
const EXPORT_FOR_RUNTIME_ANNOTATION: &str = "kotlin.native.internal.ExportForCppRuntime";

const INDENT: &str = "    ";

/// Generates simple bridges passing [`BridgedType`] values between the two sides.
#[derive(Debug)]
pub struct BridgeGenerator {
    manager: BridgeManager,
    scope: ManagedScope,
}

impl BridgeGenerator {
    pub fn new(naming: SymbolNaming) -> Self {
        let scope = ManagedScope::new(naming.package.clone());
        Self {
            manager: BridgeManager::new(naming),
            scope,
        }
    }

    pub fn platform(&self) -> Platform {
        self.manager.naming().platform
    }

    /// The managed file scope type references are rendered in.
    pub fn managed_scope(&self) -> &ManagedScope {
        &self.scope
    }

    pub fn managed_scope_mut(&mut self) -> &mut ManagedScope {
        &mut self.scope
    }

    pub fn manager(&self) -> &BridgeManager {
        &self.manager
    }

    /// Call native code from managed code.
    ///
    /// `body` receives a fresh native builder and one native parameter
    /// expression per value, and returns the native expression whose value
    /// the bridge returns. For a void return a non-empty result is emitted
    /// as a statement. Returns the managed call expression.
    pub fn managed_to_native<F>(
        &mut self,
        caller: NativeBacked,
        ret: BridgedType,
        values: &[TypedValue],
        independent: bool,
        body: F,
    ) -> Result<Expr>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        self.managed_to_native_via(caller, None, ret, values, independent, body)
    }

    /// [`managed_to_native`](Self::managed_to_native) for a body that calls
    /// `target`. Requests of the same shape share a definition only when
    /// they name the same target.
    pub fn managed_to_native_via<F>(
        &mut self,
        caller: NativeBacked,
        target: Option<&str>,
        ret: BridgedType,
        values: &[TypedValue],
        independent: bool,
        body: F,
    ) -> Result<Expr>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        check_values(values, Side::Managed, "managed-to-native argument")?;

        let signature = keyed(
            BridgeSignature::new(
                Direction::ManagedToNative,
                values.iter().map(|v| v.ty),
                ret,
                independent,
            ),
            target,
        );
        let (symbol, fresh) = self.manager.reserve(&signature)?;
        tracing::debug!(
            direction = %signature.direction,
            symbol = %symbol.native_name,
            arity = values.len(),
            fresh,
            "bridge requested"
        );

        let native = self.managed_to_native_native_part(&symbol, ret, values, body)?;
        let managed = self.managed_to_native_managed_part(&symbol, ret, values, independent);
        self.manager
            .insert_native_bridge(caller, signature, managed, native)?;

        let platform = self.platform();
        let args: Vec<String> = values
            .iter()
            .map(|v| {
                let carrier = managed_carrier(v.ty, platform);
                match carrier.conversion() {
                    Some(conversion) if carrier != v.ty => {
                        format!("{}.{conversion}()", v.argument_text())
                    }
                    _ => v.argument_text(),
                }
            })
            .collect();
        let call = format!("{}({})", symbol.managed_name, args.join(", "));
        let call = match ret.conversion() {
            Some(conversion) if managed_carrier(ret, platform) != ret => format!("{call}.{conversion}()"),
            _ => call,
        };
        Ok(Expr::managed(call))
    }

    /// Managed declaration of a managed-to-native bridge.
    pub fn managed_to_native_managed_part(
        &mut self,
        symbol: &BridgeSymbol,
        ret: BridgedType,
        values: &[TypedValue],
        independent: bool,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        if self.platform().needs_symbol_annotation() {
            let annotation = self.scope.reference(SYMBOL_NAME_ANNOTATION);
            lines.push(format!("@{annotation}({})", quote(&symbol.native_name)));
        }
        if independent {
            lines.push(format!("@{}", self.scope.reference(INDEPENDENT_ANNOTATION)));
        }
        let params = self.managed_params(values.iter().map(|v| v.ty));
        let carrier = managed_carrier(ret, self.platform());
        let ret_type = self.scope.reference(carrier.managed_type());
        lines.push(format!(
            "private external fun {}({params}): {ret_type}",
            symbol.managed_name
        ));
        lines
    }

    /// Native definition of a managed-to-native bridge, with `body` inlined.
    pub fn managed_to_native_native_part<F>(
        &self,
        symbol: &BridgeSymbol,
        ret: BridgedType,
        values: &[TypedValue],
        body: F,
    ) -> Result<Vec<String>>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        let platform = self.platform();
        let c_ret = ret.native_type(platform);

        let mut c_params: Vec<String> = platform
            .implicit_native_params()
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect();
        c_params.extend(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{} p{i}", v.ty.native_type(platform))),
        );
        let joined = c_params.join(", ");

        let header = match platform {
            Platform::Native => format!("{c_ret} {} ({joined}) {{", symbol.native_name),
            Platform::Jvm => format!("JNIEXPORT {c_ret} JNICALL {} ({joined}) {{", symbol.native_name),
        };

        let param_exprs: Vec<Expr> = (0..values.len()).map(|i| Expr::native(format!("p{i}"))).collect();
        let mut builder = CodeBuilder::new(Side::Native);
        let result = body(&mut builder, &param_exprs);
        let result = result.expect_side(Side::Native, "managed-to-native body result")?;
        if ret.is_void() {
            if !result.is_empty() {
                builder.out(format!("{result};"));
            }
        } else {
            builder.out(format!("return ({c_ret}){result};"));
        }

        let mut lines = vec![header];
        lines.extend(builder.into_lines().into_iter().map(|l| format!("{INDENT}{l}")));
        lines.push("}".to_string());
        Ok(lines)
    }

    /// Call managed code from native code.
    ///
    /// `body` receives a fresh managed builder and one managed parameter
    /// expression per value, and returns the managed expression whose value
    /// the bridge returns. Returns the native call expression.
    pub fn native_to_managed<F>(
        &mut self,
        caller: NativeBacked,
        ret: BridgedType,
        values: &[TypedValue],
        body: F,
    ) -> Result<Expr>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        self.native_to_managed_via(caller, None, ret, values, body)
    }

    /// [`native_to_managed`](Self::native_to_managed) for a body that calls
    /// the managed function `target`.
    pub fn native_to_managed_via<F>(
        &mut self,
        caller: NativeBacked,
        target: Option<&str>,
        ret: BridgedType,
        values: &[TypedValue],
        body: F,
    ) -> Result<Expr>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        let platform = self.platform();
        if !platform.supports_native_to_managed() {
            return Err(BridgeError::UnsupportedDirection {
                direction: Direction::NativeToManaged,
                platform,
            });
        }
        check_values(values, Side::Native, "native-to-managed argument")?;

        let signature = keyed(
            BridgeSignature::new(
                Direction::NativeToManaged,
                values.iter().map(|v| v.ty),
                ret,
                false,
            ),
            target,
        );
        let (symbol, fresh) = self.manager.reserve(&signature)?;
        tracing::debug!(
            direction = %signature.direction,
            symbol = %symbol.native_name,
            arity = values.len(),
            fresh,
            "bridge requested"
        );

        let native = self.native_to_managed_native_part(&symbol, ret, values);
        let managed = self.native_to_managed_managed_part(&symbol, ret, values, body)?;
        self.manager
            .insert_native_bridge(caller, signature, managed, native)?;

        let args: Vec<&str> = values.iter().map(|v| v.expr.text()).collect();
        Ok(Expr::native(format!("{}({})", symbol.native_name, args.join(", "))))
    }

    /// Native prototype of a native-to-managed bridge.
    pub fn native_to_managed_native_part(
        &self,
        symbol: &BridgeSymbol,
        ret: BridgedType,
        values: &[TypedValue],
    ) -> Vec<String> {
        let platform = self.platform();
        let params: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{} p{i}", v.ty.native_type(platform)))
            .collect();
        vec![format!(
            "{} {}({});",
            ret.native_type(platform),
            symbol.native_name,
            params.join(", ")
        )]
    }

    /// Managed definition of a native-to-managed bridge, with `body` inlined.
    pub fn native_to_managed_managed_part<F>(
        &mut self,
        symbol: &BridgeSymbol,
        ret: BridgedType,
        values: &[TypedValue],
        body: F,
    ) -> Result<Vec<String>>
    where
        F: FnOnce(&mut CodeBuilder, &[Expr]) -> Expr,
    {
        let export = self.scope.reference(EXPORT_FOR_RUNTIME_ANNOTATION);
        let params = self.managed_params(values.iter().map(|v| v.ty));
        let ret_type = self.scope.reference(ret.managed_type());

        let param_exprs: Vec<Expr> = (0..values.len()).map(|i| Expr::managed(format!("p{i}"))).collect();
        let mut builder = CodeBuilder::new(Side::Managed);
        let result = body(&mut builder, &param_exprs);
        let result = result.expect_side(Side::Managed, "native-to-managed body result")?;
        if ret.is_void() {
            if !result.is_empty() {
                builder.out(result);
            }
        } else {
            builder.out(format!("return {result}"));
        }

        let mut lines = vec![
            format!("@{export}({})", quote(&symbol.native_name)),
            format!("private fun {}({params}): {ret_type} {{", symbol.managed_name),
        ];
        lines.extend(builder.into_lines().into_iter().map(|l| format!("{INDENT}{l}")));
        lines.push("}".to_string());
        Ok(lines)
    }

    /// Store a fully formed definition under `signature`.
    pub fn insert_native_bridge(
        &mut self,
        caller: NativeBacked,
        signature: BridgeSignature,
        managed: Vec<String>,
        native: Vec<String>,
    ) -> Result<BridgeId> {
        self.manager
            .insert_native_bridge(caller, signature, managed, native)
    }

    /// Store a hand-written definition that is never deduplicated.
    pub fn insert_raw(
        &mut self,
        caller: NativeBacked,
        managed: Vec<String>,
        native: Vec<String>,
    ) -> Result<BridgeId> {
        self.manager.insert_raw(caller, managed, native)
    }

    /// Finalize all requested bridges. Callable once.
    pub fn finalize(&mut self) -> Result<NativeTextBridges> {
        self.manager.finalize()
    }

    fn managed_params(&mut self, types: impl Iterator<Item = BridgedType>) -> String {
        let platform = self.platform();
        types
            .enumerate()
            .map(|(i, ty)| {
                let carrier = managed_carrier(ty, platform);
                format!("p{i}: {}", self.scope.reference(carrier.managed_type()))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn keyed(signature: BridgeSignature, target: Option<&str>) -> BridgeSignature {
    match target {
        Some(target) => signature.with_target(target),
        None => signature,
    }
}

/// Managed type crossing the boundary for `ty`.
///
/// JNI cannot bind external functions whose JVM names are mangled for
/// unsigned parameters, so unsigned values travel as their signed
/// counterparts there and are converted on the managed side.
fn managed_carrier(ty: BridgedType, platform: Platform) -> BridgedType {
    match platform {
        Platform::Jvm => ty.signed_counterpart(),
        Platform::Native => ty,
    }
}

fn check_values(values: &[TypedValue], side: Side, context: &str) -> Result<()> {
    for (index, value) in values.iter().enumerate() {
        value.expr.expect_side(side, context)?;
        if value.ty.is_void() {
            return Err(BridgeError::VoidParameter {
                context: context.to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Quote `s` as a managed string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
