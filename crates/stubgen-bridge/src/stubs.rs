//! Stub generation for a whole bridge declaration.
//!
//! Drives the [`BridgeGenerator`] once per declared entity:
//! - each function gets a managed-to-native bridge calling the C function,
//!   and a public managed wrapper forwarding to it
//! - each callback gets a native-to-managed bridge calling the managed
//!   function, and a C trampoline with the declared prototype
//!
//! Bridges are keyed by the function they call as well as by shape, so two
//! entities share a definition only when they reach the same target.
//!
//! Entities whose prototypes cannot be bridged are skipped and reported.
//! After finalization only wrappers of supported entities are written.

use serde::Serialize;
use stubgen_targets::Platform;

use crate::backed::{NativeBacked, NativeBackedArena};
use crate::bridged::BridgedType;
use crate::csig::CSignature;
use crate::declaration::{BridgeDeclaration, Callback, ForeignFunction};
use crate::error::{BridgeError, Result};
use crate::generator::BridgeGenerator;
use crate::marshal::{bridged_type_from_ctype, native_argument, native_result};
use crate::signature::SymbolNaming;
use crate::value::{Expr, TypedValue};

/// Knobs for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubOptions {
    pub platform: Platform,
    /// Pointer width of the target, for `long` and `size_t`.
    pub word_bits: u8,
    /// Overrides the declaration's package.
    pub package: Option<String>,
    /// Class holding the generated managed functions on the JVM.
    pub jvm_file_class: Option<String>,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            platform: Platform::Native,
            word_bits: 64,
            package: None,
            jvm_file_class: None,
        }
    }
}

/// Generated sources plus a summary of what went into them.
#[derive(Debug, Clone)]
pub struct GeneratedStubs {
    pub managed_source: String,
    pub native_source: String,
    pub report: GenerationReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub library: String,
    pub platform: Platform,
    pub package: String,
    /// Distinct bridge definitions emitted.
    pub bridges: usize,
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntity {
    pub name: String,
    pub reason: String,
}

/// Text written for one entity, kept only if the entity ends up supported.
struct EntityOutput {
    caller: NativeBacked,
    name: String,
    managed: Vec<String>,
    native: Vec<String>,
}

/// Generate managed and native stubs for every active entity in `decl`.
pub fn generate_stubs(decl: &BridgeDeclaration, options: &StubOptions) -> Result<GeneratedStubs> {
    stubgen_targets::platform::check_word_bits(options.word_bits)?;

    let package = options.package.clone().unwrap_or_else(|| decl.package());
    let file_class = options
        .jvm_file_class
        .clone()
        .unwrap_or_else(|| default_file_class(&decl.library.name));
    let naming = SymbolNaming::new(options.platform, package.clone()).with_jvm_file_class(file_class);

    let mut gen = BridgeGenerator::new(naming);
    let mut arena = NativeBackedArena::new();
    let mut outputs = Vec::new();
    let mut skipped = Vec::new();

    for func in decl.active_functions() {
        let caller = arena.create(func.name.clone());
        match function_stub(&mut gen, caller, func, options) {
            Ok(output) => outputs.push(output),
            Err(err) => skip(&mut skipped, &func.name, err)?,
        }
    }

    for callback in decl.active_callbacks() {
        let caller = arena.create(callback.name.clone());
        match callback_stub(&mut gen, caller, callback, options) {
            Ok(output) => outputs.push(output),
            Err(err) => skip(&mut skipped, &callback.name, err)?,
        }
    }

    let bridges = gen.finalize()?;
    let (supported, unsupported): (Vec<_>, Vec<_>) =
        outputs.into_iter().partition(|o| bridges.is_supported(o.caller));
    for output in unsupported {
        skipped.push(SkippedEntity {
            name: output.name,
            reason: "depends on a bridge that could not be generated".to_string(),
        });
    }

    let mut managed = header_comment(&decl.library.name);
    if !package.is_empty() {
        managed.push(format!("package {package}"));
        managed.push(String::new());
    }
    let imports: Vec<&str> = gen.managed_scope().imports().collect();
    if !imports.is_empty() {
        managed.extend(imports.iter().map(|i| format!("import {i}")));
        managed.push(String::new());
    }
    for output in &supported {
        managed.extend(output.managed.iter().cloned());
    }
    if !supported.iter().all(|o| o.managed.is_empty()) {
        managed.push(String::new());
    }
    managed.extend(bridges.managed_lines().map(str::to_string));

    let mut native = header_comment(&decl.library.name);
    if let Some(link) = &decl.library.link {
        native.push(format!("// link: {link}"));
    }
    for include in options.platform.prelude_includes() {
        native.push(format!("#include <{include}>"));
    }
    for header in &decl.library.headers {
        native.push(format!("#include <{header}>"));
    }
    native.push(String::new());
    native.extend(bridges.native_lines().map(str::to_string));
    for output in &supported {
        if !output.native.is_empty() {
            native.push(String::new());
            native.extend(output.native.iter().cloned());
        }
    }

    let report = GenerationReport {
        library: decl.library.name.clone(),
        platform: options.platform,
        package,
        bridges: bridges.bridge_count(),
        generated: supported.into_iter().map(|o| o.name).collect(),
        skipped,
    };
    tracing::info!(
        library = %report.library,
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        "generated stubs"
    );

    Ok(GeneratedStubs {
        managed_source: join_lines(managed),
        native_source: join_lines(native),
        report,
    })
}

/// Record a skippable failure; anything else aborts the run.
fn skip(skipped: &mut Vec<SkippedEntity>, name: &str, err: BridgeError) -> Result<()> {
    match err {
        BridgeError::Unbridgeable { .. }
        | BridgeError::UnsupportedDirection { .. }
        | BridgeError::InvalidDeclaration { .. } => {
            tracing::warn!(entity = name, reason = %err, "skipping entity");
            skipped.push(SkippedEntity {
                name: name.to_string(),
                reason: err.to_string(),
            });
            Ok(())
        }
        BridgeError::InvalidCSignature { detail } => Err(BridgeError::InvalidCSignature {
            detail: format!("{name}: {detail}"),
        }),
        other => Err(other),
    }
}

struct BridgedPrototype {
    sig: CSignature,
    ret: BridgedType,
    params: Vec<BridgedType>,
    names: Vec<String>,
}

fn bridged_prototype(c_signature: &str, word_bits: u8) -> Result<BridgedPrototype> {
    let sig = CSignature::parse(c_signature)?;
    if sig.variadic {
        return Err(BridgeError::InvalidDeclaration {
            detail: "variadic functions cannot be bridged".to_string(),
        });
    }
    let ret = bridged_type_from_ctype(&sig.return_type, word_bits)?;
    let params = sig
        .params
        .iter()
        .map(|p| bridged_type_from_ctype(&p.ty, word_bits))
        .collect::<Result<Vec<_>>>()?;
    let names = sig.param_names();
    Ok(BridgedPrototype {
        sig,
        ret,
        params,
        names,
    })
}

fn function_stub(
    gen: &mut BridgeGenerator,
    caller: NativeBacked,
    func: &ForeignFunction,
    options: &StubOptions,
) -> Result<EntityOutput> {
    let proto = bridged_prototype(&func.c_signature, options.word_bits)?;
    let platform = options.platform;

    let names: Vec<String> = proto.names.iter().map(|n| managed_identifier(n)).collect();
    let values: Vec<TypedValue> = proto
        .params
        .iter()
        .zip(&names)
        .map(|(ty, name)| TypedValue::managed(*ty, name.clone()))
        .collect();

    let c_name = proto.sig.name.clone();
    let c_params = &proto.sig.params;
    let c_ret = &proto.sig.return_type;
    let call = gen.managed_to_native_via(
        caller,
        Some(c_name.as_str()),
        proto.ret,
        &values,
        func.independent,
        |_, params| {
            let args: Vec<String> = params
                .iter()
                .zip(c_params)
                .map(|(p, cp)| native_argument(&cp.ty, p.text(), platform))
                .collect();
            let call = format!("{c_name}({})", args.join(", "));
            Expr::native(native_result(c_ret, &call, platform))
        },
    )?;

    let scope = gen.managed_scope_mut();
    let params: Vec<String> = names
        .iter()
        .zip(&proto.params)
        .map(|(name, ty)| format!("{name}: {}", scope.reference(ty.managed_type())))
        .collect();
    let ret_type = scope.reference(proto.ret.managed_type());
    let wrapper = format!(
        "fun {}({}): {ret_type} = {call}",
        managed_identifier(&func.name),
        params.join(", ")
    );

    Ok(EntityOutput {
        caller,
        name: func.name.clone(),
        managed: vec![wrapper],
        native: Vec::new(),
    })
}

fn callback_stub(
    gen: &mut BridgeGenerator,
    caller: NativeBacked,
    callback: &Callback,
    options: &StubOptions,
) -> Result<EntityOutput> {
    let proto = bridged_prototype(&callback.c_signature, options.word_bits)?;

    let values: Vec<TypedValue> = proto
        .params
        .iter()
        .zip(&proto.names)
        .map(|(ty, name)| TypedValue::native(*ty, name.clone()))
        .collect();

    let target = managed_identifier(&callback.managed_function);
    let call = gen.native_to_managed_via(
        caller,
        Some(target.as_str()),
        proto.ret,
        &values,
        |_, params| {
            let args: Vec<&str> = params.iter().map(Expr::text).collect();
            Expr::managed(format!("{target}({})", args.join(", ")))
        },
    )?;

    let c_params: Vec<String> = proto
        .sig
        .params
        .iter()
        .zip(&proto.names)
        .map(|(p, name)| format!("{} {name}", p.ty))
        .collect();
    let c_params = if c_params.is_empty() {
        "void".to_string()
    } else {
        c_params.join(", ")
    };
    let c_ret = &proto.sig.return_type;
    let body = if proto.ret.is_void() {
        format!("    {call};")
    } else {
        format!("    return ({c_ret}){call};")
    };

    Ok(EntityOutput {
        caller,
        name: callback.name.clone(),
        managed: Vec::new(),
        native: vec![
            format!("{c_ret} {}({c_params}) {{", proto.sig.name),
            body,
            "}".to_string(),
        ],
    })
}

/// Hard keywords that must be escaped when used as managed identifiers.
const MANAGED_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

fn managed_identifier(name: &str) -> String {
    if MANAGED_KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

/// `libm` → `LibmKt`, `my-lib` → `MyLibKt`.
fn default_file_class(library: &str) -> String {
    let mut out = String::new();
    for part in library.split(|c: char| !c.is_ascii_alphanumeric()).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out.push_str("Kt");
    out
}

fn header_comment(library: &str) -> Vec<String> {
    vec![format!("// Generated by stubgen from '{library}'. Do not edit.")]
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
