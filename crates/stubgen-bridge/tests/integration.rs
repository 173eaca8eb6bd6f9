//! Integration tests for bridge generation across both directions.

use std::cell::Cell;

use stubgen_bridge::{
    generate_stubs, BridgeDeclaration, BridgeError, BridgeGenerator, BridgedType, Expr,
    NativeBackedArena, StubOptions, SymbolNaming, TypedValue,
};
use stubgen_targets::Platform;

fn generator() -> BridgeGenerator {
    BridgeGenerator::new(SymbolNaming::new(Platform::Native, "test"))
}

#[test]
fn int_identity_end_to_end() {
    let mut arena = NativeBackedArena::new();
    let f = arena.create("f");
    let mut gen = generator();

    let call = gen
        .managed_to_native(
            f,
            BridgedType::Int,
            &[TypedValue::managed(BridgedType::Int, "x")],
            false,
            |_, params| params[0].clone(),
        )
        .expect("bridge");
    assert_eq!(call.text(), "kniBridge0(x)");

    let bridges = gen.finalize().expect("finalize");
    assert_eq!(
        bridges.managed_lines().collect::<Vec<_>>(),
        vec![
            "@SymbolName(\"test_kniBridge0\")",
            "private external fun kniBridge0(p0: Int): Int",
        ]
    );
    assert_eq!(
        bridges.native_lines().collect::<Vec<_>>(),
        vec![
            "int32_t test_kniBridge0 (int32_t p0) {",
            "    return (int32_t)p0;",
            "}",
        ]
    );
    assert!(bridges.is_supported(f));
}

/// Identical signatures share one definition pair. The second body still
/// runs; callers with side-effecting bodies must memoize requests themselves.
#[test]
fn duplicate_signature_emits_one_definition_pair() {
    let mut arena = NativeBackedArena::new();
    let f = arena.create("f");
    let g = arena.create("g");
    let mut gen = generator();
    let second_body_ran = Cell::new(false);

    let first = gen
        .managed_to_native(
            f,
            BridgedType::Void,
            &[TypedValue::managed(BridgedType::Int, "a")],
            true,
            |_, p| Expr::native(format!("first({})", p[0])),
        )
        .expect("first bridge");
    let second = gen
        .managed_to_native(
            g,
            BridgedType::Void,
            &[TypedValue::managed(BridgedType::Int, "b")],
            true,
            |_, p| {
                second_body_ran.set(true);
                Expr::native(format!("second({})", p[0]))
            },
        )
        .expect("second bridge");

    assert!(second_body_ran.get());
    assert_eq!(first.text(), "kniBridge0(a)");
    assert_eq!(second.text(), "kniBridge0(b)");

    let bridges = gen.finalize().expect("finalize");
    assert_eq!(bridges.bridge_count(), 1);
    assert_eq!(
        bridges.native_lines().collect::<Vec<_>>(),
        vec!["void test_kniBridge0 (int32_t p0) {", "    first(p0);", "}"]
    );
    assert_eq!(
        bridges.managed_lines().collect::<Vec<_>>(),
        vec![
            "@SymbolName(\"test_kniBridge0\")",
            "@Independent",
            "private external fun kniBridge0(p0: Int): Unit",
        ]
    );
    assert!(bridges.is_supported(f));
    assert!(bridges.is_supported(g));
}

#[test]
fn distinct_signatures_get_distinct_symbols() {
    let mut arena = NativeBackedArena::new();
    let f = arena.create("f");
    let mut gen = generator();

    let by_param = gen
        .managed_to_native(
            f,
            BridgedType::Int,
            &[TypedValue::managed(BridgedType::Long, "x")],
            false,
            |_, p| p[0].clone(),
        )
        .expect("long param");
    let by_ret = gen
        .managed_to_native(
            f,
            BridgedType::Long,
            &[TypedValue::managed(BridgedType::Long, "x")],
            false,
            |_, p| p[0].clone(),
        )
        .expect("long ret");
    let by_independence = gen
        .managed_to_native(
            f,
            BridgedType::Long,
            &[TypedValue::managed(BridgedType::Long, "x")],
            true,
            |_, p| p[0].clone(),
        )
        .expect("independent");

    assert_eq!(by_param.text(), "kniBridge0(x)");
    assert_eq!(by_ret.text(), "kniBridge1(x)");
    assert_eq!(by_independence.text(), "kniBridge2(x)");
    assert_eq!(gen.finalize().expect("finalize").bridge_count(), 3);
}

#[test]
fn output_follows_first_insertion_order_across_directions() {
    let mut arena = NativeBackedArena::new();
    let a = arena.create("a");
    let b = arena.create("b");
    let c = arena.create("c");
    let d = arena.create("d");
    let mut gen = generator();

    gen.managed_to_native(a, BridgedType::Int, &[], false, |_, _| Expr::native("one()"))
        .expect("a");
    gen.native_to_managed(b, BridgedType::Void, &[], |_, _| Expr::managed("two()"))
        .expect("b");
    gen.managed_to_native(c, BridgedType::Double, &[], false, |_, _| Expr::native("three()"))
        .expect("c");
    // Repeats the first shape and must not move it.
    gen.managed_to_native(d, BridgedType::Int, &[], false, |_, _| Expr::native("four()"))
        .expect("d");

    let bridges = gen.finalize().expect("finalize");
    let native: Vec<_> = bridges.native_lines().collect();
    let pos = |needle: &str| {
        native
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    assert!(pos("one()") < pos("test_kniBridge1();"));
    assert!(pos("test_kniBridge1();") < pos("three()"));
    assert!(!native.iter().any(|l| l.contains("four()")));

    let managed: Vec<_> = bridges.managed_lines().collect();
    let mpos = |needle: &str| {
        managed
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("missing {needle}"))
    };
    assert!(mpos("fun kniBridge0") < mpos("two()"));
    assert!(mpos("two()") < mpos("fun kniBridge2"));

    for caller in arena.iter() {
        assert!(bridges.is_supported(caller));
    }
}

#[test]
fn finalize_is_one_shot() {
    let mut arena = NativeBackedArena::new();
    let f = arena.create("f");
    let mut gen = generator();
    gen.finalize().expect("first finalize");

    assert!(matches!(gen.finalize(), Err(BridgeError::AlreadyFinalized)));
    let err = gen
        .managed_to_native(f, BridgedType::Int, &[], false, |_, _| Expr::native("0"))
        .unwrap_err();
    assert!(matches!(err, BridgeError::AlreadyFinalized));
    assert!(matches!(
        gen.insert_raw(f, vec![], vec![]),
        Err(BridgeError::InsertAfterFinalize { .. })
    ));
}

#[test]
fn empty_generator_finalizes_to_nothing() {
    let mut gen = generator();
    let bridges = gen.finalize().expect("finalize");
    assert_eq!(bridges.bridge_count(), 0);
    assert_eq!(bridges.managed_lines().count(), 0);
    assert_eq!(bridges.native_lines().count(), 0);
}

#[test]
fn declaration_to_stubs() {
    let decl = BridgeDeclaration::parse(
        r#"
[library]
name = "counter"
package = "org.example.counter"
headers = ["counter.h"]

[[functions]]
name = "counter_new"
c_signature = "struct counter* counter_new(uint32_t start)"

[[functions]]
name = "counter_add"
c_signature = "uint32_t counter_add(struct counter* c, uint32_t by)"

[[functions]]
name = "counter_free"
c_signature = "void counter_free(struct counter* c)"

[[callbacks]]
name = "counter_overflowed"
c_signature = "void counter_overflowed(struct counter* c)"
managed_function = "onOverflow"
"#,
    )
    .expect("parse declaration");

    let stubs = generate_stubs(&decl, &StubOptions::default()).expect("generate");
    assert_eq!(
        stubs.report.generated,
        vec!["counter_new", "counter_add", "counter_free", "counter_overflowed"]
    );
    assert!(stubs.report.skipped.is_empty());
    assert_eq!(stubs.report.bridges, 4);

    let managed = &stubs.managed_source;
    assert!(managed.contains("fun counter_new(start: UInt): NativePtr = kniBridge0(start)"));
    assert!(managed.contains("fun counter_add(c: NativePtr, by: UInt): UInt = kniBridge1(c, by)"));
    assert!(managed.contains("fun counter_free(c: NativePtr): Unit = kniBridge2(c)"));
    assert!(managed.contains("@ExportForCppRuntime(\"org_example_counter_kniBridge3\")"));

    let native = &stubs.native_source;
    assert!(native.contains("#include <counter.h>"));
    assert!(native.contains("    return (void*)counter_new(p0);"));
    assert!(native.contains("void counter_overflowed(struct counter* c) {"));
    assert!(native.contains("    org_example_counter_kniBridge3(c);"));

    let json = serde_json::to_value(&stubs.report).expect("report json");
    assert_eq!(json["platform"], "native");
    assert_eq!(json["library"], "counter");
}

#[test]
fn same_shape_different_targets_stay_distinct() {
    let decl = BridgeDeclaration::parse(
        r#"
[library]
name = "shapes"
package = "org.example.shapes"

[[functions]]
name = "sin"
c_signature = "double sin(double x)"
independent = true

[[functions]]
name = "cos"
c_signature = "double cos(double x)"
independent = true

[[callbacks]]
name = "on_a"
c_signature = "void on_a(int32_t code)"
managed_function = "handleA"

[[callbacks]]
name = "on_b"
c_signature = "void on_b(int32_t code)"
managed_function = "handleB"
"#,
    )
    .expect("parse declaration");

    let stubs = generate_stubs(&decl, &StubOptions::default()).expect("generate");
    assert_eq!(stubs.report.bridges, 4);

    let managed = &stubs.managed_source;
    assert!(managed.contains("fun sin(x: Double): Double = kniBridge0(x)"));
    assert!(managed.contains("fun cos(x: Double): Double = kniBridge1(x)"));
    assert!(managed.contains("@ExportForCppRuntime(\"org_example_shapes_kniBridge2\")"));
    assert!(managed.contains("@ExportForCppRuntime(\"org_example_shapes_kniBridge3\")"));
    assert!(managed.contains("    handleA(p0)"));
    assert!(managed.contains("    handleB(p0)"));

    let native: Vec<&str> = stubs.native_source.lines().collect();
    let line_after = |header: &str| {
        let at = native
            .iter()
            .position(|l| *l == header)
            .unwrap_or_else(|| panic!("missing {header}"));
        native[at + 1]
    };
    assert_eq!(
        line_after("double org_example_shapes_kniBridge0 (double p0) {"),
        "    return (double)sin(p0);"
    );
    assert_eq!(
        line_after("double org_example_shapes_kniBridge1 (double p0) {"),
        "    return (double)cos(p0);"
    );
    assert_eq!(line_after("void on_a(int32_t code) {"), "    org_example_shapes_kniBridge2(code);");
    assert_eq!(line_after("void on_b(int32_t code) {"), "    org_example_shapes_kniBridge3(code);");

    // Each managed export reaches its own handler.
    let export_body = |symbol: &str| {
        let lines: Vec<&str> = managed.lines().collect();
        let at = lines
            .iter()
            .position(|l| *l == format!("@ExportForCppRuntime(\"{symbol}\")"))
            .unwrap_or_else(|| panic!("missing export {symbol}"));
        lines[at + 2].to_string()
    };
    assert_eq!(export_body("org_example_shapes_kniBridge2"), "    handleA(p0)");
    assert_eq!(export_body("org_example_shapes_kniBridge3"), "    handleB(p0)");
}
