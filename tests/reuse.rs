//! Definitions are compiled into objects once, and invoked for every reference.

use pretty_assertions::assert_eq;
use svgops::{BoundingBox, CompileOptions, Op, Transform};

mod utils;

use utils::{assert_balanced, compile, compile_fixture, compile_with_options, count};

#[test]
fn referenced_group_is_compiled_once() {
    let (ops, diagnostics) = compile_fixture("reuse.svg");

    assert!(diagnostics.is_empty());
    assert_balanced(&ops);

    assert_eq!(count(&ops, "begin_object"), 1);
    assert_eq!(count(&ops, "end_object"), 1);
    assert_eq!(count(&ops, "draw_ellipse"), 1);

    assert_eq!(
        ops.iter()
            .find(|op| matches!(op, Op::BeginObject { .. }))
            .cloned(),
        Some(Op::BeginObject {
            id: "dot".to_string(),
            bbox: BoundingBox::new(-2.0, -2.0, 4.0, 4.0),
            transform: Transform::identity(),
        })
    );

    let invocations: Vec<Op> = ops
        .iter()
        .filter(|op| matches!(op, Op::InvokeObject(..)))
        .cloned()
        .collect();

    assert_eq!(
        invocations,
        vec![
            Op::InvokeObject("dot".to_string(), Transform::new_translate(10.0, 0.0)),
            Op::InvokeObject("dot".to_string(), Transform::new_translate(20.0, 5.0)),
        ]
    );
}

#[test]
fn objects_are_defined_before_they_are_invoked() {
    let (ops, _) = compile_fixture("reuse.svg");

    let end = ops.iter().position(|op| *op == Op::EndObject).unwrap();
    let first_invoke = ops
        .iter()
        .position(|op| matches!(op, Op::InvokeObject(..)))
        .unwrap();

    assert!(end < first_invoke);
}

#[test]
fn unreferenced_definitions_are_still_compiled() {
    let (ops, _) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <defs><rect id="unused" width="5" height="5"/></defs>
            </svg>"##,
    );

    assert_eq!(count(&ops, "begin_object"), 1);
    assert_eq!(count(&ops, "invoke_object"), 0);
}

#[test]
fn compiling_twice_gives_the_same_operations() {
    let svg = std::fs::read_to_string(utils::fixture_path("reuse.svg")).unwrap();
    let document = svgops::Loader::new().read_str(&svg).unwrap();

    let mut first = svgops::RecordingEmitter::new();
    let mut second = svgops::RecordingEmitter::new();

    svgops::Compiler::new(&document).compile(&mut first);
    svgops::Compiler::new(&document).compile(&mut second);

    assert_eq!(first.ops(), second.ops());
}

#[test]
fn symbols_are_instantiated_through_use() {
    let (ops, diagnostics) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
              <symbol id="s" viewBox="0 0 10 10"><rect width="10" height="10"/></symbol>
              <use href="#s" width="20" height="20"/>
            </svg>"##,
    );

    assert!(diagnostics.is_empty());
    assert_eq!(count(&ops, "begin_object"), 1);
    assert_eq!(
        ops.iter()
            .find(|op| matches!(op, Op::InvokeObject(..)))
            .cloned(),
        Some(Op::InvokeObject("s".to_string(), Transform::new_scale(2.0, 2.0)))
    );
}

#[test]
fn max_depth_is_configurable() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg">
                    <g><g><g><rect width="1" height="1"/></g></g></g>
                  </svg>"##;

    let (ops, diagnostics) = compile_with_options(svg, CompileOptions::default());
    assert!(diagnostics.is_empty());
    assert_eq!(count(&ops, "draw_rounded_rect"), 1);

    let (ops, diagnostics) =
        compile_with_options(svg, CompileOptions::default().with_max_depth(2));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(count(&ops, "draw_rounded_rect"), 0);
}
