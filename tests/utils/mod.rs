//! Utilities for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use svgops::{CompileOptions, Compiler, Diagnostic, Loader, Op, RecordingEmitter};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Compiles a document into its list of operations and the diagnostics it produced.
pub fn compile(svg: &str) -> (Vec<Op>, Vec<Diagnostic>) {
    compile_with_options(svg, CompileOptions::default())
}

pub fn compile_with_options(svg: &str, options: CompileOptions) -> (Vec<Op>, Vec<Diagnostic>) {
    let document = Loader::new()
        .with_logging(false)
        .read_str(svg)
        .unwrap_or_else(|e| panic!("could not load document: {e}"));

    let mut emitter = RecordingEmitter::new();
    let diagnostics = Compiler::new(&document)
        .with_options(options)
        .compile(&mut emitter);

    (emitter.into_ops(), diagnostics)
}

pub fn compile_fixture(name: &str) -> (Vec<Op>, Vec<Diagnostic>) {
    let document = Loader::new()
        .with_logging(false)
        .read_path(fixture_path(name))
        .unwrap_or_else(|e| panic!("could not load {name}: {e}"));

    let mut emitter = RecordingEmitter::new();
    let diagnostics = Compiler::new(&document).compile(&mut emitter);

    (emitter.into_ops(), diagnostics)
}

/// Number of operations with a given name, as in [`Op::name`].
pub fn count(ops: &[Op], name: &str) -> usize {
    ops.iter().filter(|op| op.name() == name).count()
}

/// Ids of the gradients used by fill operations, in order.
pub fn fill_gradient_ids(ops: &[Op]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| match op {
            Op::SetFill(svgops::Paint::Gradient { id, .. }) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

/// Ids of the registered gradients, in order.
pub fn registered_gradient_ids(ops: &[Op]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| match op {
            Op::RegisterGradient(id, _) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

/// Checks that push/pop and begin/end pairs are properly nested.
pub fn assert_balanced(ops: &[Op]) {
    let mut stack = Vec::new();

    for op in ops {
        match op {
            Op::PushState => stack.push("state"),
            Op::BeginObject { .. } => stack.push("object"),
            Op::PopState => assert_eq!(stack.pop(), Some("state"), "unbalanced pop_state"),
            Op::EndObject => assert_eq!(stack.pop(), Some("object"), "unbalanced end_object"),
            _ => (),
        }
    }

    assert!(stack.is_empty(), "unclosed {stack:?}");
}
