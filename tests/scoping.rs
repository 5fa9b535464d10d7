//! Lookup of ids across nested `<svg>` elements.

use svgops::{Diagnostic, Op, Paint};

mod utils;

use utils::{assert_balanced, compile, compile_fixture, fill_gradient_ids, registered_gradient_ids};

#[test]
fn nested_svg_shadows_and_hides_definitions() {
    let (ops, diagnostics) = compile_fixture("scoping.svg");

    assert_balanced(&ops);

    assert_eq!(
        registered_gradient_ids(&ops),
        vec!["g".to_string(), "s0:g".to_string(), "s0:private".to_string()]
    );

    // The first nested svg sees its own "g", the sibling and the root see the root's.
    assert_eq!(
        fill_gradient_ids(&ops),
        vec!["s0:g".to_string(), "g".to_string(), "g".to_string()]
    );

    // "private" is only visible inside the first nested svg; the fallback color is used.
    assert_eq!(diagnostics, vec![Diagnostic::unresolved("#private")]);

    assert!(ops.iter().any(|op| matches!(
        op,
        Op::SetFill(Paint::Color(c)) if (c.red, c.green, c.blue) == (0, 128, 0)
    )));
}

#[test]
fn nested_svg_sees_ancestor_definitions() {
    let (ops, diagnostics) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <defs><g id="shared"><rect width="1" height="1"/></g></defs>
              <svg><svg><use href="#shared"/></svg></svg>
            </svg>"##,
    );

    assert!(diagnostics.is_empty());
    assert_eq!(utils::count(&ops, "invoke_object"), 1);
    assert!(ops
        .iter()
        .any(|op| matches!(op, Op::InvokeObject(id, _) if id == "shared")));
}

#[test]
fn definitions_are_visible_before_their_declaration() {
    let (ops, diagnostics) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <use href="#later"/>
              <defs><circle id="later" r="3"/></defs>
            </svg>"##,
    );

    assert!(diagnostics.is_empty());
    assert_eq!(utils::count(&ops, "invoke_object"), 1);
}

#[test]
fn first_definition_of_an_id_wins() {
    let (ops, _) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <defs>
                <rect id="dup" width="1" height="1"/>
                <circle id="dup" r="1"/>
              </defs>
              <use href="#dup"/>
            </svg>"##,
    );

    assert_eq!(utils::count(&ops, "begin_object"), 1);
    assert_eq!(utils::count(&ops, "draw_rounded_rect"), 1);
    assert_eq!(utils::count(&ops, "draw_ellipse"), 0);
}
