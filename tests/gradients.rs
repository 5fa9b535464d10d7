//! Gradient registration, inheritance and paint matrices.

use matches::assert_matches;
use svgops::{GradientKind, GradientUnits, Op, Paint, SpreadMethod, Transform};

mod utils;

use utils::{compile, count, registered_gradient_ids};

const DOCUMENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200">
  <defs>
    <linearGradient id="fade">
      <stop offset="0" stop-color="red" stop-opacity="0.5"/>
      <stop offset="1" stop-color="blue"/>
    </linearGradient>
    <linearGradient id="derived" href="#fade" x2="0" y2="1" spreadMethod="reflect"/>
  </defs>
  <rect x="10" y="20" width="100" height="50" fill="url(#fade)"/>
  <rect width="10" height="10" fill="url(#derived)" fill-opacity="0.5"/>
</svg>"##;

fn registered(ops: &[Op], id: &str) -> svgops::GradientPaint {
    ops.iter()
        .find_map(|op| match op {
            Op::RegisterGradient(i, g) if i == id => Some(g.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("gradient {id} was not registered"))
}

#[test]
fn gradients_are_registered_once() {
    let (ops, diagnostics) = compile(DOCUMENT);

    assert!(diagnostics.is_empty());
    assert_eq!(
        registered_gradient_ids(&ops),
        vec!["fade".to_string(), "derived".to_string()]
    );
    assert_eq!(count(&ops, "register_gradient"), 2);
}

#[test]
fn stop_opacity_is_averaged() {
    let (ops, _) = compile(DOCUMENT);

    let fade = registered(&ops, "fade");
    assert_eq!(fade.stops.len(), 2);
    assert_eq!(fade.opacity, Some(0.75));
    assert_eq!(fade.units, GradientUnits::ObjectBoundingBox);
    assert_eq!(fade.spread, SpreadMethod::Pad);
    assert_eq!(
        fade.kind,
        GradientKind::Linear {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 0.0
        }
    );
}

#[test]
fn href_inherits_stops_and_attributes() {
    let (ops, _) = compile(DOCUMENT);

    let derived = registered(&ops, "derived");
    assert_eq!(derived.stops, registered(&ops, "fade").stops);
    assert_eq!(derived.spread, SpreadMethod::Reflect);
    assert_eq!(
        derived.kind,
        GradientKind::Linear {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 1.0
        }
    );
}

#[test]
fn bounding_box_units_map_to_the_shape() {
    let (ops, _) = compile(DOCUMENT);

    let fills: Vec<&Paint> = ops
        .iter()
        .filter_map(|op| match op {
            Op::SetFill(p) => Some(p),
            _ => None,
        })
        .collect();

    assert_eq!(
        fills,
        vec![
            &Paint::Gradient {
                id: "fade".to_string(),
                matrix: Transform::new_unchecked(100.0, 0.0, 0.0, 50.0, 10.0, 20.0),
                opacity: 1.0,
            },
            &Paint::Gradient {
                id: "derived".to_string(),
                matrix: Transform::new_unchecked(10.0, 0.0, 0.0, 10.0, 0.0, 0.0),
                opacity: 0.5,
            },
        ]
    );
}

#[test]
fn single_stop_is_a_solid_color() {
    let (ops, _) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <linearGradient id="one"><stop offset="0.5" stop-color="#ff0000" stop-opacity="0.5"/></linearGradient>
              <rect width="10" height="10" fill="url(#one)"/>
            </svg>"##,
    );

    assert_matches!(
        ops.iter().find(|op| matches!(op, Op::SetFill(_))),
        Some(Op::SetFill(Paint::Color(c))) if c.red == 255 && c.alpha == 128
    );
}

#[test]
fn gradient_without_stops_paints_nothing() {
    let (ops, _) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <linearGradient id="empty"/>
              <rect width="10" height="10" fill="url(#empty)"/>
            </svg>"##,
    );

    assert_eq!(count(&ops, "set_fill"), 0);
    assert_eq!(count(&ops, "draw_rounded_rect"), 0);
}

#[test]
fn zero_height_bbox_disables_bounding_box_gradients() {
    let (ops, _) = compile(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
              <linearGradient id="g">
                <stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue"/>
              </linearGradient>
              <line x1="0" y1="5" x2="10" y2="5" stroke="url(#g)"/>
            </svg>"##,
    );

    assert_eq!(count(&ops, "draw_line"), 0);
}
