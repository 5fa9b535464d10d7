//! Affine transforms and the `transform` attribute.
//!
//! A [`Transform`] maps user coordinates as
//!
//! ```text
//! x' = xx * x + xy * y + x0
//! y' = yx * x + yy * y + y0
//! ```
//!
//! `Transform::multiply(a, b)` is the transform that applies `a` first and then `b`.  When
//! we descend into a child element whose local transform is `local`, the child's
//! coordinates are mapped into the parent's by `parent.pre_transform(&local)`: the local
//! transform takes effect in the frame the parent established.
//!
//! Transform lists are parsed with [`TransformList`], which skips the functions it does
//! not understand instead of failing.  See the [transform attribute syntax][syntax].
//!
//! [syntax]:  https://www.w3.org/TR/SVG11/coords.html#TransformAttribute

use cssparser::{Parser, ParserInput, Token};

use crate::angle::Angle;
use crate::error::*;
use crate::parsers::{optional_comma, Parse};
use crate::rect::Rect;
use crate::session::Session;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    /// Creates a transform from the six values of an SVG `matrix(a b c d e f)`.
    #[inline]
    pub fn new_unchecked(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            xy,
            x0,
            yx,
            yy,
            y0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Self::new_unchecked(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    #[inline]
    pub fn new_rotate(a: Angle) -> Self {
        let (s, c) = a.radians().sin_cos();
        Self::new_unchecked(c, s, -s, c, 0.0, 0.0)
    }

    /// Rotation by `a` around the pivot `(cx, cy)`.
    pub fn new_rotate_around(a: Angle, cx: f64, cy: f64) -> Self {
        Transform::new_translate(cx, cy)
            .pre_rotate(a)
            .pre_translate(-cx, -cy)
    }

    #[inline]
    pub fn new_skew(ax: Angle, ay: Angle) -> Self {
        Self::new_unchecked(1.0, ay.radians().tan(), ax.radians().tan(), 1.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn multiply(t1: &Transform, t2: &Transform) -> Self {
        Transform {
            xx: t1.xx * t2.xx + t1.yx * t2.xy,
            yx: t1.xx * t2.yx + t1.yx * t2.yy,
            xy: t1.xy * t2.xx + t1.yy * t2.xy,
            yy: t1.xy * t2.yx + t1.yy * t2.yy,
            x0: t1.x0 * t2.xx + t1.y0 * t2.xy + t2.x0,
            y0: t1.x0 * t2.yx + t1.y0 * t2.yy + t2.y0,
        }
    }

    /// Applies `t` first, then `self`.
    #[inline]
    pub fn pre_transform(&self, t: &Transform) -> Self {
        Self::multiply(t, self)
    }

    /// Applies `self` first, then `t`.
    #[inline]
    pub fn post_transform(&self, t: &Transform) -> Self {
        Self::multiply(self, t)
    }

    #[inline]
    pub fn pre_translate(&self, x: f64, y: f64) -> Self {
        self.pre_transform(&Transform::new_translate(x, y))
    }

    #[inline]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Self {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    #[inline]
    pub fn pre_rotate(&self, angle: Angle) -> Self {
        self.pre_transform(&Transform::new_rotate(angle))
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }

    #[inline]
    fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    #[inline]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();

        det != 0.0 && det.is_finite()
    }

    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;

        Some(Transform::new_unchecked(
            inv_det * self.yy,
            inv_det * (-self.yx),
            inv_det * (-self.xy),
            inv_det * self.xx,
            inv_det * (self.xy * self.y0 - self.yy * self.x0),
            inv_det * (self.yx * self.x0 - self.xx * self.y0),
        ))
    }

    #[inline]
    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.xx + dy * self.xy, dx * self.yx + dy * self.yy)
    }

    #[inline]
    pub fn transform_point(&self, px: f64, py: f64) -> (f64, f64) {
        let (x, y) = self.transform_distance(px, py);
        (x + self.x0, y + self.y0)
    }

    /// Axis-aligned bounds of the rectangle's four transformed corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|(x, y)| self.transform_point(x, y));

        Rect::from_points(&corners).unwrap_or_default()
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

/// A parsed `transform` attribute.
///
/// Functions that can't be parsed are left out of the composed transform and their
/// source text is kept in `skipped` for diagnostics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransformList {
    pub transform: Transform,
    pub skipped: Vec<String>,
}

impl TransformList {
    /// Parses a whole transform list; this never fails.
    pub fn parse_lenient(s: &str) -> TransformList {
        let mut input = ParserInput::new(s);
        let mut parser = Parser::new(&mut input);

        // Parsing is lenient, so this can't return an error.
        Self::parse(&mut parser).unwrap_or_default()
    }

    /// Reports each function that was left out of the transform.
    pub fn report_skipped(&self, session: &Session) {
        for function in &self.skipped {
            session.report(Diagnostic::unsupported(&format!(
                "transform function \"{function}\""
            )));
        }
    }
}

impl Parse for TransformList {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<TransformList, ParseError<'i>> {
        let mut list = TransformList::default();

        loop {
            optional_comma(parser);

            if parser.is_exhausted() {
                break;
            }

            let start = parser.position();

            // Each failed command still consumes at least one token.
            match parse_transform_command(parser) {
                Ok(t) => list.transform = t.post_transform(&list.transform),
                Err(_) => list
                    .skipped
                    .push(parser.slice_from(start).trim().to_string()),
            }
        }

        Ok(list)
    }
}

/// Convenience function for the common case of not caring about skipped functions.
pub fn parse_transform(s: &str) -> Transform {
    TransformList::parse_lenient(s).transform
}

fn parse_transform_command<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    let loc = parser.current_source_location();

    match parser.next()?.clone() {
        Token::Function(ref name) => parse_transform_function(name, parser),

        Token::Ident(ref name) => {
            parser.try_parse(|p| p.expect_parenthesis_block())?;
            parse_transform_function(name, parser)
        }

        tok => Err(loc.new_unexpected_token_error(tok.clone())),
    }
}

fn parse_transform_function<'i>(
    name: &str,
    parser: &mut Parser<'i, '_>,
) -> Result<Transform, ParseError<'i>> {
    let loc = parser.current_source_location();

    match name {
        "matrix" => parse_matrix_args(parser),
        "translate" => parse_translate_args(parser),
        "scale" => parse_scale_args(parser),
        "rotate" => parse_rotate_args(parser),
        "skewX" => parse_skew_x_args(parser),
        "skewY" => parse_skew_y_args(parser),
        _ => {
            // eat the arguments so they show up in the skipped text
            parser.parse_nested_block(|p| {
                while p.next().is_ok() {}
                Ok::<_, ParseError<'i>>(())
            })?;

            Err(loc.new_custom_error(ValueErrorKind::parse_error(
                "expected matrix|translate|scale|rotate|skewX|skewY",
            )))
        }
    }
}

fn parse_matrix_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let xx = f64::parse(p)?;
        optional_comma(p);

        let yx = f64::parse(p)?;
        optional_comma(p);

        let xy = f64::parse(p)?;
        optional_comma(p);

        let yy = f64::parse(p)?;
        optional_comma(p);

        let x0 = f64::parse(p)?;
        optional_comma(p);

        let y0 = f64::parse(p)?;

        Ok(Transform::new_unchecked(xx, yx, xy, yy, x0, y0))
    })
}

fn parse_translate_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let tx = f64::parse(p)?;

        let ty = p
            .try_parse(|p| {
                optional_comma(p);
                f64::parse(p)
            })
            .unwrap_or(0.0);

        Ok(Transform::new_translate(tx, ty))
    })
}

fn parse_scale_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let x = f64::parse(p)?;

        let y = p
            .try_parse(|p| {
                optional_comma(p);
                f64::parse(p)
            })
            .unwrap_or(x);

        Ok(Transform::new_scale(x, y))
    })
}

fn parse_rotate_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let angle = Angle::from_degrees(f64::parse(p)?);

        let (cx, cy) = p
            .try_parse(|p| -> Result<_, ParseError<'_>> {
                optional_comma(p);
                let cx = f64::parse(p)?;

                optional_comma(p);
                let cy = f64::parse(p)?;

                Ok((cx, cy))
            })
            .unwrap_or((0.0, 0.0));

        Ok(Transform::new_rotate_around(angle, cx, cy))
    })
}

fn parse_skew_x_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let angle = Angle::from_degrees(f64::parse(p)?);
        Ok(Transform::new_skew(angle, Angle::new(0.0)))
    })
}

fn parse_skew_y_args<'i>(parser: &mut Parser<'i, '_>) -> Result<Transform, ParseError<'i>> {
    parser.parse_nested_block(|p| {
        let angle = Angle::from_degrees(f64::parse(p)?);
        Ok(Transform::new_skew(Angle::new(0.0), angle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::ApproxEq;
    use proptest::prelude::*;

    fn assert_transform_eq(t1: &Transform, t2: &Transform) {
        let epsilon = 8.0 * f64::EPSILON; // kind of arbitrary, but allow for some sloppiness

        assert!(t1.xx.approx_eq(t2.xx, (epsilon, 1)), "{t1:?} != {t2:?}");
        assert!(t1.yx.approx_eq(t2.yx, (epsilon, 1)), "{t1:?} != {t2:?}");
        assert!(t1.xy.approx_eq(t2.xy, (epsilon, 1)), "{t1:?} != {t2:?}");
        assert!(t1.yy.approx_eq(t2.yy, (epsilon, 1)), "{t1:?} != {t2:?}");
        assert!(t1.x0.approx_eq(t2.x0, (epsilon, 1)), "{t1:?} != {t2:?}");
        assert!(t1.y0.approx_eq(t2.y0, (epsilon, 1)), "{t1:?} != {t2:?}");
    }

    fn assert_point_eq(p: (f64, f64), expected: (f64, f64)) {
        assert!(
            p.0.approx_eq(expected.0, (1e-9, 2)) && p.1.approx_eq(expected.1, (1e-9, 2)),
            "{p:?} != {expected:?}"
        );
    }

    #[test]
    fn test_multiply() {
        let t1 = Transform::identity();
        let t2 = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_transform_eq(&Transform::multiply(&t1, &t2), &t2);
        assert_transform_eq(&Transform::multiply(&t2, &t1), &t2);

        let t1 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 10.0, 10.0);
        let t2 = Transform::new_unchecked(1.0, 0.0, 0.0, 1.0, -10.0, -10.0);
        let r1 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        let r2 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 5.0, 5.0);
        assert_transform_eq(&Transform::multiply(&t1, &t2), &r1);
        assert_transform_eq(&Transform::multiply(&t2, &t1), &r2);
    }

    #[test]
    fn composition_is_not_commutative() {
        let t = Transform::new_translate(10.0, 0.0);
        let s = Transform::new_scale(2.0, 2.0);

        assert_ne!(Transform::multiply(&t, &s), Transform::multiply(&s, &t));
    }

    #[test]
    fn test_invert() {
        let t = Transform::new_unchecked(2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(!t.is_invertible());
        assert!(t.invert().is_none());

        let t = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let i = t.invert().unwrap();
        assert_transform_eq(&t.pre_transform(&i), &Transform::identity());
        assert_transform_eq(&t.post_transform(&i), &Transform::identity());
    }

    #[test]
    fn applies_leftmost_function_last() {
        let t = parse_transform("translate(10,0) scale(2)");
        assert_point_eq(t.transform_point(1.0, 0.0), (12.0, 0.0));
    }

    #[test]
    fn rotates_around_pivot() {
        let t = parse_transform("rotate(90,1,1)");
        assert_point_eq(t.transform_point(1.0, 0.0), (2.0, 1.0));
    }

    #[test]
    fn parses_matrix() {
        assert_transform_eq(
            &parse_transform("matrix (1 2 3 4 5 6)"),
            &Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0),
        );

        assert_transform_eq(
            &parse_transform("matrix(1,2.25,-3.25e2,4 5 6)"),
            &Transform::new_unchecked(1.0, 2.25, -325.0, 4.0, 5.0, 6.0),
        );
    }

    #[test]
    fn optional_arguments_take_defaults() {
        assert_transform_eq(
            &parse_transform("translate(-1)"),
            &Transform::new_translate(-1.0, 0.0),
        );

        assert_transform_eq(&parse_transform("scale(3)"), &Transform::new_scale(3.0, 3.0));

        assert_transform_eq(
            &parse_transform("rotate(30)"),
            &Transform::new_rotate(Angle::from_degrees(30.0)),
        );
    }

    #[test]
    fn parses_skews() {
        assert_transform_eq(
            &parse_transform("skewX (30)"),
            &Transform::new_skew(Angle::from_degrees(30.0), Angle::new(0.0)),
        );

        assert_transform_eq(
            &parse_transform("skewY (30)"),
            &Transform::new_skew(Angle::new(0.0), Angle::from_degrees(30.0)),
        );
    }

    #[test]
    fn parses_transform_list() {
        let t = Transform::new_translate(20.0, 30.0);
        let s = Transform::new_scale(10.0, 10.0);
        let r = Transform::new_rotate_around(Angle::from_degrees(30.0), 10.0, 10.0);

        assert_transform_eq(
            &parse_transform("translate(20, 30), scale (10) rotate (30 10 10)"),
            &Transform::multiply(&r, &Transform::multiply(&s, &t)),
        );
    }

    #[test]
    fn empty_string_is_identity() {
        assert!(parse_transform("").is_identity());
        assert!(parse_transform("   ").is_identity());
    }

    #[test]
    fn skips_unknown_functions() {
        let list = TransformList::parse_lenient("translate(5) frobnicate(1 2) scale(2)");

        assert_transform_eq(
            &list.transform,
            &Transform::multiply(&Transform::new_scale(2.0, 2.0), &Transform::new_translate(5.0, 0.0)),
        );
        assert_eq!(list.skipped, vec!["frobnicate(1 2)".to_string()]);
    }

    #[test]
    fn skips_malformed_functions() {
        let list = TransformList::parse_lenient("scale(1,) bogus translate(3 4)");

        assert_transform_eq(&list.transform, &Transform::new_translate(3.0, 4.0));
        assert_eq!(list.skipped.len(), 2);
    }

    #[test]
    fn transforms_rect_to_axis_aligned_bounds() {
        let r = Rect::new(0.0, 0.0, 10.0, 20.0);

        assert_eq!(
            Transform::new_translate(5.0, 5.0).transform_rect(&r),
            Rect::new(5.0, 5.0, 15.0, 25.0)
        );

        let rotated = Transform::new_rotate(Angle::from_degrees(90.0)).transform_rect(&r);
        assert!(rotated.approx_eq(&Rect::new(-20.0, 0.0, 0.0, 10.0)));
    }

    fn small_transform() -> impl Strategy<Value = Transform> {
        let c = -10.0..10.0f64;
        (c.clone(), c.clone(), c.clone(), c.clone(), c.clone(), c)
            .prop_map(|(a, b, c, d, e, f)| Transform::new_unchecked(a, b, c, d, e, f))
    }

    proptest! {
        #[test]
        fn composition_is_associative(a in small_transform(), b in small_transform(), c in small_transform()) {
            let left = Transform::multiply(&Transform::multiply(&a, &b), &c);
            let right = Transform::multiply(&a, &Transform::multiply(&b, &c));

            for (l, r) in [
                (left.xx, right.xx), (left.yx, right.yx), (left.xy, right.xy),
                (left.yy, right.yy), (left.x0, right.x0), (left.y0, right.y0),
            ] {
                prop_assert!((l - r).abs() <= 1e-9 * (1.0 + l.abs().max(r.abs())));
            }
        }

        #[test]
        fn identity_is_neutral(a in small_transform()) {
            prop_assert_eq!(Transform::multiply(&a, &Transform::identity()), a);
            prop_assert_eq!(Transform::multiply(&Transform::identity(), &a), a);
        }
    }
}
