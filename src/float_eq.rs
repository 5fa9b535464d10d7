//! Utilities to compare floating-point numbers.

use float_cmp::ApproxEq;

/// Smallest difference between two coordinates that a backend is expected to preserve.
///
/// Vector document formats usually print coordinates with a handful of decimals;
/// anything closer than this is the same point for our purposes.
pub const COORDINATE_EPSILON: f64 = 1e-6;

/// Checks whether two floating-point numbers are approximately equal in user units.
///
/// We implement this trait for `f64`, so that two numbers can be considered "close
/// enough to equal" if their absolute difference is smaller than [`COORDINATE_EPSILON`],
/// and finally allow a difference of 1 unit-in-the-last-place (ULP) for very large
/// values.
pub trait ApproxEqUnits: ApproxEq {
    fn approx_eq_units(self, other: Self) -> bool;
}

impl ApproxEqUnits for f64 {
    fn approx_eq_units(self, other: f64) -> bool {
        self.approx_eq(other, (COORDINATE_EPSILON, 1))
    }
}

// Macro for usage in unit tests
#[doc(hidden)]
#[macro_export]
macro_rules! assert_approx_eq_units {
    ($left:expr, $right:expr) => {{
        match ($left, $right) {
            (l, r) => {
                if !$crate::float_eq::ApproxEqUnits::approx_eq_units(l, r) {
                    panic!(
                        r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        l, r
                    )
                }
            }
        }
    }};
}
