use crate::SgError;

/// Floating point type used throughout the models
pub type Real = f64;

/// Absolute and relative bounds for comparing model outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Tight bounds for values that follow from a short chain of exact
    /// arithmetic (cleaning fractions, clock sums).
    pub const EXACT: Tolerances = Tolerances {
        abs: 1e-12,
        rel: 1e-9,
    };

    /// Bounds for quantities reported after a few steps of integration,
    /// where trace fouling shifts results slightly.
    pub const STEPPED: Tolerances = Tolerances {
        abs: 1e-6,
        rel: 1e-6,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::EXACT
    }
}

/// True when `a` and `b` agree within either bound of `tol`.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SgError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SgError::NonFinite { what, value: v })
    }
}

/// Require `v` to be finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, SgError> {
    ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(SgError::InvalidArg { what })
    }
}

/// Require `v` to lie in the closed interval `[min, max]`.
pub fn ensure_in_range(
    v: Real,
    min: Real,
    max: Real,
    what: &'static str,
) -> Result<Real, SgError> {
    ensure_finite(v, what)?;
    if (min..=max).contains(&v) {
        Ok(v)
    } else {
        Err(SgError::OutOfRange {
            what,
            value: v,
            min,
            max,
        })
    }
}

/// Clip a value to `[min, max]`. NaN collapses to `min` so that a clipped
/// quantity is always usable downstream.
pub fn clip(value: Real, min: Real, max: Real) -> Real {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Return `value` when finite, otherwise `fallback`.
pub fn finite_or(value: Real, fallback: Real) -> Real {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerances_bound_absolute_and_relative_error() {
        assert!(nearly_equal(0.075, 0.3 * 0.25, Tolerances::EXACT));
        assert!(nearly_equal(0.0, 1e-13, Tolerances::EXACT));
        assert!(nearly_equal(1.0e9, 1.0e9 + 0.5, Tolerances::EXACT));
        assert!(!nearly_equal(0.075, 0.0751, Tolerances::EXACT));
        assert!(nearly_equal(555.0, 555.0 * (1.0 - 1e-7), Tolerances::STEPPED));
        assert!(!nearly_equal(555.0, 554.0, Tolerances::STEPPED));
        assert_eq!(Tolerances::default(), Tolerances::EXACT);
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(1.0, "x").is_ok());
        assert!(matches!(
            ensure_positive(0.0, "x"),
            Err(SgError::InvalidArg { what: "x" })
        ));
    }

    #[test]
    fn range_check_reports_bounds() {
        let err = ensure_in_range(1.5, 0.0, 1.0, "fraction").unwrap_err();
        assert!(err.to_string().contains("fraction"));
        assert!(ensure_in_range(1.0, 0.0, 1.0, "fraction").is_ok());
    }

    #[test]
    fn clip_handles_nan_and_bounds() {
        assert_eq!(clip(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clip(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clip(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clip(Real::NAN, 8.0, 16.0), 8.0);
    }

    #[test]
    fn finite_or_substitutes() {
        assert_eq!(finite_or(2.0, 1.0), 2.0);
        assert_eq!(finite_or(Real::INFINITY, 1.0), 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clip_stays_in_bounds(v in proptest::num::f64::ANY, lo in -100.0_f64..0.0, hi in 0.0_f64..100.0) {
            let c = clip(v, lo, hi);
            prop_assert!(c >= lo && c <= hi);
        }
    }
}
