use crate::CoreError;

/// Floating point type used for range arithmetic.
pub type Real = f64;

/// Tolerance used when comparing a stepped value against a range boundary.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// True when `value` is within tolerance of `target`, measured against the
/// size of the step that produced it rather than the magnitude of `value`.
/// A value one whole step away is never within.
pub fn within_step(value: Real, target: Real, step: Real, tol: Tolerances) -> bool {
    (value - target).abs() <= tol.abs + tol.rel * step.abs()
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_absorbs_accumulated_drift() {
        let tol = Tolerances::default();
        let drifted = 0.1 + 0.1 + 0.1;
        assert!(nearly_equal(drifted, 0.3, tol));
        assert!(!nearly_equal(0.3, 0.30001, tol));
    }

    #[test]
    fn within_step_scales_with_the_step() {
        let tol = Tolerances::default();
        assert!(within_step(1.0 + 1e-13, 1.0, 0.1, tol));
        assert!(!within_step(0.9, 1.0, 0.1, tol));
        // 100 apart at 1e12 is a whole step, not rounding noise.
        assert!(nearly_equal(1e12 + 400.0, 1e12 + 500.0, tol));
        assert!(!within_step(1e12 + 400.0, 1e12 + 500.0, 100.0, tol));
        assert!(within_step(1e12 + 500.0, 1e12 + 500.0, 100.0, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "step").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
        assert_eq!(ensure_finite(2.5, "step"), Ok(2.5));
    }
}
