use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Return `v` when finite, otherwise `fallback`.
#[inline]
pub fn finite_or(v: Real, fallback: Real) -> Real {
    if v.is_finite() { v } else { fallback }
}

/// Closed interval used to keep physical quantities inside a plausible range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Real,
    pub max: Real,
}

impl Bounds {
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, what: &'static str) -> Result<(), CoreError> {
        ensure_finite(self.min, what)?;
        ensure_finite(self.max, what)?;
        if self.min > self.max {
            return Err(CoreError::InvalidArg { what });
        }
        Ok(())
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.min && v <= self.max
    }

    /// Clamp `v` into the interval. A non-finite `v` is replaced by `fallback`
    /// before clamping.
    pub fn clamp_or(&self, v: Real, fallback: Real) -> Real {
        finite_or(v, fallback).clamp(self.min, self.max)
    }

    pub fn check(&self, v: Real, what: &'static str) -> Result<Real, CoreError> {
        let v = ensure_finite(v, what)?;
        if self.contains(v) {
            Ok(v)
        } else {
            Err(CoreError::OutOfRange {
                what,
                value: v,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn bounds_clamp_replaces_non_finite() {
        let b = Bounds::new(-50.0, 150.0);
        assert_eq!(b.clamp_or(f64::NAN, 20.0), 20.0);
        assert_eq!(b.clamp_or(f64::INFINITY, 20.0), 20.0);
        assert_eq!(b.clamp_or(200.0, 20.0), 150.0);
        assert_eq!(b.clamp_or(-80.0, 20.0), -50.0);
    }

    #[test]
    fn bounds_check_reports_range() {
        let b = Bounds::new(0.0, 1.0);
        assert!(b.check(0.5, "x").is_ok());
        assert!(matches!(
            b.check(2.0, "x"),
            Err(CoreError::OutOfRange { .. })
        ));
        assert!(Bounds::new(2.0, 1.0).validate("inverted").is_err());
    }

    proptest::proptest! {
        #[test]
        fn clamp_or_stays_inside(v in proptest::num::f64::ANY, lo in -100.0f64..0.0, span in 0.0f64..200.0) {
            let b = Bounds::new(lo, lo + span);
            let c = b.clamp_or(v, lo);
            proptest::prop_assert!(b.contains(c));
        }
    }
}
