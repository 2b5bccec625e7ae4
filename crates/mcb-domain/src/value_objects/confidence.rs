//! Resolution confidence, clamped to `[0, 1]` (§4.4, §4.5).

use crate::error::{Error, Result};

/// A confidence score in the closed interval `[0.0, 1.0]`.
///
/// The Cross-Language Resolver's "resolution monotonicity" invariant
/// (§8) requires every emitted edge to carry `confidence >= 0.7`; this
/// type only guarantees the wider `[0, 1]` range, the stricter
/// per-stage floor is enforced by the resolver itself.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Confidence(f64);

/// Confidence floor below which the resolver must not emit an edge
/// (§8 "Resolution monotonicity").
pub const RESOLUTION_FLOOR: Confidence = Confidence(0.7);

impl Confidence {
    /// The maximum confidence, used for exact matches (strategies 1-4,
    /// §4.5).
    pub const EXACT: Self = Self(1.0);

    /// Build a confidence value, rejecting anything outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is outside the
    /// closed unit interval or is NaN.
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidArgument {
                message: format!("confidence {value} is outside [0, 1]"),
            });
        }
        Ok(Self(value))
    }

    /// The raw `f64` value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this confidence clears the resolver's emission floor.
    #[must_use]
    pub fn meets_resolution_floor(self) -> bool {
        self >= RESOLUTION_FLOOR
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::EXACT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Confidence::new(1.5).is_err());
        assert!(Confidence::new(-0.1).is_err());
    }

    #[test]
    fn rejects_nan() {
        assert!(Confidence::new(f64::NAN).is_err());
    }

    #[test]
    fn accepts_bounds() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
    }

    #[test]
    fn floor_is_inclusive() {
        assert!(Confidence::new(0.7).unwrap().meets_resolution_floor());
        assert!(!Confidence::new(0.69).unwrap().meets_resolution_floor());
    }
}
