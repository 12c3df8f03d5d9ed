//! Curve flattening
//!
//! Every flattener appends `x, y` pairs to a flat point buffer. The caller owns
//! the start point (it is already the last pair in the buffer, or tracked
//! separately); flatteners never emit it again, but always emit the end point.

mod arc;
mod arc_svg;
mod arc_to;
mod bezier;
mod quadratic;

pub use arc::{arc_segment_count, build_arc};
pub use arc_svg::build_arc_to_svg;
pub use arc_to::build_arc_to;
pub use bezier::{build_adaptive_bezier, build_adaptive_bezier_with};
pub use quadratic::{build_adaptive_quadratic, build_adaptive_quadratic_with};

/// Smoothness used when a curve command does not carry its own
pub const DEFAULT_BEZIER_SMOOTHNESS: f32 = 0.5;

/// Highest accepted smoothness; 1.0 would collapse the distance tolerance to zero
pub const MAX_BEZIER_SMOOTHNESS: f32 = 0.99;

/// Subdivision depth limit for adaptive flattening
pub(crate) const RECURSION_LIMIT: u32 = 8;

pub(crate) const FLT_EPSILON: f32 = 1.192_092_9e-7;

pub(crate) const PATH_DISTANCE_EPSILON: f32 = 1.0;

/// Angle tolerances below this disable the angle test
pub(crate) const CURVE_ANGLE_TOLERANCE_EPSILON: f32 = 0.01;

/// Tolerances steering adaptive subdivision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveTolerance {
    /// Squared distance a flattened chord may deviate from the curve
    pub distance_sq: f32,
    /// Maximum turn (radians) between successive chords; 0 disables the test
    pub angle: f32,
    /// Turn (radians) above which a control point is emitted as a cusp; 0 disables
    pub cusp_limit: f32,
}

impl CurveTolerance {
    /// Distance-only tolerance derived from a smoothness in `[0, 0.99]`
    pub fn from_smoothness(smoothness: f32) -> Self {
        let smoothing = clamp_smoothness(smoothness);
        let distance = PATH_DISTANCE_EPSILON - smoothing;
        Self {
            distance_sq: distance * distance,
            angle: 0.0,
            cusp_limit: 0.0,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle.max(0.0);
        self
    }

    pub fn with_cusp_limit(mut self, cusp_limit: f32) -> Self {
        self.cusp_limit = cusp_limit.max(0.0);
        self
    }

    pub(crate) fn angle_enabled(&self) -> bool {
        self.angle >= CURVE_ANGLE_TOLERANCE_EPSILON
    }
}

impl Default for CurveTolerance {
    fn default() -> Self {
        Self::from_smoothness(DEFAULT_BEZIER_SMOOTHNESS)
    }
}

/// Clamp a smoothness into `[0, 0.99]`; non-finite input falls back to the default
pub fn clamp_smoothness(smoothness: f32) -> f32 {
    if smoothness.is_finite() {
        smoothness.clamp(0.0, MAX_BEZIER_SMOOTHNESS)
    } else {
        DEFAULT_BEZIER_SMOOTHNESS
    }
}

/// Fold an absolute angle difference into `[0, PI]`
pub(crate) fn fold_angle(da: f32) -> f32 {
    let da = da.abs();
    if da >= std::f32::consts::PI {
        2.0 * std::f32::consts::PI - da
    } else {
        da
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothness_clamped() {
        assert_eq!(clamp_smoothness(1.0), MAX_BEZIER_SMOOTHNESS);
        assert_eq!(clamp_smoothness(-3.0), 0.0);
        assert_eq!(clamp_smoothness(f32::NAN), DEFAULT_BEZIER_SMOOTHNESS);

        let tight = CurveTolerance::from_smoothness(1.0);
        assert!(tight.distance_sq > 0.0);
        assert!((CurveTolerance::from_smoothness(0.0).distance_sq - 1.0).abs() < 1e-6);
    }
}
