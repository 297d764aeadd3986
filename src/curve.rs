//! The figure-8 trajectory.
//!
//! A Lissajous-like closed curve in 3D:
//!
//! ```text
//! x = a * sin(t)
//! y = b * sin(2t)
//! z = c * cos(3t)
//! ```
//!
//! with `a = SCALE`, `b = SCALE * 0.5` and `c = SCALE * 0.3`. The curve is
//! periodic in `t` with period `2π`.

use glam::Vec3;
use std::f32::consts::TAU;

/// Overall size of the figure-8.
pub const SCALE: f32 = 3.0;

/// Shape constants of the figure-8 curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure8 {
    /// Amplitude along X.
    pub a: f32,
    /// Amplitude along Y.
    pub b: f32,
    /// Amplitude along Z.
    pub c: f32,
}

impl Figure8 {
    /// Derive the sub-scales from a single scale value.
    pub fn with_scale(scale: f32) -> Self {
        Self {
            a: scale,
            b: scale * 0.5,
            c: scale * 0.3,
        }
    }

    /// Evaluate the curve at parameter `t` (radians).
    #[inline]
    pub fn point(&self, t: f32) -> Vec3 {
        Vec3::new(
            self.a * t.sin(),
            self.b * (2.0 * t).sin(),
            self.c * (3.0 * t).cos(),
        )
    }

    /// Curve parameter for a particle with the given phase at scaled time
    /// `time`, wrapped into `[0, 2π)`.
    #[inline]
    pub fn parameter(phase: f32, time: f32) -> f32 {
        (phase + time).rem_euclid(TAU)
    }
}

impl Default for Figure8 {
    fn default() -> Self {
        Self::with_scale(SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sub_scales() {
        let curve = Figure8::default();
        assert_eq!(curve.a, 3.0);
        assert_eq!(curve.b, 1.5);
        assert!((curve.c - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_zero() {
        let p = Figure8::default().point(0.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
        assert!((p.z - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_quarter_turn() {
        let p = Figure8::default().point(std::f32::consts::FRAC_PI_2);
        assert!((p.x - 3.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        // cos(3π/2) = 0
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn test_parameter_wraps() {
        let t = Figure8::parameter(TAU - 0.25, 0.5);
        assert!((t - 0.25).abs() < 1e-5);

        // Negative scaled time still lands in [0, 2π)
        let t = Figure8::parameter(0.0, -0.5);
        assert!(t >= 0.0 && t < TAU);
        assert!((t - (TAU - 0.5)).abs() < 1e-5);
    }
}
