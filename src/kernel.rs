//! Particle motion kernel.
//!
//! Every particle rides the [`Figure8`] curve. Its place on the curve is set by
//! a fixed phase offset, and a fixed random jitter displaces it from the curve.
//! Both are drawn once when the set is built. Each tick recomputes all
//! positions from the absolute elapsed time, so nothing accumulates between
//! frames and the same inputs always produce the same buffer.
//!
//! # Example
//!
//! ```
//! use figure8::kernel::MotionKernel;
//!
//! let mut kernel = MotionKernel::new();
//! kernel.rebuild(1_000, 0.2);
//!
//! // Once per frame:
//! let positions = kernel.update(1.5, 0.15).unwrap();
//! assert_eq!(positions.len(), 1_000);
//! ```

use crate::curve::Figure8;
use glam::Vec3;
use rand::Rng;
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Sets at least this large are updated on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 16_384;

/// Per-particle chunk size for the parallel update.
const PARALLEL_CHUNK: usize = 4_096;

/// Static per-particle state plus the position buffer it drives.
///
/// `phases` and `jitter` never change after construction. `positions` is
/// overwritten in place by [`ParticleSet::update`].
#[derive(Debug, Clone)]
pub struct ParticleSet {
    phases: Vec<f32>,
    jitter: Vec<Vec3>,
    positions: Vec<Vec3>,
    noise: f32,
}

impl ParticleSet {
    /// Build a set of `count` particles with jitter amplitude `noise`, using a
    /// fresh thread-local RNG.
    pub fn initialize(count: u32, noise: f32) -> Self {
        Self::initialize_with_rng(count, noise, &mut rand::thread_rng())
    }

    /// Build a set using the given RNG for the jitter draw.
    ///
    /// Phases are `i / count * 2π`. Each jitter axis is drawn independently as
    /// `(rand - 0.5) * noise`, which keeps every component inside
    /// `[-noise / 2, noise / 2]`. Negative noise is treated as zero.
    pub fn initialize_with_rng<R: Rng + ?Sized>(count: u32, noise: f32, rng: &mut R) -> Self {
        let len = count as usize;
        let noise = noise.max(0.0);

        let phases = (0..len)
            .map(|i| (i as f64 / len as f64 * TAU) as f32)
            .collect();

        let jitter = (0..len)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f32>() - 0.5) * noise,
                    (rng.gen::<f32>() - 0.5) * noise,
                    (rng.gen::<f32>() - 0.5) * noise,
                )
            })
            .collect();

        Self {
            phases,
            jitter,
            positions: vec![Vec3::ZERO; len],
            noise,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether the set holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Jitter amplitude this set was drawn with.
    #[inline]
    pub fn noise(&self) -> f32 {
        self.noise
    }

    /// Phase offsets, one per particle.
    #[inline]
    pub fn phases(&self) -> &[f32] {
        &self.phases
    }

    /// Jitter vectors, one per particle.
    #[inline]
    pub fn jitter(&self) -> &[Vec3] {
        &self.jitter
    }

    /// Positions written by the last [`update`](Self::update).
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Positions as tightly packed bytes (12 bytes per particle), ready to be
    /// copied into a vertex buffer.
    #[inline]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Recompute every position for the given elapsed time and speed.
    ///
    /// Calling this twice with the same arguments leaves the buffer unchanged.
    pub fn update(&mut self, curve: &Figure8, elapsed: f64, speed: f32) {
        let time = scaled_time(elapsed, speed);

        if self.positions.len() >= PARALLEL_THRESHOLD {
            self.positions
                .par_chunks_mut(PARALLEL_CHUNK)
                .zip(self.phases.par_chunks(PARALLEL_CHUNK))
                .zip(self.jitter.par_chunks(PARALLEL_CHUNK))
                .for_each(|((out, phases), jitter)| {
                    write_positions(curve, time, phases, jitter, out);
                });
        } else {
            write_positions(curve, time, &self.phases, &self.jitter, &mut self.positions);
        }
    }

    /// Single-threaded update, regardless of set size.
    pub fn update_sequential(&mut self, curve: &Figure8, elapsed: f64, speed: f32) {
        let time = scaled_time(elapsed, speed);
        write_positions(curve, time, &self.phases, &self.jitter, &mut self.positions);
    }
}

/// `elapsed * speed` wrapped into `[0, 2π)`.
///
/// Elapsed seconds stay `f64` until the wrap so that frame-sized steps are
/// still resolved after days of running.
#[inline]
fn scaled_time(elapsed: f64, speed: f32) -> f32 {
    (elapsed * f64::from(speed)).rem_euclid(TAU) as f32
}

#[inline]
fn write_positions(
    curve: &Figure8,
    time: f32,
    phases: &[f32],
    jitter: &[Vec3],
    out: &mut [Vec3],
) {
    for ((pos, &phase), offset) in out.iter_mut().zip(phases).zip(jitter) {
        let t = Figure8::parameter(phase, time);
        *pos = curve.point(t) + *offset;
    }
}

/// Whether the kernel has a particle set to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelState {
    /// No set has been built yet.
    Uninitialized,
    /// A set is allocated for the current count and noise.
    Ready,
}

/// Owns the curve and the current [`ParticleSet`].
///
/// The kernel does not watch parameters. Whoever owns the parameters calls
/// [`rebuild`](Self::rebuild) when particle count or noise change, and
/// [`update`](Self::update) once per frame.
#[derive(Debug, Default)]
pub struct MotionKernel {
    curve: Figure8,
    particles: Option<ParticleSet>,
}

impl MotionKernel {
    /// Create an uninitialized kernel using the default curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> KernelState {
        if self.particles.is_some() {
            KernelState::Ready
        } else {
            KernelState::Uninitialized
        }
    }

    /// Replace the particle set with a freshly drawn one.
    ///
    /// Phases and jitter are both redrawn. Jitter from the previous set is not
    /// reused, even when only `noise` changed.
    pub fn rebuild(&mut self, count: u32, noise: f32) -> &ParticleSet {
        self.rebuild_with_rng(count, noise, &mut rand::thread_rng())
    }

    /// Replace the particle set with one drawn from `rng`.
    pub fn rebuild_with_rng<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        noise: f32,
        rng: &mut R,
    ) -> &ParticleSet {
        log::debug!("rebuilding particle set: count={count}, noise={noise}");
        self.particles.insert(ParticleSet::initialize_with_rng(count, noise, rng))
    }

    /// Advance positions to `elapsed` seconds at the given speed.
    ///
    /// Returns `None` while uninitialized.
    pub fn update(&mut self, elapsed: f64, speed: f32) -> Option<&[Vec3]> {
        let particles = self.particles.as_mut()?;
        particles.update(&self.curve, elapsed, speed);
        Some(particles.positions())
    }

    /// The current set, if any.
    pub fn particles(&self) -> Option<&ParticleSet> {
        self.particles.as_ref()
    }

    /// Positions from the last update. Empty while uninitialized.
    pub fn positions(&self) -> &[Vec3] {
        self.particles
            .as_ref()
            .map(ParticleSet::positions)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_phases_evenly_spaced() {
        let set = ParticleSet::initialize(4, 0.0);
        let expected = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
        for (phase, want) in set.phases().iter().zip(expected) {
            assert!((phase - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_noise_means_zero_jitter() {
        let set = ParticleSet::initialize(64, 0.0);
        assert!(set.jitter().iter().all(|j| *j == Vec3::ZERO));
    }

    #[test]
    fn test_negative_noise_treated_as_zero() {
        let set = ParticleSet::initialize(16, -1.0);
        assert_eq!(set.noise(), 0.0);
        assert!(set.jitter().iter().all(|j| *j == Vec3::ZERO));
    }

    #[test]
    fn test_empty_set_is_total() {
        let mut set = ParticleSet::initialize(0, 0.5);
        assert!(set.is_empty());
        set.update(&Figure8::default(), 3.0, 1.0);
        assert!(set.positions().is_empty());
        assert!(set.position_bytes().is_empty());
    }

    #[test]
    fn test_position_bytes_are_packed() {
        let set = ParticleSet::initialize(10, 0.1);
        assert_eq!(set.position_bytes().len(), 10 * 3 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_seeded_rng_reproduces_jitter() {
        let a = ParticleSet::initialize_with_rng(100, 0.3, &mut SmallRng::seed_from_u64(7));
        let b = ParticleSet::initialize_with_rng(100, 0.3, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a.jitter(), b.jitter());
    }

    #[test]
    fn test_kernel_state_machine() {
        let mut kernel = MotionKernel::new();
        assert_eq!(kernel.state(), KernelState::Uninitialized);
        assert!(kernel.update(1.0, 1.0).is_none());
        assert!(kernel.positions().is_empty());

        kernel.rebuild(8, 0.0);
        assert_eq!(kernel.state(), KernelState::Ready);
        assert_eq!(kernel.update(1.0, 1.0).map(<[Vec3]>::len), Some(8));

        kernel.rebuild(3, 0.0);
        assert_eq!(kernel.positions().len(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let count = (PARALLEL_THRESHOLD + 1_234) as u32;
        let curve = Figure8::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut parallel = ParticleSet::initialize_with_rng(count, 0.2, &mut rng);
        let mut sequential = parallel.clone();

        parallel.update(&curve, 12.75, 0.15);
        sequential.update_sequential(&curve, 12.75, 0.15);

        assert_eq!(parallel.positions(), sequential.positions());
    }

    #[test]
    fn test_seeded_rebuild_ignores_speed() {
        let mut kernel = MotionKernel::new();
        kernel.rebuild_with_rng(500, 0.4, &mut SmallRng::seed_from_u64(11));
        let phases = kernel.particles().unwrap().phases().to_vec();
        let jitter = kernel.particles().unwrap().jitter().to_vec();

        let slow = kernel.update(8.0, 0.1).unwrap().to_vec();
        let fast = kernel.update(8.0, 1.7).unwrap().to_vec();
        assert_ne!(slow, fast);

        let particles = kernel.particles().unwrap();
        assert_eq!(particles.phases(), phases.as_slice());
        assert_eq!(particles.jitter(), jitter.as_slice());

        // Same seed, same static state
        let mut other = MotionKernel::new();
        other.rebuild_with_rng(500, 0.4, &mut SmallRng::seed_from_u64(11));
        assert_eq!(other.particles().unwrap().jitter(), jitter.as_slice());

        // A noise change redraws jitter
        kernel.rebuild_with_rng(500, 0.1, &mut SmallRng::seed_from_u64(11));
        assert_ne!(kernel.particles().unwrap().jitter(), jitter.as_slice());
        assert_eq!(kernel.particles().unwrap().phases(), phases.as_slice());
    }

    #[test]
    fn test_motion_resolved_after_a_week() {
        let mut kernel = MotionKernel::new();
        kernel.rebuild(1, 0.0);
        let base = 7.0 * 86_400.0;

        let frames: Vec<Vec3> = (0..8)
            .map(|k| kernel.update(base + k as f64 / 60.0, 0.15).unwrap()[0])
            .collect();
        for pair in frames.windows(2) {
            assert_ne!(pair[0], pair[1], "particle stalled between frames");
        }
    }

    #[test]
    fn test_scaled_time_wraps_in_f64() {
        let week = 7.0 * 86_400.0;
        let t = scaled_time(week + 1.0 / 60.0, 0.15);
        let want = ((week + 1.0 / 60.0) * f64::from(0.15f32)).rem_euclid(TAU) as f32;
        assert_eq!(t, want);
        assert!((0.0..std::f32::consts::TAU).contains(&t));
    }
}
