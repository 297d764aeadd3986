//! # figure8
//!
//! Thousands of small glowing spheres flowing along a 3D figure-8 curve.
//!
//! The crate is split into a CPU motion kernel and a GPU host around it:
//!
//! - [`kernel`] places every particle on the curve each frame from its phase,
//!   a fixed jitter offset and the elapsed time.
//! - [`params`] holds the six live parameters and detects when the kernel
//!   needs a rebuild.
//! - [`gpu`] draws the particles as instanced spheres with bloom.
//! - [`Visualizer`] opens the window and drives everything.
//!
//! ## Quick Start
//!
//! ```no_run
//! use figure8::prelude::*;
//!
//! fn main() -> Result<(), VisualizerError> {
//!     Visualizer::new()
//!         .with_params(Params {
//!             particle_count: 200_000,
//!             noise: 0.35,
//!             ..Default::default()
//!         })
//!         .run()
//! }
//! ```
//!
//! ## Using the kernel on its own
//!
//! The kernel has no GPU or window dependency:
//!
//! ```
//! use figure8::kernel::MotionKernel;
//!
//! let mut kernel = MotionKernel::new();
//! kernel.rebuild(1_000, 0.2);
//! let positions = kernel.update(1.5, 0.15).unwrap();
//! assert_eq!(positions.len(), 1_000);
//! ```
//!
//! ## Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | Left drag | Orbit |
//! | Right drag | Pan |
//! | Wheel | Zoom |
//! | Space | Pause / resume |
//! | Escape | Quit |

mod app;
pub mod config;
pub mod curve;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod params;
pub mod time;
#[cfg(feature = "egui")]
pub mod ui;

pub use app::Visualizer;
pub use bytemuck;
pub use config::{BloomConfig, CameraConfig, VisualizerConfig, WindowConfig};
pub use curve::Figure8;
pub use error::{ConfigError, GpuError, VisualizerError};
pub use glam::Vec3;
pub use kernel::{KernelState, MotionKernel, ParticleSet};
pub use params::{ParamKind, ParamRange, ParamStore, Params};
pub use time::Clock;

/// Convenient re-exports for common usage.
///
/// ```
/// use figure8::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::VisualizerConfig;
    pub use crate::curve::Figure8;
    pub use crate::error::VisualizerError;
    pub use crate::gpu::Camera;
    pub use crate::kernel::MotionKernel;
    pub use crate::params::{ParamKind, Params};
    pub use crate::time::Clock;
    pub use crate::Vec3;
    pub use crate::Visualizer;
    #[cfg(feature = "egui")]
    pub use egui;
}
