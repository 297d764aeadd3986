//! Error types for the visualizer host.
//!
//! The motion kernel itself is infallible. Everything that can fail lives in
//! the window, GPU and configuration layers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error(
        "no compatible GPU adapter found; a GPU with Vulkan/Metal/DX12/WebGPU support is required"
    )]
    NoAdapter,
    /// The surface reported no usable texture format.
    #[error("the window surface supports no texture formats")]
    NoSurfaceFormat,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur while reading or writing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when running the visualizer.
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_format_error_names_the_surface() {
        let msg = GpuError::NoSurfaceFormat.to_string();
        assert!(msg.contains("surface"));
        assert!(!msg.contains("adapter"));
    }
}
