//! Low-poly UV sphere used as the particle instance mesh.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// Longitude segments per particle sphere.
pub const WIDTH_SEGMENTS: u32 = 8;
/// Latitude segments per particle sphere.
pub const HEIGHT_SEGMENTS: u32 = 8;

/// Mesh vertex: a point on the unit sphere.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
}

/// Unit sphere triangulated on a latitude/longitude grid.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u16>,
}

impl SphereMesh {
    /// Build a unit sphere. Segment counts are raised to at least 3 and 2.
    pub fn new(width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let row = width_segments + 1;

        let mut vertices = Vec::with_capacity((row * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let theta = iy as f32 / height_segments as f32 * PI;
            for ix in 0..=width_segments {
                let phi = ix as f32 / width_segments as f32 * TAU;
                vertices.push(SphereVertex {
                    position: [
                        -theta.sin() * phi.cos(),
                        theta.cos(),
                        theta.sin() * phi.sin(),
                    ],
                });
            }
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = (iy * row + ix + 1) as u16;
                let b = (iy * row + ix) as u16;
                let c = ((iy + 1) * row + ix) as u16;
                let d = ((iy + 1) * row + ix + 1) as u16;

                // Pole rows collapse to one triangle per quad
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Index count to pass to `draw_indexed`.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

impl Default for SphereMesh {
    fn default() -> Self {
        Self::new(WIDTH_SEGMENTS, HEIGHT_SEGMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts() {
        let mesh = SphereMesh::default();
        assert_eq!(mesh.vertices.len(), 81);
        // 6 inner rows of 8 quads, plus one triangle per quad in each pole row
        assert_eq!(mesh.indices.len(), (6 * 8 * 2 + 2 * 8) * 3);
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = SphereMesh::default();
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = SphereMesh::new(12, 6);
        let n = mesh.vertices.len() as u16;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn test_minimum_segments() {
        let mesh = SphereMesh::new(0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
    }
}
