//! Vertex type for the sprite quad

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 2D vertex with clip-space position and texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Pixel coordinates (origin top-left, y down) to clip space
#[inline]
pub fn pixel_to_clip(p: Vec2, viewport: (u32, u32)) -> Vec2 {
    let size = Vec2::new(viewport.0.max(1) as f32, viewport.1.max(1) as f32);
    Vec2::new(p.x / size.x * 2.0 - 1.0, 1.0 - p.y / size.y * 2.0)
}

/// Two triangles covering a `size` rectangle at `top_left`, in clip space
pub fn sprite_quad(top_left: Vec2, size: Vec2, viewport: (u32, u32)) -> [SpriteVertex; 6] {
    let a = pixel_to_clip(top_left, viewport);
    let b = pixel_to_clip(top_left + size, viewport);

    let tl = SpriteVertex::new(a.x, a.y, 0.0, 0.0);
    let tr = SpriteVertex::new(b.x, a.y, 1.0, 0.0);
    let bl = SpriteVertex::new(a.x, b.y, 0.0, 1.0);
    let br = SpriteVertex::new(b.x, b.y, 1.0, 1.0);

    [tl, bl, tr, tr, bl, br]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_clip_corners() {
        let vp = (200, 100);
        assert_eq!(pixel_to_clip(Vec2::ZERO, vp), Vec2::new(-1.0, 1.0));
        assert_eq!(pixel_to_clip(Vec2::new(200.0, 100.0), vp), Vec2::new(1.0, -1.0));
        assert_eq!(pixel_to_clip(Vec2::new(100.0, 50.0), vp), Vec2::ZERO);
    }

    #[test]
    fn test_sprite_quad_covers_rect() {
        let quad = sprite_quad(Vec2::new(50.0, 25.0), Vec2::new(100.0, 50.0), (200, 100));
        let xs: Vec<f32> = quad.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = quad.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().all(|&x| x == -0.5 || x == 0.5));
        assert!(ys.iter().all(|&y| y == 0.5 || y == -0.5));
        // Top-left texel maps to top-left corner
        assert_eq!(quad[0], SpriteVertex::new(-0.5, 0.5, 0.0, 0.0));
        assert_eq!(quad[5], SpriteVertex::new(0.5, -0.5, 1.0, 1.0));
    }
}
