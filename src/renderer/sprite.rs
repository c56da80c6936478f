//! Ball sprite image
//!
//! Decoding and scaling images is left to the host; the renderer only needs
//! a ready-to-draw RGBA block of fixed size.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::RenderError;

/// 8-bit straight-alpha RGBA pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Same color with alpha scaled by `coverage` (0-1)
    fn with_coverage(self, coverage: f32) -> Self {
        let a = (self.a as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Source-over composite of `self` onto `dst`
    pub fn over(self, dst: Rgba) -> Rgba {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let blend = |s: u8, d: u8| {
            let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a: (out_a * 255.0).round() as u8,
        }
    }
}

/// Immutable RGBA image, cheap to clone
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Arc<[Rgba]>,
}

impl Sprite {
    /// Wrap raw RGBA8 bytes (row-major, 4 bytes per pixel)
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(RenderError::SpriteSize {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels: Vec<Rgba> = bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned).collect();
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Shaded ball of the given diameter, transparent outside the disc
    ///
    /// Edge pixels get fractional coverage so the ball composites smoothly.
    pub fn ball(diameter: u32, color: Rgba) -> Self {
        let radius = diameter as f32 / 2.0;
        let center = Vec2::splat(radius);
        // Highlight up and to the left of center
        let highlight = center - Vec2::splat(radius * 0.35);

        let mut pixels = Vec::with_capacity(diameter as usize * diameter as usize);
        for y in 0..diameter {
            for x in 0..diameter {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = radius + 0.5 - p.distance(center);
                if coverage <= 0.0 {
                    pixels.push(Rgba::TRANSPARENT);
                    continue;
                }
                let shade = 1.0 - 0.45 * (p.distance(highlight) / (radius * 1.6)).min(1.0);
                let lit = Rgba {
                    r: (color.r as f32 * shade).round() as u8,
                    g: (color.g as f32 * shade).round() as u8,
                    b: (color.b as f32 * shade).round() as u8,
                    a: color.a,
                };
                pixels.push(lit.with_coverage(coverage));
            }
        }

        Self {
            width: diameter,
            height: diameter,
            pixels: pixels.into(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at (x, y), if in range
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Whether two handles share the same pixel storage
    pub fn same_image(&self, other: &Sprite) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_is_round_and_transparent_outside() {
        let sprite = Sprite::ball(300, Rgba::new(255, 0, 0, 255));
        assert_eq!(sprite.size(), (300, 300));
        // Corners are outside the disc
        assert_eq!(sprite.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(sprite.pixel(299, 299), Some(Rgba::TRANSPARENT));
        // Center is fully opaque
        assert_eq!(sprite.pixel(150, 150).map(|p| p.a), Some(255));
        assert_eq!(sprite.pixel(300, 0), None);
    }

    #[test]
    fn test_from_rgba8_checks_length() {
        let ok = Sprite::from_rgba8(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(ok.pixel(1, 0), Some(Rgba::new(5, 6, 7, 8)));
        assert_eq!(ok.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let err = Sprite::from_rgba8(2, 2, &[0; 8]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::SpriteSize {
                expected: 16,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_clone_shares_pixels() {
        let a = Sprite::ball(8, Rgba::new(0, 0, 255, 255));
        let b = a.clone();
        assert!(a.same_image(&b));
        assert!(!a.same_image(&Sprite::ball(8, Rgba::new(0, 0, 255, 255))));
    }

    #[test]
    fn test_over_compositing() {
        let red = Rgba::new(255, 0, 0, 255);
        let half_blue = Rgba::new(0, 0, 255, 128);
        assert_eq!(red.over(Rgba::TRANSPARENT), red);
        assert_eq!(Rgba::TRANSPARENT.over(red), red);

        let mixed = half_blue.over(red);
        assert_eq!(mixed.a, 255);
        assert!(mixed.r > 100 && mixed.b > 100);
    }
}
