//! In-memory frame surface
//!
//! Double-buffered RGBA pixels with no window behind them. Used by the
//! headless native build and by tests that inspect what was drawn.

use glam::Vec2;

use super::sprite::{Rgba, Sprite};
use super::{Canvas, FrameSurface, RenderError};

/// A frame being drawn on a [`SoftwareSurface`]
#[derive(Debug)]
pub struct SoftwareFrame {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas for SoftwareFrame {
    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2) {
        let origin_x = top_left.x.round() as i64;
        let origin_y = top_left.y.round() as i64;

        // Clip the sprite rectangle against the frame
        let x0 = origin_x.max(0);
        let y0 = origin_y.max(0);
        let x1 = (origin_x + sprite.width() as i64).min(self.width as i64);
        let y1 = (origin_y + sprite.height() as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = sprite.pixels();
        for y in y0..y1 {
            let src_row = ((y - origin_y) * sprite.width() as i64) as usize;
            let dst_row = (y * self.width as i64) as usize;
            for x in x0..x1 {
                let s = src[src_row + (x - origin_x) as usize];
                let d = &mut self.pixels[dst_row + x as usize];
                *d = s.over(*d);
            }
        }
    }
}

/// Window-less surface holding the last presented frame
#[derive(Debug)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    front: Vec<Rgba>,
    /// Recycled back buffer
    spare: Vec<Rgba>,
    attached: bool,
    frames_presented: u64,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            front: vec![Rgba::TRANSPARENT; len],
            spare: Vec::new(),
            attached: true,
            frames_presented: 0,
        }
    }

    /// Simulate the surface being torn down; acquisition fails until reattached
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Last presented pixels, row-major
    pub fn pixels(&self) -> &[Rgba] {
        &self.front
    }

    /// Presented pixel at (x, y), if in range
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.front[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Bounding box of non-transparent presented pixels as (min, max) inclusive
    pub fn opaque_bounds(&self) -> Option<((u32, u32), (u32, u32))> {
        let mut bounds: Option<((u32, u32), (u32, u32))> = None;
        for (i, p) in self.front.iter().enumerate() {
            if p.a == 0 {
                continue;
            }
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            bounds = Some(match bounds {
                None => ((x, y), (x, y)),
                Some(((min_x, min_y), (max_x, max_y))) => (
                    (min_x.min(x), min_y.min(y)),
                    (max_x.max(x), max_y.max(y)),
                ),
            });
        }
        bounds
    }
}

impl FrameSurface for SoftwareSurface {
    type Frame = SoftwareFrame;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.front = vec![Rgba::TRANSPARENT; width as usize * height as usize];
        self.spare.clear();
    }

    fn acquire(&mut self) -> Result<SoftwareFrame, RenderError> {
        if !self.attached {
            return Err(RenderError::SurfaceLost);
        }
        let len = self.width as usize * self.height as usize;
        let mut pixels = std::mem::take(&mut self.spare);
        pixels.resize(len, Rgba::TRANSPARENT);
        Ok(SoftwareFrame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    fn present(&mut self, frame: SoftwareFrame) {
        // A frame acquired before a resize is stale
        if (frame.width, frame.height) != (self.width, self.height) {
            log::debug!(
                "Dropping {}x{} frame on {}x{} surface",
                frame.width,
                frame.height,
                self.width,
                self.height
            );
            return;
        }
        self.spare = std::mem::replace(&mut self.front, frame.pixels);
        self.frames_presented += 1;
    }
}
