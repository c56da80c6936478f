//! Frame rendering
//!
//! A frame is acquired from a [`FrameSurface`], drawn into through the
//! [`Canvas`] trait, and presented when its [`FrameGuard`] goes out of scope.
//! Two surfaces are provided: an in-memory [`SoftwareSurface`] and a WebGPU
//! [`GpuSurface`].

pub mod gpu;
pub mod software;
pub mod sprite;
pub mod vertex;

pub use gpu::GpuSurface;
pub use software::SoftwareSurface;
pub use sprite::{Rgba, Sprite};

use std::fmt;
use std::ops::{Deref, DerefMut};

use glam::Vec2;

/// Errors from frame acquisition and GPU setup
#[derive(Debug)]
pub enum RenderError {
    /// Surface was torn down or is not attached
    SurfaceLost,
    /// WebGPU could not hand out a frame
    Surface(wgpu::SurfaceError),
    /// Failed to create GPU device
    Device(wgpu::RequestDeviceError),
    /// Adapter cannot present to this surface
    Unsupported,
    /// Sprite pixel data does not match its dimensions
    SpriteSize { expected: usize, actual: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface is not available for drawing"),
            RenderError::Surface(e) => write!(f, "Failed to acquire frame: {}", e),
            RenderError::Device(e) => write!(f, "Failed to create GPU device: {}", e),
            RenderError::Unsupported => write!(f, "Surface is not supported by the GPU adapter"),
            RenderError::SpriteSize { expected, actual } => write!(
                f,
                "Sprite data is {} bytes, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Surface(e) => Some(e),
            RenderError::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::Surface(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::Device(e)
    }
}

/// Drawing operations on an acquired frame
pub trait Canvas {
    /// Replace every pixel with `color`
    fn clear(&mut self, color: Rgba);
    /// Draw `sprite` with its top-left corner at `top_left` (pixels)
    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2);
}

/// A display surface that hands out frames one at a time
pub trait FrameSurface {
    type Frame: Canvas;

    /// Current size in pixels
    fn size(&self) -> (u32, u32);
    /// Adapt to a new surface size
    fn resize(&mut self, width: u32, height: u32);
    /// Acquire the next frame for exclusive drawing
    fn acquire(&mut self) -> Result<Self::Frame, RenderError>;
    /// Make a drawn frame visible
    fn present(&mut self, frame: Self::Frame);
}

/// Exclusive access to one frame; presents it on drop
///
/// Every path out of a draw, early returns and unwinding included, hands the
/// frame back to its surface.
pub struct FrameGuard<'a, S: FrameSurface> {
    surface: &'a mut S,
    frame: Option<S::Frame>,
}

impl<'a, S: FrameSurface> FrameGuard<'a, S> {
    pub fn acquire(surface: &'a mut S) -> Result<Self, RenderError> {
        let frame = surface.acquire()?;
        Ok(Self {
            surface,
            frame: Some(frame),
        })
    }
}

impl<S: FrameSurface> Deref for FrameGuard<'_, S> {
    type Target = S::Frame;

    fn deref(&self) -> &S::Frame {
        self.frame.as_ref().expect("frame is only taken on drop")
    }
}

impl<S: FrameSurface> DerefMut for FrameGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S::Frame {
        self.frame.as_mut().expect("frame is only taken on drop")
    }
}

impl<S: FrameSurface> Drop for FrameGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.surface.present(frame);
        }
    }
}

/// Draws the ball sprite centered on the simulated position
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    /// Ball radius in pixels (half the sprite size)
    pub radius: f32,
    /// Background color; transparent so the ball composites over the page
    pub clear_color: Rgba,
}

impl FrameRenderer {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            clear_color: Rgba::TRANSPARENT,
        }
    }

    /// Render one frame with the ball centered at `position`
    pub fn draw<S: FrameSurface>(
        &self,
        surface: &mut S,
        position: Vec2,
        sprite: &Sprite,
    ) -> Result<(), RenderError> {
        let mut frame = FrameGuard::acquire(surface)?;
        frame.clear(self.clear_color);
        frame.draw_sprite(sprite, position - Vec2::splat(self.radius));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_centers_sprite() {
        let mut surface = SoftwareSurface::new(100, 80);
        let sprite = Sprite::ball(20, Rgba::new(255, 255, 255, 255));
        let renderer = FrameRenderer::new(10.0);

        renderer
            .draw(&mut surface, Vec2::new(50.0, 40.0), &sprite)
            .unwrap();

        assert_eq!(surface.frames_presented(), 1);
        // Ball center is opaque, far corner is cleared
        assert_eq!(surface.pixel(50, 40).map(|p| p.a), Some(255));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
        // Sprite spans [40, 60) horizontally
        assert_eq!(surface.pixel(38, 40), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(61, 40), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_draw_clears_previous_frame() {
        let mut surface = SoftwareSurface::new(100, 80);
        let sprite = Sprite::ball(20, Rgba::new(255, 255, 255, 255));
        let renderer = FrameRenderer::new(10.0);

        renderer.draw(&mut surface, Vec2::new(20.0, 20.0), &sprite).unwrap();
        renderer.draw(&mut surface, Vec2::new(70.0, 50.0), &sprite).unwrap();

        assert_eq!(surface.pixel(20, 20), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(70, 50).map(|p| p.a), Some(255));
        assert_eq!(surface.frames_presented(), 2);
    }

    #[test]
    fn test_lost_surface_skips_draw() {
        let mut surface = SoftwareSurface::new(100, 80);
        let sprite = Sprite::ball(20, Rgba::new(255, 255, 255, 255));
        let renderer = FrameRenderer::new(10.0);

        surface.detach();
        let err = renderer
            .draw(&mut surface, Vec2::new(50.0, 40.0), &sprite)
            .unwrap_err();
        assert!(matches!(err, RenderError::SurfaceLost));
        assert_eq!(surface.frames_presented(), 0);

        surface.attach();
        renderer.draw(&mut surface, Vec2::new(50.0, 40.0), &sprite).unwrap();
        assert_eq!(surface.frames_presented(), 1);
    }

    #[test]
    fn test_guard_presents_on_unwind() {
        let mut surface = SoftwareSurface::new(10, 10);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _frame = FrameGuard::acquire(&mut surface).unwrap();
            panic!("draw failed midway");
        }));
        assert!(result.is_err());
        assert_eq!(surface.frames_presented(), 1);
    }
}
