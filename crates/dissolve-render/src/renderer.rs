//! Frame renderers.

use dissolve_core::{ParticleBuffer, Rgb};
use glam::Mat4;

use crate::scene::RenderableId;
use crate::uniforms::ShaderUniforms;

/// One attached particle set, ready for drawing.
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    pub id: RenderableId,
    pub name: &'a str,
    pub particles: &'a ParticleBuffer,
    pub uniforms: ShaderUniforms,
    /// Rotation about the Y axis, in radians.
    pub rotation_y: f32,
}

impl RenderItem<'_> {
    /// Returns the model matrix for this item.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    /// Seconds since the stage started.
    pub elapsed: f32,
    /// Clear color.
    pub background: Rgb,
    /// Attached particle sets in scene order.
    pub items: Vec<RenderItem<'a>>,
}

/// Draws one frame per call.
pub trait FrameRenderer {
    fn render(&mut self, frame: &FrameView<'_>);
}

/// Summary of the last frame a [`HeadlessRenderer`] saw.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub elapsed: f32,
    pub background: Rgb,
    pub names: Vec<String>,
    pub particles: usize,
}

/// A renderer that draws nothing and records what it was given.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last: Option<FrameStats>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Returns the summary of the last frame.
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last.as_ref()
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn render(&mut self, frame: &FrameView<'_>) {
        self.frames += 1;
        self.last = Some(FrameStats {
            elapsed: frame.elapsed,
            background: frame.background,
            names: frame.items.iter().map(|i| i.name.to_string()).collect(),
            particles: frame.items.iter().map(|i| i.particles.len()).sum(),
        });
    }
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for &mut R {
    fn render(&mut self, frame: &FrameView<'_>) {
        (**self).render(frame);
    }
}
