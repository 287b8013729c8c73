//! Uniform values consumed by the particle shading program.

use dissolve_core::Rgb;

/// GPU layout of the particle uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub time: f32,
    pub reveal_scale: f32,
    pub particle_size: f32,
    pub _padding: f32,
    pub color1: [f32; 4],
    pub color2: [f32; 4],
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        ParticleMaterial::default().to_uniforms()
    }
}

/// Live uniform values of one particle set.
///
/// The core only ever writes these; the shading program reads them once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleMaterial {
    /// Elapsed time in seconds.
    pub time: f32,
    /// How formed the particle set appears, in `[0, 1]`.
    pub reveal_scale: f32,
    /// Point size.
    pub particle_size: f32,
    /// First particle color.
    pub color1: Rgb,
    /// Second particle color.
    pub color2: Rgb,
}

impl Default for ParticleMaterial {
    fn default() -> Self {
        Self {
            time: 0.0,
            reveal_scale: 0.0,
            particle_size: dissolve_core::DEFAULT_PARTICLE_SIZE,
            color1: Rgb::WHITE,
            color2: Rgb::WHITE,
        }
    }
}

impl ParticleMaterial {
    /// Creates a fully dissolved material with the given colors and size.
    pub fn new(color1: Rgb, color2: Rgb, particle_size: f32) -> Self {
        Self {
            color1,
            color2,
            particle_size,
            ..Self::default()
        }
    }

    /// Packs the values into the GPU uniform layout.
    pub fn to_uniforms(&self) -> ShaderUniforms {
        ShaderUniforms {
            time: self.time,
            reveal_scale: self.reveal_scale,
            particle_size: self.particle_size,
            _padding: 0.0,
            color1: self.color1.to_vec3().extend(1.0).to_array(),
            color2: self.color2.to_vec3().extend(1.0).to_array(),
        }
    }
}
