//! Particle buffers built from surface samples.

use glam::Vec3;
use rand::Rng;

use crate::error::{DissolveError, Result};
use crate::sampler::SurfaceSampler;

/// Default number of particles per model.
pub const DEFAULT_PARTICLE_COUNT: usize = 20_000;

/// A fixed-size set of particles split into two parallel channels.
///
/// `positions()[i]` and `randomness()[i]` always describe the same particle.
/// The buffer never changes after it is built; appearance is driven by uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    randomness: Vec<Vec3>,
}

impl ParticleBuffer {
    /// Samples `count` particles from `sampler`.
    ///
    /// Both channels are allocated at their final size before sampling starts.
    /// Fails with [`DissolveError::InvalidArgument`] if `count` is zero.
    pub fn build<R: Rng + ?Sized>(
        sampler: &SurfaceSampler<'_>,
        count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if count == 0 {
            return Err(DissolveError::InvalidArgument(
                "particle count must be at least 1".into(),
            ));
        }

        let mut positions = Vec::with_capacity(count);
        let mut randomness = Vec::with_capacity(count);
        for _ in 0..count {
            let sample = sampler.sample(rng);
            positions.push(sample.position);
            randomness.push(sample.randomness);
        }

        Ok(Self {
            positions,
            randomness,
        })
    }

    /// Returns the number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the buffer holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the positions channel.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Returns the randomness channel.
    #[must_use]
    pub fn randomness(&self) -> &[Vec3] {
        &self.randomness
    }

    /// Returns the positions channel as tightly packed `f32` triples.
    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Returns the randomness channel as tightly packed `f32` triples.
    #[must_use]
    pub fn randomness_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.randomness)
    }

    /// Returns the axis-aligned bounds of the positions channel.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }
}
