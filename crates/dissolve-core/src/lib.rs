//! Core types for dissolve-rs.
//!
//! This crate provides everything needed to turn a triangle mesh into particles:
//! - [`Mesh`] and [`Triangle`] as delivered by a mesh source
//! - [`SurfaceSampler`] for area-weighted surface sampling
//! - [`ParticleBuffer`] holding the sampled positions and randomness channels
//! - Colors and model/stage configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Particle counts and channel values convert between integer and float freely
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod color;
pub mod error;
pub mod mesh;
pub mod options;
pub mod particles;
pub mod sampler;

pub use color::Rgb;
pub use error::{DissolveError, Result};
pub use mesh::{Mesh, Triangle};
pub use options::{
    ModelConfig, PendingCommandPolicy, StageConfig, TransitionTiming, DEFAULT_PARTICLE_SIZE,
};
pub use particles::{ParticleBuffer, DEFAULT_PARTICLE_COUNT};
pub use sampler::{AreaEntry, CumulativeAreaTable, ParticleSample, SurfaceSampler};

// Re-export glam types for convenience
pub use glam::{UVec3, Vec3};
