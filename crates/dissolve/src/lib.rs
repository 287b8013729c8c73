//! dissolve-rs: mesh-to-particle dissolve transitions.
//!
//! A mesh is sampled uniformly over its surface area into a particle set. Models
//! built from those particle sets fade in and out of a scene by animating a
//! reveal-scale uniform, with a shared background color crossfading between them.
//!
//! # Quick Start
//!
//! ```no_run
//! use dissolve::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let skull = Mesh::new(vec![Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)]);
//!     let mut stage = Stage::new(MemorySource::new().with_mesh("skull.glb", skull));
//!
//!     let id = stage.add_model(ModelConfig::new(
//!         "skull",
//!         "skull.glb",
//!         "red".parse()?,
//!         "yellow".parse()?,
//!         "#47001b".parse()?,
//!     ))?;
//!     stage.add(id)?;
//!
//!     let mut renderer = HeadlessRenderer::new();
//!     for _ in 0..120 {
//!         stage.tick(1.0 / 60.0, &mut renderer);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`SurfaceSampler`] and [`ParticleBuffer`] turn a [`Mesh`] into particles
//! - a [`Model`] owns one particle set and runs the `add`/`remove` state machine
//! - a [`Stage`] drives loads, tweens and rendering once per frame
//! - [`MeshSource`], [`Scene`] and [`FrameRenderer`] are the external seams

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod loader;
pub mod model;
pub mod stage;
pub mod transition;

pub use dissolve_core::{
    AreaEntry, CumulativeAreaTable, DissolveError, Mesh, ModelConfig, ParticleBuffer,
    ParticleSample, PendingCommandPolicy, Result, Rgb, StageConfig, SurfaceSampler,
    TransitionTiming, Triangle, UVec3, Vec3, DEFAULT_PARTICLE_COUNT, DEFAULT_PARTICLE_SIZE,
};
pub use dissolve_render::{
    FrameRenderer, FrameStats, FrameView, HeadlessRenderer, ParticleMaterial, RenderItem,
    RenderableId, Scene, SceneGraph, ShaderUniforms,
};
pub use dissolve_tween::{Ease, TweenSpec};

pub use loader::{LoadCompletion, LoadEvent, MemorySource, MeshSource, ThreadedSource};
pub use model::{Command, Model, ModelId, ModelState, TransitionPhase};
pub use stage::{FrameReport, Stage};
pub use transition::{AnimKey, AnimValue, Ambient, TransitionEvent};

/// Installs `env_logger` as the logger, configured by `RUST_LOG`.
///
/// Does nothing if a logger is already installed.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
