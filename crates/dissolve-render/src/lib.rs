//! Rendering seam for dissolve-rs.
//!
//! The shading program and GPU pipeline live outside this workspace. This crate
//! defines what crosses that boundary:
//! - [`ParticleMaterial`] and its GPU layout [`ShaderUniforms`]
//! - the [`Scene`] attachment trait and the [`SceneGraph`] implementation
//! - [`FrameRenderer`] and the [`HeadlessRenderer`] used for tests and batch runs

#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod renderer;
pub mod scene;
pub mod uniforms;

pub use renderer::{FrameRenderer, FrameStats, FrameView, HeadlessRenderer, RenderItem};
pub use scene::{RenderableId, Scene, SceneGraph};
pub use uniforms::{ParticleMaterial, ShaderUniforms};
