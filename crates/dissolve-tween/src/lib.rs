//! Tween engine for dissolve-rs.
//!
//! A small, frame-driven interpolation scheduler:
//! - [`Ease`] curves
//! - [`TweenEngine`] with one tween per key and last-writer-wins replacement
//! - completion reported as plain values returned from [`TweenEngine::tick`],
//!   so callers dispatch side effects on their own thread of control

#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod ease;
pub mod engine;

pub use ease::Ease;
pub use engine::{Animatable, Lerp, TweenEngine, TweenId, TweenSpec};
