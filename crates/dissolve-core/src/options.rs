//! Configuration for models and stages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{DissolveError, Result};
use crate::particles::DEFAULT_PARTICLE_COUNT;

/// Default point size written to the size uniform.
pub const DEFAULT_PARTICLE_SIZE: f32 = 0.02;

/// What a model does with `add`/`remove` issued before its mesh has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PendingCommandPolicy {
    /// Queue the command and replay it once the model is loaded.
    #[default]
    Defer,
    /// Fail the command with [`DissolveError::NotLoaded`].
    Reject,
}

/// Durations (seconds) of the enter and leave transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTiming {
    /// Duration of the reveal-scale tween toward 1.
    pub reveal_duration: f32,
    /// Delay before the reveal-scale tween starts.
    pub reveal_delay: f32,
    /// Duration of the reveal-scale tween toward 0.
    pub dissolve_duration: f32,
    /// Duration of the rotation tweens, in both directions.
    pub rotation_duration: f32,
    /// Duration of the background color tween.
    pub background_duration: f32,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            reveal_duration: 0.8,
            reveal_delay: 0.3,
            dissolve_duration: 0.8,
            rotation_duration: 0.8,
            background_duration: 0.8,
        }
    }
}

impl TransitionTiming {
    /// Timing with every duration and delay set to zero.
    pub const INSTANT: Self = Self {
        reveal_duration: 0.0,
        reveal_delay: 0.0,
        dissolve_duration: 0.0,
        rotation_duration: 0.0,
        background_duration: 0.0,
    };

    /// Checks that every value is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("reveal_duration", self.reveal_duration),
            ("reveal_delay", self.reveal_delay),
            ("dissolve_duration", self.dissolve_duration),
            ("rotation_duration", self.rotation_duration),
            ("background_duration", self.background_duration),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(DissolveError::InvalidArgument(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Construction parameters for one model.
///
/// `name`, `file`, both particle colors and `background` are required; everything
/// else has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique model name.
    pub name: String,
    /// Path handed to the mesh source.
    pub file: PathBuf,
    /// First particle color.
    pub color1: Rgb,
    /// Second particle color.
    pub color2: Rgb,
    /// Background color painted when this model is added.
    pub background: Rgb,
    /// Whether to add the model as soon as its mesh is loaded.
    #[serde(default)]
    pub place_on_load: bool,
    /// Number of particles to sample.
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    /// Value of the size uniform.
    #[serde(default = "default_particle_size")]
    pub particle_size: f32,
    /// Transition durations.
    #[serde(default)]
    pub timing: TransitionTiming,
    /// Handling of commands issued before the mesh loads.
    #[serde(default)]
    pub pending: PendingCommandPolicy,
}

fn default_particle_count() -> usize {
    DEFAULT_PARTICLE_COUNT
}

fn default_particle_size() -> f32 {
    DEFAULT_PARTICLE_SIZE
}

impl ModelConfig {
    /// Creates a configuration with the required fields and defaults elsewhere.
    pub fn new(
        name: impl Into<String>,
        file: impl Into<PathBuf>,
        color1: Rgb,
        color2: Rgb,
        background: Rgb,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            color1,
            color2,
            background,
            place_on_load: false,
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_size: DEFAULT_PARTICLE_SIZE,
            timing: TransitionTiming::default(),
            pending: PendingCommandPolicy::default(),
        }
    }

    /// Sets whether the model is added as soon as it loads.
    #[must_use]
    pub fn with_place_on_load(mut self, place_on_load: bool) -> Self {
        self.place_on_load = place_on_load;
        self
    }

    /// Sets the particle count.
    #[must_use]
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Sets the value of the size uniform.
    #[must_use]
    pub fn with_particle_size(mut self, size: f32) -> Self {
        self.particle_size = size;
        self
    }

    /// Sets the transition durations.
    #[must_use]
    pub fn with_timing(mut self, timing: TransitionTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the pending-command policy.
    #[must_use]
    pub fn with_pending(mut self, pending: PendingCommandPolicy) -> Self {
        self.pending = pending;
        self
    }

    /// Checks the configuration before any loading starts.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DissolveError::InvalidArgument(
                "model name must not be empty".into(),
            ));
        }
        if self.particle_count == 0 {
            return Err(DissolveError::InvalidArgument(format!(
                "model '{}': particle count must be at least 1",
                self.name
            )));
        }
        if !self.particle_size.is_finite() || self.particle_size <= 0.0 {
            return Err(DissolveError::InvalidArgument(format!(
                "model '{}': particle size must be positive, got {}",
                self.name, self.particle_size
            )));
        }
        self.timing.validate()
    }
}

/// A set of models plus the sampling seed, usually read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageConfig {
    /// Models in registration order.
    pub models: Vec<ModelConfig>,
    /// Seed for particle sampling; entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl StageConfig {
    /// Parses a stage configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a stage configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
