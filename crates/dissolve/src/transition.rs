//! Animated properties and transition events.
//!
//! Every animated value in a stage is addressed by an [`AnimKey`]. The tween
//! engine keeps one tween per key, so a new command on a model replaces whatever
//! that model was doing on the same property.

use dissolve_core::{Rgb, Vec3};
use dissolve_render::Scene;
use dissolve_tween::{Animatable, Lerp, TweenEngine};

use crate::model::{Model, ModelId};

/// Owner of an animated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Model(ModelId),
    /// The process-wide ambient state shared by all models.
    Ambient,
}

/// Animated property of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    RevealScale,
    RotationY,
    Background,
}

/// Address of one animated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimKey {
    pub target: Target,
    pub property: Property,
}

impl AnimKey {
    /// Reveal-scale uniform of a model.
    pub fn reveal_scale(model: ModelId) -> Self {
        Self {
            target: Target::Model(model),
            property: Property::RevealScale,
        }
    }

    /// Y rotation of a model's particle set.
    pub fn rotation_y(model: ModelId) -> Self {
        Self {
            target: Target::Model(model),
            property: Property::RotationY,
        }
    }

    /// Shared background color.
    pub fn background() -> Self {
        Self {
            target: Target::Ambient,
            property: Property::Background,
        }
    }
}

/// Value of an animated property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Color(Vec3),
}

impl Lerp for AnimValue {
    fn lerp(self, to: Self, t: f32) -> Self {
        match (self, to) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(Lerp::lerp(a, b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(Lerp::lerp(a, b, t)),
            (_, to) => to,
        }
    }
}

/// Side effects fired when a transition tween completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The reveal-scale tween of an `add` reached 1.
    Revealed(ModelId),
    /// The reveal-scale tween of a `remove` reached 0.
    Dissolved(ModelId),
}

impl TransitionEvent {
    /// Returns the model the event belongs to.
    pub fn model(self) -> ModelId {
        match self {
            Self::Revealed(id) | Self::Dissolved(id) => id,
        }
    }
}

/// The tween engine type used by stages.
pub type Tweens = TweenEngine<AnimKey, AnimValue, TransitionEvent>;

/// Shared state written by transitions of any model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ambient {
    /// Color behind every particle set.
    pub background: Rgb,
}

/// Mutable collaborators a model needs to run a command.
pub struct TransitionContext<'a, S: Scene + ?Sized> {
    pub scene: &'a mut S,
    pub tweens: &'a mut Tweens,
}

/// All tween targets of a stage, viewed as one [`Animatable`].
pub(crate) struct World<'a> {
    pub models: &'a mut [Model],
    pub ambient: &'a mut Ambient,
}

impl Animatable<AnimKey, AnimValue> for World<'_> {
    fn read(&self, key: &AnimKey) -> Option<AnimValue> {
        match key.target {
            Target::Model(id) => self
                .models
                .get(id.index())
                .and_then(|m| m.read_property(key.property))
                .map(AnimValue::Scalar),
            Target::Ambient => match key.property {
                Property::Background => Some(AnimValue::Color(self.ambient.background.to_vec3())),
                Property::RevealScale | Property::RotationY => None,
            },
        }
    }

    fn write(&mut self, key: &AnimKey, value: AnimValue) {
        match (key.target, value) {
            (Target::Model(id), AnimValue::Scalar(v)) => {
                if let Some(model) = self.models.get_mut(id.index()) {
                    model.write_property(key.property, v);
                }
            }
            (Target::Ambient, AnimValue::Color(c)) if key.property == Property::Background => {
                self.ambient.background = Rgb(c);
            }
            _ => log::warn!("ignoring {value:?} written to {key:?}"),
        }
    }
}
