//! Model entity and its transition state machine.
//!
//! A [`Model`] is created before its mesh exists. It moves through
//! `Idle -> Loaded -> Inactive | Active` once the mesh arrives, and afterwards only
//! between `Active` and `Inactive` in response to [`Model::add`] and
//! [`Model::remove`].

use std::f32::consts::PI;
use std::mem;

use dissolve_core::{
    DissolveError, Mesh, ModelConfig, ParticleBuffer, PendingCommandPolicy, Result,
    SurfaceSampler,
};
use dissolve_render::{ParticleMaterial, RenderableId, Scene, ShaderUniforms};
use dissolve_tween::{Ease, TweenSpec};
use rand::Rng;

use crate::transition::{AnimKey, AnimValue, Property, TransitionContext, TransitionEvent};

/// Index of a model within its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle state of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Constructed; the mesh has not arrived, or it could not be used.
    Idle,
    /// Mesh decoded and particles built; lasts only until `place_on_load` is applied.
    Loaded,
    /// Shown, including while fading in or out.
    Active,
    /// Loaded and not shown.
    Inactive,
}

/// Which transition, if any, is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Steady,
    Entering,
    Leaving,
}

/// A show or hide request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Remove,
}

/// One mesh rendered as a dissolving particle set.
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    config: ModelConfig,
    state: ModelState,
    phase: TransitionPhase,
    is_active: bool,
    mesh: Option<Mesh>,
    particles: Option<ParticleBuffer>,
    material: ParticleMaterial,
    rotation_y: f32,
    pending: Vec<Command>,
    failure: Option<String>,
}

impl Model {
    /// Creates an idle model.
    ///
    /// Fails with [`DissolveError::InvalidArgument`] if the configuration is invalid.
    pub fn new(id: ModelId, config: ModelConfig) -> Result<Self> {
        config.validate()?;
        let material = ParticleMaterial::new(config.color1, config.color2, config.particle_size);
        Ok(Self {
            id,
            config,
            state: ModelState::Idle,
            phase: TransitionPhase::Steady,
            is_active: false,
            mesh: None,
            particles: None,
            material,
            rotation_y: 0.0,
            pending: Vec::new(),
            failure: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> ModelState {
        self.state
    }

    #[must_use]
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Returns whether the particle set is attached to the scene.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns true once the mesh has loaded and particles exist.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.particles.is_some()
    }

    /// Returns the setup error message if loading or sampling failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns the handle used to attach this model to a scene.
    #[must_use]
    pub fn renderable(&self) -> RenderableId {
        RenderableId(self.id.index())
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    #[must_use]
    pub fn particles(&self) -> Option<&ParticleBuffer> {
        self.particles.as_ref()
    }

    /// Returns the live uniform values.
    #[must_use]
    pub fn material(&self) -> &ParticleMaterial {
        &self.material
    }

    /// Returns the live uniform values in GPU layout.
    #[must_use]
    pub fn uniforms(&self) -> ShaderUniforms {
        self.material.to_uniforms()
    }

    #[must_use]
    pub fn reveal_scale(&self) -> f32 {
        self.material.reveal_scale
    }

    #[must_use]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Returns commands waiting for the mesh to load.
    #[must_use]
    pub fn pending_commands(&self) -> &[Command] {
        &self.pending
    }

    /// Finishes setup with a decoded mesh.
    ///
    /// Builds the sampler and the particle buffer, applies `place_on_load`, then
    /// replays the last deferred command. On error the model stays `Idle` for good.
    pub fn finish_load<S, R>(
        &mut self,
        mesh: Mesh,
        rng: &mut R,
        ctx: &mut TransitionContext<'_, S>,
    ) -> Result<()>
    where
        S: Scene + ?Sized,
        R: Rng + ?Sized,
    {
        if self.state != ModelState::Idle || self.failure.is_some() {
            log::warn!("model '{}': ignoring repeated load", self.name());
            return Ok(());
        }

        let particles = match SurfaceSampler::new(&mesh)
            .and_then(|sampler| ParticleBuffer::build(&sampler, self.config.particle_count, rng))
        {
            Ok(particles) => particles,
            Err(e) => {
                self.fail_load(&e);
                return Err(e);
            }
        };

        log::info!(
            "model '{}' loaded: {} triangles, {} particles",
            self.name(),
            mesh.num_triangles(),
            particles.len()
        );
        self.mesh = Some(mesh);
        self.particles = Some(particles);
        self.state = ModelState::Loaded;

        if self.config.place_on_load {
            self.add(ctx)?;
        } else {
            self.state = ModelState::Inactive;
        }

        // Only the last deferred command decides the final state.
        let pending = mem::take(&mut self.pending);
        if let Some(&command) = pending.last() {
            log::debug!(
                "model '{}': replaying deferred {command:?} ({} queued)",
                self.name(),
                pending.len()
            );
            self.apply(command, ctx)?;
        }
        Ok(())
    }

    /// Marks setup as failed. Pending commands are dropped.
    pub fn fail_load(&mut self, error: &DissolveError) {
        log::error!("model '{}' failed to load: {error}", self.name());
        self.failure = Some(error.to_string());
        if !self.pending.is_empty() {
            log::warn!(
                "model '{}': dropping {} deferred commands",
                self.name(),
                self.pending.len()
            );
            self.pending.clear();
        }
    }

    /// Runs a command.
    pub fn apply<S: Scene + ?Sized>(
        &mut self,
        command: Command,
        ctx: &mut TransitionContext<'_, S>,
    ) -> Result<()> {
        match command {
            Command::Add => self.add(ctx),
            Command::Remove => self.remove(ctx),
        }
    }

    /// Shows the particle set and starts the reveal.
    ///
    /// The renderable is attached and `is_active` set before returning; the reveal,
    /// rotation reset and background change run as independent tweens.
    pub fn add<S: Scene + ?Sized>(&mut self, ctx: &mut TransitionContext<'_, S>) -> Result<()> {
        if self.state == ModelState::Idle {
            return self.defer(Command::Add);
        }

        let renderable = self.renderable();
        if ctx.scene.attach(renderable) {
            log::debug!("model '{}' attached", self.name());
        }
        self.is_active = true;
        self.state = ModelState::Active;
        self.phase = TransitionPhase::Entering;

        let timing = self.config.timing;
        ctx.tweens.to(
            AnimKey::reveal_scale(self.id),
            AnimValue::Scalar(1.0),
            TweenSpec::new(timing.reveal_duration, Ease::CubicOut).with_delay(timing.reveal_delay),
            Some(TransitionEvent::Revealed(self.id)),
        );
        ctx.tweens.to(
            AnimKey::background(),
            AnimValue::Color(self.config.background.to_vec3()),
            TweenSpec::new(timing.background_duration, Ease::QuadOut),
            None,
        );

        let rotation = AnimKey::rotation_y(self.id);
        if self.rotation_y.abs() > f32::EPSILON || ctx.tweens.is_animating(&rotation) {
            ctx.tweens.to(
                rotation,
                AnimValue::Scalar(0.0),
                TweenSpec::new(timing.rotation_duration, Ease::CubicOut),
                None,
            );
        }

        log::debug!("model '{}': add", self.name());
        Ok(())
    }

    /// Starts the dissolve. The renderable is detached when the dissolve completes.
    pub fn remove<S: Scene + ?Sized>(&mut self, ctx: &mut TransitionContext<'_, S>) -> Result<()> {
        match self.state {
            ModelState::Idle => return self.defer(Command::Remove),
            ModelState::Loaded | ModelState::Inactive => {
                log::debug!("model '{}': remove on hidden model ignored", self.name());
                return Ok(());
            }
            ModelState::Active => {}
        }

        self.phase = TransitionPhase::Leaving;
        let timing = self.config.timing;
        ctx.tweens.to(
            AnimKey::reveal_scale(self.id),
            AnimValue::Scalar(0.0),
            TweenSpec::new(timing.dissolve_duration, Ease::CubicOut),
            Some(TransitionEvent::Dissolved(self.id)),
        );
        ctx.tweens.to(
            AnimKey::rotation_y(self.id),
            AnimValue::Scalar(PI),
            TweenSpec::new(timing.rotation_duration, Ease::CubicOut),
            None,
        );

        log::debug!("model '{}': remove", self.name());
        Ok(())
    }

    /// Applies the side effect of a completed transition tween.
    pub fn on_transition_event<S: Scene + ?Sized>(&mut self, event: TransitionEvent, scene: &mut S) {
        match (event, self.phase) {
            (TransitionEvent::Revealed(_), TransitionPhase::Entering) => {
                self.phase = TransitionPhase::Steady;
                log::info!("model '{}' revealed", self.name());
            }
            (TransitionEvent::Dissolved(_), TransitionPhase::Leaving) => {
                scene.detach(self.renderable());
                self.is_active = false;
                self.state = ModelState::Inactive;
                self.phase = TransitionPhase::Steady;
                log::info!("model '{}' dissolved and detached", self.name());
            }
            (event, phase) => {
                log::trace!("model '{}': stale {event:?} during {phase:?}", self.name());
            }
        }
    }

    fn defer(&mut self, command: Command) -> Result<()> {
        if self.failure.is_some() || self.config.pending == PendingCommandPolicy::Reject {
            log::warn!("model '{}': {command:?} rejected, not loaded", self.name());
            return Err(DissolveError::NotLoaded(self.config.name.clone()));
        }
        log::debug!("model '{}': {command:?} deferred until loaded", self.name());
        self.pending.push(command);
        Ok(())
    }

    pub(crate) fn set_time(&mut self, time: f32) {
        self.material.time = time;
    }

    pub(crate) fn read_property(&self, property: Property) -> Option<f32> {
        match property {
            Property::RevealScale => Some(self.material.reveal_scale),
            Property::RotationY => Some(self.rotation_y),
            Property::Background => None,
        }
    }

    pub(crate) fn write_property(&mut self, property: Property, value: f32) {
        match property {
            Property::RevealScale => self.material.reveal_scale = value,
            Property::RotationY => self.rotation_y = value,
            Property::Background => {}
        }
    }
}
