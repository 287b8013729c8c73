//! The frame driver.
//!
//! A [`Stage`] owns every model, the scene they attach to, the shared ambient state
//! and the tween engine. Everything runs on the caller's thread; the only
//! asynchronous input is the load channel, drained at the top of [`Stage::tick`].

use dissolve_core::{DissolveError, ModelConfig, Result, Rgb, StageConfig};
use dissolve_render::{FrameRenderer, FrameView, RenderItem, Scene, SceneGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::loader::{LoadCompletion, LoadEvent, MeshSource};
use crate::model::{Command, Model, ModelId, ModelState};
use crate::transition::{Ambient, TransitionContext, TransitionEvent, Tweens, World};

/// What happened during one [`Stage::tick`].
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Models attached to the scene after this frame.
    pub active_models: usize,
    /// Models whose setup finished this frame.
    pub loaded: Vec<ModelId>,
    /// Models whose setup failed this frame.
    pub failures: Vec<(ModelId, DissolveError)>,
}

/// Models, scene, ambient state and transitions of one view.
pub struct Stage<S: Scene = SceneGraph> {
    models: Vec<Model>,
    scene: S,
    ambient: Ambient,
    tweens: Tweens,
    source: Box<dyn MeshSource>,
    loads_tx: flume::Sender<LoadEvent>,
    loads_rx: flume::Receiver<LoadEvent>,
    rng: StdRng,
    elapsed: f32,
}

impl Stage<SceneGraph> {
    /// Creates an empty stage over a fresh [`SceneGraph`].
    pub fn new(source: impl MeshSource + 'static) -> Self {
        Self::with_scene(SceneGraph::new(), source)
    }

    /// Creates a stage and registers every model of `config`.
    pub fn from_config(config: StageConfig, source: impl MeshSource + 'static) -> Result<Self> {
        let mut stage = Self::new(source);
        if let Some(seed) = config.seed {
            stage = stage.with_seed(seed);
        }
        for model in config.models {
            stage.add_model(model)?;
        }
        Ok(stage)
    }
}

impl<S: Scene> Stage<S> {
    /// Creates an empty stage over `scene`.
    pub fn with_scene(scene: S, source: impl MeshSource + 'static) -> Self {
        let (loads_tx, loads_rx) = flume::unbounded();
        Self {
            models: Vec::new(),
            scene,
            ambient: Ambient::default(),
            tweens: Tweens::new(),
            source: Box::new(source),
            loads_tx,
            loads_rx,
            rng: StdRng::from_entropy(),
            elapsed: 0.0,
        }
    }

    /// Seeds particle sampling so runs are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sets the initial background color.
    #[must_use]
    pub fn with_background(mut self, background: Rgb) -> Self {
        self.ambient.background = background;
        self
    }

    /// Registers a model and starts loading its mesh.
    ///
    /// Returns as soon as the load is issued. Commands against the model are
    /// handled per its `PendingCommandPolicy` until the mesh arrives.
    pub fn add_model(&mut self, config: ModelConfig) -> Result<ModelId> {
        if self.models.iter().any(|m| m.name() == config.name) {
            return Err(DissolveError::ModelExists(config.name));
        }

        let id = ModelId::new(self.models.len());
        let model = Model::new(id, config)?;
        let path = model.config().file.clone();
        log::info!("registered model '{}', loading {}", model.name(), path.display());
        self.models.push(model);

        let completion = LoadCompletion::new(id, path.clone(), self.loads_tx.clone());
        self.source.load(&path, completion);
        Ok(id)
    }

    /// Looks up a model by name.
    pub fn find(&self, name: &str) -> Result<ModelId> {
        self.models
            .iter()
            .find(|m| m.name() == name)
            .map(Model::id)
            .ok_or_else(|| DissolveError::ModelNotFound(name.to_string()))
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.index())
    }

    /// Returns every model in registration order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }

    /// Returns the current background color.
    pub fn background(&self) -> Rgb {
        self.ambient.background
    }

    /// Returns seconds accumulated by [`tick`](Self::tick).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns true while some model is still waiting for its mesh.
    pub fn is_loading(&self) -> bool {
        self.models
            .iter()
            .any(|m| m.state() == ModelState::Idle && m.failure().is_none())
    }

    /// Returns true while any tween is scheduled.
    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty()
    }

    /// Shows a model.
    pub fn add(&mut self, id: ModelId) -> Result<()> {
        let model = self
            .models
            .get_mut(id.index())
            .ok_or_else(|| missing(id))?;
        let mut ctx = TransitionContext {
            scene: &mut self.scene,
            tweens: &mut self.tweens,
        };
        model.add(&mut ctx)
    }

    /// Hides a model.
    pub fn remove(&mut self, id: ModelId) -> Result<()> {
        let model = self
            .models
            .get_mut(id.index())
            .ok_or_else(|| missing(id))?;
        let mut ctx = TransitionContext {
            scene: &mut self.scene,
            tweens: &mut self.tweens,
        };
        model.remove(&mut ctx)
    }

    /// Removes every other shown model, then adds `id`. Both transitions run in
    /// the same frames.
    ///
    /// Models still loading with a deferred `add` get a deferred `remove`, so they
    /// stay hidden once their mesh arrives.
    pub fn show_only(&mut self, id: ModelId) -> Result<()> {
        if id.index() >= self.models.len() {
            return Err(missing(id));
        }
        let others: Vec<ModelId> = self
            .models
            .iter()
            .filter(|m| m.id() != id)
            .filter(|m| m.is_active() || m.pending_commands().last() == Some(&Command::Add))
            .map(Model::id)
            .collect();
        for other in others {
            self.remove(other)?;
        }
        self.add(id)
    }

    /// Advances the stage by `dt` seconds and renders one frame.
    pub fn tick<R>(&mut self, dt: f32, renderer: &mut R) -> FrameReport
    where
        R: FrameRenderer + ?Sized,
    {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("ignoring invalid frame delta {dt}");
            0.0
        };

        let mut report = FrameReport::default();
        self.process_loads(&mut report);

        self.elapsed += dt;
        let events = {
            let mut world = World {
                models: &mut self.models,
                ambient: &mut self.ambient,
            };
            self.tweens.tick(dt, &mut world)
        };
        self.dispatch(events);
        self.update_time();

        renderer.render(&self.frame_view());
        report.active_models = self.scene.children().len();
        report
    }

    /// Finishes pending loads and jumps every tween to its end value.
    ///
    /// Does not render and does not advance the clock. Loads still running on
    /// other threads are not waited for.
    pub fn settle(&mut self) -> FrameReport {
        let mut report = FrameReport::default();
        self.process_loads(&mut report);

        while !self.tweens.is_empty() {
            let events = {
                let mut world = World {
                    models: &mut self.models,
                    ambient: &mut self.ambient,
                };
                self.tweens.finish_all(&mut world)
            };
            self.dispatch(events);
        }
        self.update_time();

        report.active_models = self.scene.children().len();
        report
    }

    /// Builds the view handed to the renderer.
    pub fn frame_view(&self) -> FrameView<'_> {
        let items = self
            .scene
            .children()
            .iter()
            .filter_map(|&renderable| {
                let model = self.models.get(renderable.0)?;
                let particles = model.particles()?;
                Some(RenderItem {
                    id: renderable,
                    name: model.name(),
                    particles,
                    uniforms: model.uniforms(),
                    rotation_y: model.rotation_y(),
                })
            })
            .collect();

        FrameView {
            elapsed: self.elapsed,
            background: self.ambient.background,
            items,
        }
    }

    fn process_loads(&mut self, report: &mut FrameReport) {
        while let Ok(event) = self.loads_rx.try_recv() {
            let LoadEvent {
                model: id,
                path,
                result,
            } = event;
            let Some(model) = self.models.get_mut(id.index()) else {
                log::warn!("load of {} for unknown model {id:?}", path.display());
                continue;
            };

            let was_loading = model.state() == ModelState::Idle && model.failure().is_none();
            let outcome = result.and_then(|mesh| {
                let mut ctx = TransitionContext {
                    scene: &mut self.scene,
                    tweens: &mut self.tweens,
                };
                model.finish_load(mesh, &mut self.rng, &mut ctx)
            });

            match outcome {
                Ok(()) if was_loading && model.is_loaded() => report.loaded.push(id),
                Ok(()) => {}
                Err(e) => {
                    if model.failure().is_none() {
                        model.fail_load(&e);
                    }
                    report.failures.push((id, e));
                }
            }
        }
    }

    fn dispatch(&mut self, events: Vec<TransitionEvent>) {
        for event in events {
            if let Some(model) = self.models.get_mut(event.model().index()) {
                model.on_transition_event(event, &mut self.scene);
            }
        }
    }

    fn update_time(&mut self) {
        let elapsed = self.elapsed;
        for model in self.models.iter_mut().filter(|m| m.is_active()) {
            model.set_time(elapsed);
        }
    }
}

fn missing(id: ModelId) -> DissolveError {
    DissolveError::ModelNotFound(format!("#{}", id.index()))
}
