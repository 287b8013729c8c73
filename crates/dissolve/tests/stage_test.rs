//! Integration tests driving a [`Stage`] through full transitions.

use std::f32::consts::PI;
use std::thread;
use std::time::Duration;

use dissolve::*;
use proptest::prelude::*;

/// Scene that counts every attach and detach it sees.
#[derive(Debug, Default)]
struct RecordingScene {
    graph: SceneGraph,
    attaches: usize,
    detaches: usize,
}

impl Scene for RecordingScene {
    fn attach(&mut self, id: RenderableId) -> bool {
        let attached = self.graph.attach(id);
        if attached {
            self.attaches += 1;
        }
        attached
    }

    fn detach(&mut self, id: RenderableId) -> bool {
        let detached = self.graph.detach(id);
        if detached {
            self.detaches += 1;
        }
        detached
    }

    fn contains(&self, id: RenderableId) -> bool {
        self.graph.contains(id)
    }

    fn children(&self) -> &[RenderableId] {
        self.graph.children()
    }
}

fn unit_square() -> Mesh {
    Mesh::new(vec![
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
        Triangle::new(Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y),
    ])
}

fn skull_config() -> ModelConfig {
    ModelConfig::new(
        "skull",
        "skull.glb",
        "red".parse().unwrap(),
        "yellow".parse().unwrap(),
        "#47001b".parse().unwrap(),
    )
    .with_particle_count(64)
}

fn horse_config() -> ModelConfig {
    ModelConfig::new(
        "horse",
        "horse.glb",
        "blue".parse().unwrap(),
        "pink".parse().unwrap(),
        "#110077".parse().unwrap(),
    )
    .with_particle_count(64)
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_mesh("skull.glb", unit_square())
        .with_mesh("horse.glb", unit_square())
}

fn recording_stage() -> Stage<RecordingScene> {
    Stage::with_scene(RecordingScene::default(), source()).with_seed(7)
}

/// Registers the skull, delivers its mesh and returns its id.
fn loaded_skull(stage: &mut Stage<RecordingScene>) -> ModelId {
    let id = stage.add_model(skull_config()).unwrap();
    stage.tick(0.0, &mut HeadlessRenderer::new());
    assert_eq!(stage.model(id).unwrap().state(), ModelState::Inactive);
    id
}

#[test]
fn test_end_to_end_reveal() {
    let mut stage = Stage::new(MemorySource::new().with_mesh("square.glb", unit_square()))
        .with_seed(11);
    let config = ModelConfig::new("square", "square.glb", Rgb::WHITE, Rgb::WHITE, Rgb::BLACK)
        .with_particle_count(4);
    let id = stage.add_model(config).unwrap();
    let report = stage.tick(0.0, &mut HeadlessRenderer::new());
    assert_eq!(report.loaded, vec![id]);

    let particles = stage.model(id).unwrap().particles().unwrap();
    assert_eq!(particles.len(), 4);
    for p in particles.positions() {
        assert!(p.x >= -1e-6 && p.x <= 1.0 + 1e-6);
        assert!(p.y >= -1e-6 && p.y <= 1.0 + 1e-6);
        assert!(p.z.abs() < 1e-6);
    }

    stage.add(id).unwrap();
    assert!(stage.model(id).unwrap().is_active());

    stage.settle();
    let model = stage.model(id).unwrap();
    assert_eq!(model.reveal_scale(), 1.0);
    assert_eq!(model.rotation_y(), 0.0);
    assert_eq!(model.phase(), TransitionPhase::Steady);
}

#[test]
fn test_add_twice_attaches_once() {
    let mut stage = recording_stage();
    let id = loaded_skull(&mut stage);

    stage.add(id).unwrap();
    stage.add(id).unwrap();
    stage.settle();

    assert_eq!(stage.scene().attaches, 1);
    assert_eq!(stage.scene().children(), &[RenderableId(id_index(&stage, id))]);
    assert_eq!(stage.model(id).unwrap().reveal_scale(), 1.0);
}

#[test]
fn test_remove_twice_detaches_once() {
    let mut stage = recording_stage();
    let id = loaded_skull(&mut stage);
    stage.add(id).unwrap();
    stage.settle();

    stage.remove(id).unwrap();
    stage.remove(id).unwrap();
    stage.settle();
    stage.remove(id).unwrap();
    stage.settle();

    assert_eq!(stage.scene().detaches, 1);
    let model = stage.model(id).unwrap();
    assert!(!model.is_active());
    assert_eq!(model.reveal_scale(), 0.0);
    assert_eq!(model.rotation_y(), PI);
}

#[test]
fn test_detach_waits_for_dissolve() {
    let mut stage = recording_stage();
    let id = loaded_skull(&mut stage);
    stage.add(id).unwrap();
    stage.settle();

    let mut renderer = HeadlessRenderer::new();
    stage.remove(id).unwrap();
    stage.tick(0.4, &mut renderer);

    let model = stage.model(id).unwrap();
    assert!(model.is_active());
    assert!(model.reveal_scale() > 0.0 && model.reveal_scale() < 1.0);
    assert_eq!(stage.scene().detaches, 0);
    assert_eq!(renderer.last_frame().unwrap().names, vec!["skull".to_string()]);

    stage.tick(0.5, &mut renderer);
    assert!(!stage.model(id).unwrap().is_active());
    assert_eq!(stage.scene().detaches, 1);

    stage.tick(0.016, &mut renderer);
    assert!(renderer.last_frame().unwrap().names.is_empty());
}

#[test]
fn test_add_then_remove_detaches_once() {
    let mut stage = recording_stage();
    let id = loaded_skull(&mut stage);

    stage.add(id).unwrap();
    stage.remove(id).unwrap();
    stage.settle();

    assert_eq!(stage.scene().attaches, 1);
    assert_eq!(stage.scene().detaches, 1);
    assert!(!stage.model(id).unwrap().is_active());
}

#[test]
fn test_remove_then_add_never_detaches() {
    let mut stage = recording_stage();
    let id = loaded_skull(&mut stage);
    stage.add(id).unwrap();
    stage.settle();

    let mut renderer = HeadlessRenderer::new();
    stage.remove(id).unwrap();
    stage.tick(0.2, &mut renderer);
    stage.add(id).unwrap();
    stage.settle();

    assert_eq!(stage.scene().detaches, 0);
    let model = stage.model(id).unwrap();
    assert!(model.is_active());
    assert_eq!(model.reveal_scale(), 1.0);
    assert_eq!(model.rotation_y(), 0.0);
}

#[test]
fn test_swap_crossfades_background() {
    let mut stage = recording_stage();
    let skull = stage
        .add_model(skull_config().with_place_on_load(true))
        .unwrap();
    let horse = stage.add_model(horse_config()).unwrap();

    let mut renderer = HeadlessRenderer::new();
    stage.tick(0.0, &mut renderer);
    stage.settle();
    assert_eq!(stage.background().to_hex(), 0x47_001b);

    stage.remove(skull).unwrap();
    stage.add(horse).unwrap();
    stage.tick(0.4, &mut renderer);

    // Both are shown while the transitions overlap.
    assert_eq!(renderer.last_frame().unwrap().names.len(), 2);
    let mid = stage.background();
    assert_ne!(mid.to_hex(), 0x47_001b);
    assert_ne!(mid.to_hex(), 0x11_0077);

    stage.settle();
    assert_eq!(stage.background().to_hex(), 0x11_0077);
    assert!(!stage.model(skull).unwrap().is_active());
    assert!(stage.model(horse).unwrap().is_active());
}

#[test]
fn test_commands_deferred_until_load() {
    let mut stage = recording_stage();
    let id = stage.add_model(skull_config()).unwrap();

    stage.add(id).unwrap();
    assert_eq!(stage.model(id).unwrap().pending_commands(), &[Command::Add]);
    assert_eq!(stage.scene().attaches, 0);

    stage.tick(0.0, &mut HeadlessRenderer::new());
    let model = stage.model(id).unwrap();
    assert!(model.pending_commands().is_empty());
    assert!(model.is_active());
    assert_eq!(stage.scene().attaches, 1);
}

#[test]
fn test_commands_rejected_until_load() {
    let mut stage = recording_stage();
    let id = stage
        .add_model(skull_config().with_pending(PendingCommandPolicy::Reject))
        .unwrap();

    assert!(matches!(stage.add(id), Err(DissolveError::NotLoaded(_))));

    stage.tick(0.0, &mut HeadlessRenderer::new());
    stage.add(id).unwrap();
    assert!(stage.model(id).unwrap().is_active());
}

#[test]
fn test_failed_load_keeps_stage_running() {
    let mut stage = Stage::new(MemorySource::new().with_mesh("horse.glb", unit_square()));
    let skull = stage.add_model(skull_config()).unwrap();
    let horse = stage.add_model(horse_config()).unwrap();

    let report = stage.tick(0.0, &mut HeadlessRenderer::new());
    assert_eq!(report.loaded, vec![horse]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, skull);
    assert!(matches!(
        report.failures[0].1,
        DissolveError::LoadFailed { .. }
    ));

    let failed = stage.model(skull).unwrap();
    assert_eq!(failed.state(), ModelState::Idle);
    assert!(failed.failure().is_some());
    assert!(matches!(stage.add(skull), Err(DissolveError::NotLoaded(_))));
    assert!(!stage.is_loading());

    stage.add(horse).unwrap();
    stage.settle();
    assert!(stage.model(horse).unwrap().is_active());
}

#[test]
fn test_degenerate_mesh_rejected() {
    let flat = Mesh::new(vec![Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0)]);
    let mut stage = Stage::new(MemorySource::new().with_mesh("skull.glb", flat));
    let id = stage.add_model(skull_config()).unwrap();

    let report = stage.tick(0.0, &mut HeadlessRenderer::new());
    assert!(matches!(report.failures[0].1, DissolveError::InvalidMesh(_)));
    assert_eq!(stage.model(id).unwrap().state(), ModelState::Idle);
}

#[test]
fn test_zero_duration_completes() {
    let mut stage = recording_stage();
    let id = stage
        .add_model(skull_config().with_timing(TransitionTiming::INSTANT))
        .unwrap();
    let mut renderer = HeadlessRenderer::new();
    stage.tick(0.0, &mut renderer);

    stage.add(id).unwrap();
    stage.tick(0.0, &mut renderer);
    assert_eq!(stage.model(id).unwrap().reveal_scale(), 1.0);
    assert!(!stage.is_animating());

    stage.remove(id).unwrap();
    stage.tick(0.0, &mut renderer);
    assert!(!stage.model(id).unwrap().is_active());
}

#[test]
fn test_threaded_source() {
    let source = ThreadedSource::new(|path| {
        thread::sleep(Duration::from_millis(5));
        if path.ends_with("skull.glb") {
            Ok(unit_square())
        } else {
            Err(DissolveError::LoadFailed {
                path: path.display().to_string(),
                reason: "unknown".into(),
            })
        }
    });
    let mut stage = Stage::new(source);
    let id = stage
        .add_model(skull_config().with_place_on_load(true))
        .unwrap();

    let mut renderer = HeadlessRenderer::new();
    for _ in 0..500 {
        if !stage.is_loading() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
        stage.tick(0.0, &mut renderer);
    }
    assert!(!stage.is_loading());
    assert!(stage.model(id).unwrap().is_active());
}

#[test]
fn test_show_only_hides_model_still_loading() {
    let source = ThreadedSource::new(|path| {
        if path.ends_with("horse.glb") {
            thread::sleep(Duration::from_millis(200));
        }
        Ok(unit_square())
    });
    let mut stage = Stage::new(source).with_seed(3);
    let skull = stage.add_model(skull_config()).unwrap();
    let horse = stage.add_model(horse_config()).unwrap();

    let mut renderer = HeadlessRenderer::new();
    for _ in 0..500 {
        if stage.model(skull).unwrap().is_loaded() {
            break;
        }
        thread::sleep(Duration::from_millis(1));
        stage.tick(0.0, &mut renderer);
    }
    assert!(stage.model(skull).unwrap().is_loaded());
    assert_eq!(stage.model(horse).unwrap().state(), ModelState::Idle);

    stage.add(horse).unwrap();
    stage.show_only(skull).unwrap();
    assert_eq!(
        stage.model(horse).unwrap().pending_commands(),
        &[Command::Add, Command::Remove]
    );

    for _ in 0..1000 {
        if !stage.is_loading() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
        stage.tick(0.0, &mut renderer);
    }
    assert!(!stage.is_loading());
    stage.settle();

    assert!(stage.model(skull).unwrap().is_active());
    assert!(!stage.model(horse).unwrap().is_active());
    assert_eq!(stage.scene().children().len(), 1);
}

#[test]
fn test_seeded_stages_sample_identically() {
    let mut a = Stage::new(source()).with_seed(42);
    let mut b = Stage::new(source()).with_seed(42);
    let ia = a.add_model(skull_config()).unwrap();
    let ib = b.add_model(skull_config()).unwrap();
    a.settle();
    b.settle();

    assert_eq!(
        a.model(ia).unwrap().particles(),
        b.model(ib).unwrap().particles()
    );
}

#[test]
fn test_stage_from_json_config() {
    let json = serde_json::json!({
        "seed": 9,
        "models": [
            {
                "name": "skull",
                "file": "skull.glb",
                "color1": "red",
                "color2": "yellow",
                "background": "#47001b",
                "place_on_load": true,
                "particle_count": 32
            },
            {
                "name": "horse",
                "file": "horse.glb",
                "color1": "blue",
                "color2": "pink",
                "background": "#110077",
                "timing": { "reveal_delay": 0.0 }
            }
        ]
    })
    .to_string();

    let config = StageConfig::from_json_str(&json).unwrap();
    assert_eq!(config.models[1].particle_count, DEFAULT_PARTICLE_COUNT);
    assert_eq!(config.models[1].timing.reveal_delay, 0.0);
    assert_eq!(config.models[1].timing.reveal_duration, 0.8);

    let mut stage = Stage::from_config(config, source()).unwrap();
    stage.settle();

    let skull = stage.find("skull").unwrap();
    let horse = stage.find("horse").unwrap();
    assert!(stage.model(skull).unwrap().is_active());
    assert_eq!(stage.model(skull).unwrap().particles().unwrap().len(), 32);
    assert_eq!(stage.model(horse).unwrap().state(), ModelState::Inactive);
}

#[test]
fn test_json_config_requires_colors() {
    let json = r#"{ "models": [ { "name": "skull", "file": "skull.glb" } ] }"#;
    assert!(matches!(
        StageConfig::from_json_str(json),
        Err(DissolveError::JsonError(_))
    ));
}

fn id_index(stage: &Stage<RecordingScene>, id: ModelId) -> usize {
    stage.model(id).unwrap().renderable().0
}

proptest! {
    #[test]
    fn prop_final_state_follows_last_command(
        commands in prop::collection::vec((any::<bool>(), 0.0f32..0.5), 1..24)
    ) {
        let mut stage = recording_stage();
        let id = loaded_skull(&mut stage);
        let mut renderer = HeadlessRenderer::new();

        for &(add, dt) in &commands {
            if add {
                stage.add(id).unwrap();
            } else {
                stage.remove(id).unwrap();
            }
            stage.tick(dt, &mut renderer);
            prop_assert!(stage.scene().children().len() <= 1);
        }
        stage.settle();

        let model = stage.model(id).unwrap();
        let scene = stage.scene();
        prop_assert!(scene.attaches >= scene.detaches);
        prop_assert!(scene.attaches - scene.detaches <= 1);

        let last_add = commands.last().map_or(false, |c| c.0);
        if last_add {
            prop_assert!(model.is_active());
            prop_assert!(scene.contains(model.renderable()));
            prop_assert_eq!(model.reveal_scale(), 1.0);
            prop_assert_eq!(model.rotation_y(), 0.0);
        } else {
            prop_assert!(!model.is_active());
            prop_assert!(!scene.contains(model.renderable()));
            prop_assert_eq!(model.reveal_scale(), 0.0);
        }
    }
}
