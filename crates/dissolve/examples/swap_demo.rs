#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
//! Headless demo swapping two particle models.
//!
//! A sphere ("skull") and a torus ("horse") are generated procedurally and served
//! from memory. The skull is placed on load; every two seconds the demo swaps to
//! the other model and prints a frame summary.
//!
//! Run with `RUST_LOG=debug` to see every command and transition.

use std::f32::consts::{PI, TAU};

use dissolve::{
    init_logging, HeadlessRenderer, MemorySource, Mesh, ModelConfig, Result, Stage, UVec3, Vec3,
};

const FRAME: f32 = 1.0 / 60.0;

/// Triangulates a parametric surface over a `rows x cols` grid. Columns always
/// wrap around; rows wrap only for closed surfaces such as a torus.
fn grid(
    rows: u32,
    cols: u32,
    wrap_rows: bool,
    point: impl Fn(f32, f32) -> Vec3,
) -> Result<Mesh> {
    let vertex_rows = if wrap_rows { rows } else { rows + 1 };
    let mut vertices = Vec::with_capacity((vertex_rows * cols) as usize);
    for i in 0..vertex_rows {
        for j in 0..cols {
            vertices.push(point(i as f32 / rows as f32, j as f32 / cols as f32));
        }
    }

    let index = |i: u32, j: u32| (i % vertex_rows) * cols + (j % cols);
    let mut faces = Vec::with_capacity((2 * rows * cols) as usize);
    for i in 0..rows {
        for j in 0..cols {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            faces.push(UVec3::new(a, b, c));
            faces.push(UVec3::new(a, c, d));
        }
    }

    Mesh::from_indexed(&vertices, &faces)
}

fn sphere(radius: f32) -> Result<Mesh> {
    // Pole rows collapse to a point; the zero-area triangles there are never sampled.
    grid(24, 48, false, |s, t| {
        let theta = s * PI;
        let phi = t * TAU;
        Vec3::new(
            radius * theta.sin() * phi.cos(),
            radius * theta.cos(),
            radius * theta.sin() * phi.sin(),
        )
    })
}

fn torus(major: f32, minor: f32) -> Result<Mesh> {
    grid(48, 24, true, |s, t| {
        let u = s * TAU;
        let v = t * TAU;
        Vec3::new(
            (major + minor * v.cos()) * u.cos(),
            minor * v.sin(),
            (major + minor * v.cos()) * u.sin(),
        )
    })
}

fn main() -> Result<()> {
    init_logging();

    let source = MemorySource::new()
        .with_mesh("models/skull.glb", sphere(1.0)?)
        .with_mesh("models/horse.glb", torus(1.0, 0.35)?);
    let mut stage = Stage::new(source).with_seed(2024);

    let skull = stage.add_model(
        ModelConfig::new(
            "skull",
            "models/skull.glb",
            "red".parse()?,
            "yellow".parse()?,
            "#47001b".parse()?,
        )
        .with_place_on_load(true),
    )?;
    let horse = stage.add_model(ModelConfig::new(
        "horse",
        "models/horse.glb",
        "blue".parse()?,
        "pink".parse()?,
        "#110077".parse()?,
    ))?;

    let mut renderer = HeadlessRenderer::new();
    let mut showing = skull;
    let frames_per_swap = (2.0 / FRAME) as u32;

    for frame in 0..frames_per_swap * 4 {
        if frame > 0 && frame % frames_per_swap == 0 {
            showing = if showing == skull { horse } else { skull };
            stage.show_only(showing)?;
        }

        let report = stage.tick(FRAME, &mut renderer);
        for (id, error) in &report.failures {
            eprintln!("model {id:?} failed: {error}");
        }

        if frame % 30 == 0 {
            print_frame(&stage, &renderer);
        }
    }

    println!("rendered {} frames", renderer.frame_count());
    Ok(())
}

fn print_frame(stage: &Stage, renderer: &HeadlessRenderer) {
    let Some(stats) = renderer.last_frame() else {
        return;
    };
    let scales: Vec<String> = stage
        .models()
        .iter()
        .map(|m| format!("{}={:.2}", m.name(), m.reveal_scale()))
        .collect();
    println!(
        "t={:5.2}s background={} shown={:?} particles={} [{}]",
        stage.elapsed(),
        stats.background,
        stats.names,
        stats.particles,
        scales.join(" ")
    );
}
