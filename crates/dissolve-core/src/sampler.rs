//! Area-weighted surface sampling.
//!
//! [`SurfaceSampler`] turns a [`Mesh`] into a distribution whose density is
//! proportional to surface area, not to triangle count. Building the sampler costs
//! O(T) for T triangles; every sample after that costs O(log T).

use glam::Vec3;
use rand::Rng;

use crate::error::{DissolveError, Result};
use crate::mesh::Mesh;

/// One entry of a [`CumulativeAreaTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaEntry {
    /// Index of the triangle in the source mesh.
    pub triangle: usize,
    /// Sum of the areas of this triangle and all entries before it.
    pub cumulative_area: f64,
}

/// Running sums of triangle areas, in mesh order.
///
/// Triangles with zero area never receive samples and are left out, so entry `i`
/// does not necessarily describe triangle `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeAreaTable {
    entries: Vec<AreaEntry>,
}

impl CumulativeAreaTable {
    /// Builds the table for a mesh.
    ///
    /// Fails with [`DissolveError::InvalidMesh`] if the mesh has no triangles or its
    /// total area is zero or not finite.
    pub fn build(mesh: &Mesh) -> Result<Self> {
        if mesh.is_empty() {
            return Err(DissolveError::InvalidMesh("mesh has no triangles".into()));
        }

        let mut entries = Vec::with_capacity(mesh.num_triangles());
        let mut total = 0.0_f64;
        for (triangle, tri) in mesh.triangles().iter().enumerate() {
            let area = f64::from(tri.area());
            if area > 0.0 {
                total += area;
                entries.push(AreaEntry {
                    triangle,
                    cumulative_area: total,
                });
            }
        }

        if !total.is_finite() {
            return Err(DissolveError::InvalidMesh(
                "mesh surface area is not finite".into(),
            ));
        }
        if entries.is_empty() {
            return Err(DissolveError::InvalidMesh(format!(
                "all {} triangles are degenerate",
                mesh.num_triangles()
            )));
        }

        Ok(Self { entries })
    }

    /// Returns the table entries.
    #[must_use]
    pub fn entries(&self) -> &[AreaEntry] {
        &self.entries
    }

    /// Returns the total surface area.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        // build() guarantees at least one entry.
        self.entries.last().map_or(0.0, |e| e.cumulative_area)
    }

    /// Returns the triangle owning the area position `r` in `[0, total_area)`.
    ///
    /// This is the first entry whose cumulative area exceeds `r`. Values outside the
    /// range clamp to the first or last triangle.
    #[must_use]
    pub fn locate(&self, r: f64) -> usize {
        let index = self.entries.partition_point(|e| e.cumulative_area <= r);
        self.entries[index.min(self.entries.len() - 1)].triangle
    }
}

/// A sampled surface point and its perturbation vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSample {
    /// Point on the mesh surface.
    pub position: Vec3,
    /// Per-particle jitter, each component uniform in `[-1, 1]`.
    pub randomness: Vec3,
}

/// Draws uniformly distributed points from a mesh surface.
#[derive(Debug, Clone)]
pub struct SurfaceSampler<'a> {
    mesh: &'a Mesh,
    table: CumulativeAreaTable,
}

impl<'a> SurfaceSampler<'a> {
    /// Precomputes the area distribution for `mesh`.
    pub fn new(mesh: &'a Mesh) -> Result<Self> {
        let table = CumulativeAreaTable::build(mesh)?;
        log::debug!(
            "surface sampler built over {} triangles ({} with area), total area {:.4}",
            mesh.num_triangles(),
            table.entries().len(),
            table.total_area()
        );
        Ok(Self { mesh, table })
    }

    /// Returns the mesh being sampled.
    #[must_use]
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// Returns the cumulative area table.
    #[must_use]
    pub fn table(&self) -> &CumulativeAreaTable {
        &self.table
    }

    /// Returns the number of triangles that can receive samples.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.table.entries().len()
    }

    /// Returns the total surface area.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.table.total_area()
    }

    /// Draws one sample: a surface point plus an independent randomness vector.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParticleSample {
        let position = self.sample_position(rng);
        let randomness = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        ParticleSample {
            position,
            randomness,
        }
    }

    /// Draws a surface point only.
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let r = rng.gen::<f64>() * self.table.total_area();
        let triangle = &self.mesh.triangles()[self.table.locate(r)];

        // Fold the unit square onto the triangle so density stays uniform.
        let mut u: f32 = rng.gen();
        let mut v: f32 = rng.gen();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        triangle.point_at(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Triangle;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Two disjoint triangles with areas 0.5 and 1.5.
    fn one_to_three_mesh() -> Mesh {
        let offset = Vec3::new(10.0, 0.0, 0.0);
        let scale = 3.0_f32.sqrt();
        Mesh::new(vec![
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
            Triangle::new(offset, offset + Vec3::X * scale, offset + Vec3::Y * scale),
        ])
    }

    fn contains(tri: &Triangle, p: Vec3) -> bool {
        let eps = 1e-4;
        tri.barycentric(p).is_some_and(|w| {
            w.min_element() >= -eps && (w.x + w.y + w.z - 1.0).abs() < eps
        }) && tri.face_normal().is_some_and(|n| n.dot(p - tri.positions[0]).abs() < eps)
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = SurfaceSampler::new(&Mesh::default()).unwrap_err();
        assert!(matches!(err, DissolveError::InvalidMesh(_)));
    }

    #[test]
    fn test_zero_area_mesh_rejected() {
        let mesh = Mesh::new(vec![
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0),
            Triangle::new(Vec3::Y, Vec3::Y, Vec3::Y),
        ]);
        let err = SurfaceSampler::new(&mesh).unwrap_err();
        assert!(matches!(err, DissolveError::InvalidMesh(_)));
    }

    #[test]
    fn test_non_finite_mesh_rejected() {
        let mesh = Mesh::new(vec![Triangle::new(
            Vec3::ZERO,
            Vec3::new(f32::MAX, 0.0, 0.0),
            Vec3::new(0.0, f32::MAX, 0.0),
        )]);
        assert!(SurfaceSampler::new(&mesh).is_err());
    }

    #[test]
    fn test_table_is_monotonic_and_skips_degenerate() {
        let mesh = Mesh::new(vec![
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0),
            Triangle::new(Vec3::ZERO, Vec3::X * 2.0, Vec3::Y),
        ]);
        let table = CumulativeAreaTable::build(&mesh).unwrap();
        let entries = table.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].triangle, 0);
        assert_eq!(entries[1].triangle, 2);
        assert!(entries[1].cumulative_area >= entries[0].cumulative_area);
        assert!((table.total_area() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_locate_boundaries() {
        let table = CumulativeAreaTable::build(&one_to_three_mesh()).unwrap();
        assert_eq!(table.locate(0.0), 0);
        assert_eq!(table.locate(0.49), 0);
        assert_eq!(table.locate(0.5), 1);
        assert_eq!(table.locate(1.99), 1);
        assert_eq!(table.locate(100.0), 1);
    }

    #[test]
    fn test_area_proportional_sampling() {
        let mesh = one_to_three_mesh();
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let n = 40_000;
        let small = (0..n)
            .filter(|_| sampler.sample_position(&mut rng).x < 5.0)
            .count();
        let ratio = small as f64 / f64::from(n);

        // Expected 0.25; standard deviation at this n is about 0.002.
        assert!((ratio - 0.25).abs() < 0.015, "ratio {ratio}");
    }

    #[test]
    fn test_samples_lie_on_source_triangles() {
        let mesh = Mesh::new(vec![
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
            Triangle::new(
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(2.0, 1.0, 5.0),
                Vec3::new(0.5, 3.0, 6.0),
            ),
            Triangle::new(
                Vec3::new(-4.0, -4.0, -4.0),
                Vec3::new(-4.0, -3.9, -4.0),
                Vec3::new(-3.9, -4.0, -4.1),
            ),
        ]);
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..10_000 {
            let s = sampler.sample(&mut rng);
            assert!(
                mesh.triangles().iter().any(|t| contains(t, s.position)),
                "{:?} is off the surface",
                s.position
            );
        }
    }

    #[test]
    fn test_density_is_uniform_across_triangle_sizes() {
        // One unit square split into many small triangles on the left half and a
        // single large triangle pair on the right half.
        let mut triangles = Vec::new();
        let cells = 8;
        let h = 1.0 / cells as f32;
        for i in 0..cells / 2 {
            for j in 0..cells {
                let o = Vec3::new(i as f32 * h, j as f32 * h, 0.0);
                triangles.push(Triangle::new(o, o + Vec3::X * h, o + Vec3::Y * h));
                triangles.push(Triangle::new(
                    o + Vec3::X * h,
                    o + Vec3::new(h, h, 0.0),
                    o + Vec3::Y * h,
                ));
            }
        }
        triangles.push(Triangle::new(
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
        ));
        triangles.push(Triangle::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
        ));
        let mesh = Mesh::new(triangles);
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let n = 20_000;
        let left = (0..n)
            .filter(|_| sampler.sample_position(&mut rng).x < 0.5)
            .count();
        let ratio = left as f64 / f64::from(n);
        assert!((ratio - 0.5).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mesh = one_to_three_mesh();
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..16).map(|_| sampler.sample(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..16).map(|_| sampler.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_sample_stays_on_triangle(
            seed in any::<u64>(),
            ax in -10.0f32..10.0, ay in -10.0f32..10.0, az in -10.0f32..10.0,
            bx in -10.0f32..10.0, by in -10.0f32..10.0, bz in -10.0f32..10.0,
        ) {
            let a = Vec3::new(ax, ay, az);
            let b = Vec3::new(bx, by, bz);
            let tri = Triangle::new(Vec3::ZERO, a, b);
            // Keep the triangle well-conditioned so barycentric weights are exact
            // to within float tolerance.
            prop_assume!(tri.area() > 0.5);
            prop_assume!(2.0 * tri.area() / (a.length() * b.length()) > 0.1);

            let mesh = Mesh::new(vec![tri]);
            let sampler = SurfaceSampler::new(&mesh).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..32 {
                let s = sampler.sample(&mut rng);
                let w = tri.barycentric(s.position).unwrap();
                prop_assert!(w.min_element() >= -1e-3);
                prop_assert!(s.randomness.abs().max_element() <= 1.0);
            }
        }
    }
}
