//! Triangle meshes as handed over by a mesh source.
//!
//! A [`Mesh`] is a flat, immutable list of [`Triangle`]s. It is the only input the
//! surface sampler needs; index buffers and vertex sharing are resolved away when
//! the mesh is built.

use glam::{UVec3, Vec3};

use crate::error::{DissolveError, Result};

/// A single triangle with optional per-vertex normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex positions.
    pub positions: [Vec3; 3],
    /// Per-vertex normals, if the source provided them.
    pub normals: Option<[Vec3; 3]>,
}

impl Triangle {
    /// Creates a triangle from three positions.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            positions: [a, b, c],
            normals: None,
        }
    }

    /// Attaches per-vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Returns the surface area: half the magnitude of the cross product of two edges.
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.positions;
        0.5 * (b - a).cross(c - a).length()
    }

    /// Returns the unit face normal, or `None` for a degenerate triangle.
    pub fn face_normal(&self) -> Option<Vec3> {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a).try_normalize()
    }

    /// Evaluates the point `v0 + u * (v1 - v0) + v * (v2 - v0)`.
    pub fn point_at(&self, u: f32, v: f32) -> Vec3 {
        let [a, b, c] = self.positions;
        a + u * (b - a) + v * (c - a)
    }

    /// Returns the barycentric weights of `p` projected onto the triangle's plane.
    ///
    /// The weights sum to one; all are non-negative iff the projection lies inside.
    /// Returns `None` for a degenerate triangle.
    pub fn barycentric(&self, p: Vec3) -> Option<Vec3> {
        let [a, b, c] = self.positions;
        let (e0, e1, ep) = (b - a, c - a, p - a);
        let d00 = e0.dot(e0);
        let d01 = e0.dot(e1);
        let d11 = e1.dot(e1);
        let d20 = ep.dot(e0);
        let d21 = ep.dot(e1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= f32::EPSILON * d00 * d11 {
            return None;
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some(Vec3::new(1.0 - v - w, v, w))
    }
}

/// An immutable triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Creates a mesh from a list of triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Creates a mesh from shared vertex positions and triangle faces.
    ///
    /// Returns an error if a face references a vertex that does not exist.
    pub fn from_indexed(positions: &[Vec3], faces: &[UVec3]) -> Result<Self> {
        let vertex = |index: u32| {
            positions.get(index as usize).copied().ok_or_else(|| {
                DissolveError::InvalidMesh(format!(
                    "face references vertex {index}, mesh has {}",
                    positions.len()
                ))
            })
        };

        let triangles = faces
            .iter()
            .map(|face| Ok(Triangle::new(vertex(face.x)?, vertex(face.y)?, vertex(face.z)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { triangles })
    }

    /// Returns the triangles.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the summed area of all triangles.
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Returns the axis-aligned bounding box, or `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        if self.triangles.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in self.triangles.iter().flat_map(|t| t.positions) {
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }
}

impl From<Vec<Triangle>> for Mesh {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self::new(triangles)
    }
}
