//! Primitive shapes and their triangle meshes
//!
//! Every shape is built in **local space**: centred on the origin with +Y up,
//! except `Plane` and `Terrain` which lie in the XZ plane at y = 0.
//! The entity transform positions them in the world.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use diorama_math::Vec3;
use serde::{Serialize, Deserialize};

/// Indexed triangle mesh in local space
///
/// Triangles are wound counter-clockwise when seen from outside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

/// Shape description
///
/// Each variant stores the parameters needed to tessellate the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// Axis-aligned box centred on the origin
    Box { width: f32, height: f32, depth: f32 },
    /// Cylinder or truncated cone along Y, centred on the origin
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    /// UV sphere
    Sphere { radius: f32, segments: u32, rings: u32 },
    /// Cylinder of `length` along Y with hemispherical caps
    Capsule { radius: f32, length: f32, segments: u32 },
    /// Flat rectangle in XZ facing +Y (`width` along X, `length` along Z)
    Plane { width: f32, length: f32 },
    /// Square height field in XZ with `(subdivisions + 1)²` heights, rows along Z
    Terrain {
        size: f32,
        subdivisions: u32,
        heights: Vec<f32>,
    },
}

impl Shape {
    /// Create a box shape
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Box { width, height, depth }
    }

    /// Create a cylinder shape
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        Shape::Cylinder { radius_top, radius_bottom, height, segments }
    }

    /// Create a sphere shape
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        Shape::Sphere { radius, segments, rings }
    }

    /// Create a capsule shape
    pub fn capsule(radius: f32, length: f32, segments: u32) -> Self {
        Shape::Capsule { radius, length, segments }
    }

    /// Create a plane shape
    pub fn plane(width: f32, length: f32) -> Self {
        Shape::Plane { width, length }
    }

    /// Create a terrain by sampling `height` at every grid vertex
    ///
    /// The closure receives local `(x, z)` coordinates in row-major order.
    pub fn terrain(size: f32, subdivisions: u32, mut height: impl FnMut(f32, f32) -> f32) -> Self {
        let n = subdivisions.max(1);
        let cell = size / n as f32;
        let half = size * 0.5;
        let mut heights = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
        for row in 0..=n {
            let z = -half + row as f32 * cell;
            for col in 0..=n {
                let x = -half + col as f32 * cell;
                heights.push(height(x, z));
            }
        }
        Shape::Terrain { size, subdivisions: n, heights }
    }

    /// Tessellate this shape into a triangle mesh
    pub fn mesh(&self) -> MeshData {
        match self {
            Shape::Box { width, height, depth } => box_mesh(*width, *height, *depth),
            Shape::Cylinder { radius_top, radius_bottom, height, segments } => {
                cylinder_mesh(*radius_top, *radius_bottom, *height, *segments)
            }
            Shape::Sphere { radius, segments, rings } => sphere_mesh(*radius, *segments, *rings),
            Shape::Capsule { radius, length, segments } => capsule_mesh(*radius, *length, *segments),
            Shape::Plane { width, length } => grid_mesh(*width, *length, 1, &[]),
            Shape::Terrain { size, subdivisions, heights } => {
                grid_mesh(*size, *size, (*subdivisions).max(1), heights)
            }
        }
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width * 0.5, height * 0.5, depth * 0.5);
    let extent = |axis: Vec3| axis.x.abs() * half.x + axis.y.abs() * half.y + axis.z.abs() * half.z;

    // (normal, u, v) with u × v = normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let center = normal * extent(normal);
        let du = u * extent(u);
        let dv = v * extent(v);
        let a = mesh.push_vertex(center - du - dv, normal);
        let b = mesh.push_vertex(center + du - dv, normal);
        let c = mesh.push_vertex(center + du + dv, normal);
        let d = mesh.push_vertex(center - du + dv, normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    mesh
}

/// A point on a surface-of-revolution profile: radius, height and the
/// (radial, vertical) components of its normal
#[derive(Clone, Copy)]
struct ProfilePoint {
    radius: f32,
    y: f32,
    normal_r: f32,
    normal_y: f32,
}

/// Revolve a bottom-to-top profile around the Y axis
fn lathe(mesh: &mut MeshData, profile: &[ProfilePoint], segments: u32) {
    let segments = segments.max(3);
    let stride = segments + 1;
    let base = mesh.positions.len() as u32;

    for p in profile {
        for j in 0..=segments {
            let theta = j as f32 / segments as f32 * TAU;
            let (sn, cs) = theta.sin_cos();
            mesh.push_vertex(
                Vec3::new(p.radius * sn, p.y, p.radius * cs),
                Vec3::new(p.normal_r * sn, p.normal_y, p.normal_r * cs).normalized(),
            );
        }
    }

    for i in 0..profile.len().saturating_sub(1) as u32 {
        let lower = base + i * stride;
        let upper = lower + stride;
        for j in 0..segments {
            let a = upper + j;
            let b = lower + j;
            let c = lower + j + 1;
            let d = upper + j + 1;
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
    }
}

fn cap(mesh: &mut MeshData, radius: f32, y: f32, segments: u32, up: bool) {
    if radius <= 0.0 {
        return;
    }
    let segments = segments.max(3);
    let normal = if up { Vec3::Y } else { -Vec3::Y };
    let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
    let first = mesh.positions.len() as u32;
    for j in 0..=segments {
        let theta = j as f32 / segments as f32 * TAU;
        let (sn, cs) = theta.sin_cos();
        mesh.push_vertex(Vec3::new(radius * sn, y, radius * cs), normal);
    }
    for j in 0..segments {
        if up {
            mesh.push_triangle(center, first + j, first + j + 1);
        } else {
            mesh.push_triangle(center, first + j + 1, first + j);
        }
    }
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let half = height * 0.5;
    let slope = if height > 0.0 { (radius_bottom - radius_top) / height } else { 0.0 };
    let side = [
        ProfilePoint { radius: radius_bottom, y: -half, normal_r: 1.0, normal_y: slope },
        ProfilePoint { radius: radius_top, y: half, normal_r: 1.0, normal_y: slope },
    ];

    let mut mesh = MeshData::default();
    lathe(&mut mesh, &side, segments);
    cap(&mut mesh, radius_top, half, segments, true);
    cap(&mut mesh, radius_bottom, -half, segments, false);
    mesh
}

fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> MeshData {
    let rings = rings.max(2);
    let profile: Vec<ProfilePoint> = (0..=rings)
        .map(|k| {
            let a = -FRAC_PI_2 + k as f32 / rings as f32 * PI;
            let (sn, cs) = a.sin_cos();
            ProfilePoint { radius: radius * cs, y: radius * sn, normal_r: cs, normal_y: sn }
        })
        .collect();

    let mut mesh = MeshData::default();
    lathe(&mut mesh, &profile, segments);
    mesh
}

fn capsule_mesh(radius: f32, length: f32, segments: u32) -> MeshData {
    let cap_rings = (segments / 2).max(2);
    let half = length * 0.5;
    let mut profile = Vec::with_capacity(2 * (cap_rings as usize + 1));

    for k in 0..=cap_rings {
        let a = -FRAC_PI_2 + k as f32 / cap_rings as f32 * FRAC_PI_2;
        let (sn, cs) = a.sin_cos();
        profile.push(ProfilePoint { radius: radius * cs, y: -half + radius * sn, normal_r: cs, normal_y: sn });
    }
    for k in 0..=cap_rings {
        let a = k as f32 / cap_rings as f32 * FRAC_PI_2;
        let (sn, cs) = a.sin_cos();
        profile.push(ProfilePoint { radius: radius * cs, y: half + radius * sn, normal_r: cs, normal_y: sn });
    }

    let mut mesh = MeshData::default();
    lathe(&mut mesh, &profile, segments);
    mesh
}

/// Grid in XZ with optional heights; normals are averaged from adjacent faces
fn grid_mesh(width: f32, length: f32, subdivisions: u32, heights: &[f32]) -> MeshData {
    let n = subdivisions;
    let stride = n + 1;
    let (half_w, half_l) = (width * 0.5, length * 0.5);
    let (cell_w, cell_l) = (width / n as f32, length / n as f32);

    let mut mesh = MeshData::default();
    for row in 0..=n {
        for col in 0..=n {
            let i = (row * stride + col) as usize;
            let y = heights.get(i).copied().unwrap_or(0.0);
            mesh.push_vertex(
                Vec3::new(-half_w + col as f32 * cell_w, y, -half_l + row as f32 * cell_l),
                Vec3::ZERO,
            );
        }
    }

    for row in 0..n {
        for col in 0..n {
            let a = row * stride + col;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            mesh.push_triangle(a, b, c);
            mesh.push_triangle(a, c, d);
        }
    }

    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (mesh.positions[b] - mesh.positions[a]).cross(mesh.positions[c] - mesh.positions[a]);
        mesh.normals[a] += face;
        mesh.normals[b] += face;
        mesh.normals[c] += face;
    }
    for normal in &mut mesh.normals {
        *normal = normal.normalized();
    }
    mesh
}
