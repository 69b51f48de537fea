//! 4x4 Matrix utilities for 3D transformations
//!
//! Matrices are column-major (`m[column][row]`) so they can be uploaded to
//! WGSL `mat4x4<f32>` uniforms without transposition. The camera looks down
//! -Z in view space and projection targets wgpu's `[0, 1]` depth range.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Rotation about the X axis (Y turns towards Z for positive angles)
pub fn rotation_x(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[1][1] = cs;
    m[1][2] = sn;
    m[2][1] = -sn;
    m[2][2] = cs;
    m
}

/// Rotation about the Y axis (Z turns towards X for positive angles)
pub fn rotation_y(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0][0] = cs;
    m[0][2] = -sn;
    m[2][0] = sn;
    m[2][2] = cs;
    m
}

/// Rotation about the Z axis (X turns towards Y for positive angles)
pub fn rotation_z(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0][0] = cs;
    m[0][1] = sn;
    m[1][0] = -sn;
    m[1][1] = cs;
    m
}

/// Rotation from Euler angles applied in intrinsic X, Y, Z order.
///
/// Equivalent to `Rx * Ry * Rz`, the conventional "XYZ" order used by
/// scene-graph libraries.
pub fn from_euler_xyz(angles: Vec3) -> Mat4 {
    mul(mul(rotation_x(angles.x), rotation_y(angles.y)), rotation_z(angles.z))
}

/// Translation matrix
pub fn translation(offset: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = offset.x;
    m[3][1] = offset.y;
    m[3][2] = offset.z;
    m
}

/// Non-uniform scale matrix
pub fn scale(factors: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = factors.x;
    m[1][1] = factors.y;
    m[2][2] = factors.z;
    m
}

/// Compose translation, Euler rotation and scale: `T * R * S`
pub fn from_trs(position: Vec3, rotation: Vec3, scale_factors: Vec3) -> Mat4 {
    mul(mul(translation(position), from_euler_xyz(rotation)), scale(scale_factors))
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// # Arguments
/// * `fov_y` - Vertical field of view in radians
/// * `aspect` - Viewport width / height
/// * `near`, `far` - Clip plane distances (positive)
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y * 0.5).tan();
    let range = near - far;
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / range, -1.0],
        [0.0, 0.0, near * far / range, 0.0],
    ]
}

/// Right-handed view matrix looking from `eye` towards `target`
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);
    [
        [s.x, u.x, -f.x, 0.0],
        [s.y, u.y, -f.y, 0.0],
        [s.z, u.z, -f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
    ]
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) by a matrix, ignoring the projective row
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a direction (w = 0) by a matrix
pub fn transform_direction(m: Mat4, d: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * d.x + m[1][0] * d.y + m[2][0] * d.z,
        m[0][1] * d.x + m[1][1] * d.y + m[2][1] * d.z,
        m[0][2] * d.x + m[1][2] * d.y + m[2][2] * d.z,
    )
}

/// Transform a surface normal and renormalize.
///
/// Uses the cofactor matrix of the upper 3x3, which is the inverse-transpose
/// up to a scalar, so non-uniform scale keeps normals perpendicular.
pub fn transform_normal(m: Mat4, n: Vec3) -> Vec3 {
    let c0 = Vec3::new(m[0][0], m[0][1], m[0][2]);
    let c1 = Vec3::new(m[1][0], m[1][1], m[1][2]);
    let c2 = Vec3::new(m[2][0], m[2][1], m[2][2]);

    let k0 = c1.cross(c2);
    let k1 = c2.cross(c0);
    let k2 = c0.cross(c1);

    let det = c0.dot(k0);
    let out = (k0 * n.x + k1 * n.y + k2 * n.z) * det.signum();
    out.normalized()
}

/// Project a point through a view-projection matrix into normalized device coordinates
pub fn project_point(m: Mat4, p: Vec3) -> Vec3 {
    let v = transform_point(m, p);
    let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
    if w.abs() > f32::EPSILON {
        v / w
    } else {
        v
    }
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}
