// Interpolation utilities shared by the track samplers

use nalgebra_glm as glm;

/// Cubic Hermite basis for normalized `t` in `[0, 1]`.
/// Returns the weights for (p0, m0, p1, m1).
pub fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

/// glTF cubic spline for vectors; tangents are scaled by the key interval `dt`.
pub fn hermite_vec3(
    p0: &glm::Vec3,
    m0: &glm::Vec3,
    p1: &glm::Vec3,
    m1: &glm::Vec3,
    t: f32,
    dt: f32,
) -> glm::Vec3 {
    let [h00, h10, h01, h11] = hermite_basis(t);
    p0 * h00 + m0 * (h10 * dt) + p1 * h01 + m1 * (h11 * dt)
}

/// Component-wise cubic spline for quaternions, normalized afterwards.
pub fn hermite_quat(
    p0: &glm::Quat,
    m0: &glm::Quat,
    p1: &glm::Quat,
    m1: &glm::Quat,
    t: f32,
    dt: f32,
) -> glm::Quat {
    let [h00, h10, h01, h11] = hermite_basis(t);
    let coords = p0.coords * h00 + m0.coords * (h10 * dt) + p1.coords * h01 + m1.coords * (h11 * dt);
    glm::quat_normalize(&glm::Quat::from_vector(coords))
}

/// Shortest-path spherical interpolation. Falls back to normalized lerp when
/// the two rotations are nearly parallel, where slerp has no stable axis.
pub fn slerp_shortest(q1: &glm::Quat, q2: &glm::Quat, t: f32) -> glm::Quat {
    let a = glm::quat_normalize(q1);
    let mut b = glm::quat_normalize(q2);
    if glm::quat_dot(&a, &b) < 0.0 {
        b = -b;
    }
    if glm::quat_dot(&a, &b) > 0.9995 {
        return glm::quat_normalize(&glm::quat_lerp(&a, &b, t));
    }
    glm::quat_slerp(&a, &b, t)
}

pub fn lerp_vec3(v1: &glm::Vec3, v2: &glm::Vec3, t: f32) -> glm::Vec3 {
    glm::lerp(v1, v2, t)
}
