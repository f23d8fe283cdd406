//! Oriented boxes and aim rays. Mount points, pressurization faces and ports
//! all end up as an [`OrientedBox`] in world space, which doubles as the pick
//! volume tested against the camera's aim.

use glam::{Mat3, Mat4, Vec3};

use crate::basis::Direction;

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction; [`Ray::new`] normalizes.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Orthonormal columns: local X, Y, Z in world space.
    pub rotation: Mat3,
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Mat3) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Box covering the local-space bounds `min..max`, carried into world space.
    pub fn from_local_bounds(min: Vec3, max: Vec3, world: &Mat4) -> Self {
        let (scale, rotation, _) = world.to_scale_rotation_translation();
        let local_center = (min + max) * 0.5;
        Self {
            center: world.transform_point3(local_center),
            half_extents: (max - min).abs() * 0.5 * scale.abs(),
            rotation: Mat3::from_quat(rotation),
        }
    }

    /// Box for a unit cube (`-0.5..0.5` on every axis) placed by `transform`.
    pub fn from_unit_transform(transform: &Mat4) -> Option<Self> {
        if !transform.is_finite() {
            return None;
        }
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        if !scale.is_finite() || !rotation.is_finite() {
            return None;
        }
        Some(Self {
            center: translation,
            half_extents: scale.abs() * 0.5,
            rotation: Mat3::from_quat(rotation),
        })
    }

    pub fn inflated(mut self, amount: f32) -> Self {
        self.half_extents += Vec3::splat(amount);
        self
    }

    /// The four corners of one face, wound consistently around its normal.
    pub fn face_quad(&self, face: Direction) -> [Vec3; 4] {
        let normal_axis = face.axis_index();
        let u_axis = (normal_axis + 1) % 3;
        let v_axis = (normal_axis + 2) % 3;
        let sign = face.vector()[normal_axis] as f32;

        let n = self.rotation.col(normal_axis) * self.half_extents[normal_axis] * sign;
        let u = self.rotation.col(u_axis) * self.half_extents[u_axis];
        let v = self.rotation.col(v_axis) * self.half_extents[v_axis];
        let c = self.center + n;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }

    /// Distance along `ray` to the first intersection, `0.0` when the ray
    /// starts inside. Slab test in the box's local frame.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let relative = ray.origin - self.center;
        let mut t_near = 0.0f32;
        let mut t_far = ray.max_distance;

        for axis in 0..3 {
            let column = self.rotation.col(axis);
            let offset = column.dot(relative);
            let slope = column.dot(ray.direction);
            let half = self.half_extents[axis];

            if slope.abs() < PARALLEL_EPSILON {
                if offset.abs() > half {
                    return None;
                }
                continue;
            }

            let mut t0 = (-half - offset) / slope;
            let mut t1 = (half - offset) / slope;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }
}
