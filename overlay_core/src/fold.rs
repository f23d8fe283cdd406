//! Fakes always-on-top rendering. Geometry is pulled towards the camera by a
//! fixed ratio so the whole overlay lives in a thin shell just in front of the
//! eye, where scene geometry cannot occlude it, while the renderer keeps its
//! depth test. Callers multiply line thickness by the returned ratio so the
//! on-screen size stays the same.

use glam::{Mat4, Vec3};

use crate::volume::OrientedBox;

pub const DEFAULT_FOLD_RATIO: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthFolder {
    camera: Vec3,
    ratio: f32,
}

impl DepthFolder {
    /// Ratios outside `(0, 1]` fall back to [`DEFAULT_FOLD_RATIO`].
    pub fn new(camera: Vec3, ratio: f32) -> Self {
        let ratio = if ratio > 0.0 && ratio <= 1.0 {
            ratio
        } else {
            DEFAULT_FOLD_RATIO
        };
        Self { camera, ratio }
    }

    /// Folder that leaves everything where it is.
    pub fn passthrough(camera: Vec3) -> Self {
        Self { camera, ratio: 1.0 }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn is_passthrough(&self) -> bool {
        self.ratio == 1.0
    }

    pub fn folded(&self, point: Vec3) -> Vec3 {
        self.camera + (point - self.camera) * self.ratio
    }

    pub fn fold_point(&self, point: &mut Vec3) -> f32 {
        *point = self.folded(*point);
        self.ratio
    }

    /// Folds the translation and uniformly rescales the basis vectors.
    pub fn fold_transform(&self, transform: &mut Mat4) -> f32 {
        let translation = self.folded(transform.w_axis.truncate());
        transform.x_axis *= self.ratio;
        transform.y_axis *= self.ratio;
        transform.z_axis *= self.ratio;
        transform.w_axis = translation.extend(1.0);
        self.ratio
    }

    pub fn fold_box(&self, volume: &mut OrientedBox) -> f32 {
        volume.center = self.folded(volume.center);
        volume.half_extents *= self.ratio;
        self.ratio
    }

    pub fn fold_points(&self, points: &mut [Vec3]) -> f32 {
        for point in points.iter_mut() {
            *point = self.folded(*point);
        }
        self.ratio
    }
}
