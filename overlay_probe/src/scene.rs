use std::{fs, path::Path};

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use overlay_core::{Placement, Ray, ShapeId, TargetInstance};
use serde::Deserialize;

fn default_max_distance() -> f32 {
    100.0
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AimRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

impl AimRay {
    pub fn to_ray(self) -> Ray {
        Ray::new(
            Vec3::from(self.origin),
            Vec3::from(self.direction),
            self.max_distance,
        )
    }
}

/// What one viewer sees: the shape under inspection, where the camera sits,
/// and either a placed instance or the transform of a block being placed.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub shape: ShapeId,
    pub camera: Placement,
    #[serde(default)]
    pub aim: Option<AimRay>,
    #[serde(default)]
    pub target: Option<TargetInstance>,
    #[serde(default)]
    pub preview: Option<Placement>,
    #[serde(default)]
    pub alt_held: bool,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading scene {}", path.display()))?;
        let scene = serde_json::from_slice(&data)
            .with_context(|| format!("parsing scene {}", path.display()))?;
        Ok(scene)
    }

    pub fn camera_matrix(&self) -> Mat4 {
        self.camera.to_matrix()
    }

    pub fn preview_matrix(&self) -> Option<Mat4> {
        self.preview.as_ref().map(Placement::to_matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scene_uses_defaults() {
        let scene: Scene = serde_json::from_str(
            r#"{ "shape": "SmallBlockTurret", "camera": { "position": [0, 2, 8] } }"#,
        )
        .expect("scene");
        assert_eq!(scene.shape.as_str(), "SmallBlockTurret");
        assert!(scene.aim.is_none());
        assert!(scene.preview_matrix().is_none());
        assert_eq!(
            scene.camera_matrix().w_axis.truncate(),
            Vec3::new(0.0, 2.0, 8.0)
        );
    }

    #[test]
    fn aim_ray_defaults_max_distance() {
        let aim: AimRay =
            serde_json::from_str(r#"{ "origin": [0, 0, 0], "direction": [0, 0, -2] }"#)
                .expect("aim");
        let ray = aim.to_ray();
        assert_eq!(ray.max_distance, 100.0);
        assert_eq!(ray.direction, Vec3::NEG_Z);
    }
}
