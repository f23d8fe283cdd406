use glam::{Mat4, Vec3};
use serde::Deserialize;

fn default_forward() -> [f32; 3] {
    [0.0, 0.0, -1.0]
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

/// Position plus forward/up pair, the way block placements and camera poses
/// are written in scene and shape files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Placement {
    pub position: [f32; 3],
    #[serde(default = "default_forward")]
    pub forward: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            forward: default_forward(),
            up: default_up(),
        }
    }
}

impl Placement {
    pub fn at(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            ..Self::default()
        }
    }

    /// Orthonormal transform with +X right, +Y up and -Z along `forward`.
    pub fn to_matrix(&self) -> Mat4 {
        let forward = Vec3::from(self.forward).normalize_or_zero();
        let right = forward.cross(Vec3::from(self.up)).normalize_or_zero();
        let up = right.cross(forward);
        Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            (-forward).extend(0.0),
            Vec3::from(self.position).extend(1.0),
        )
    }
}

/// A placed block the overlay is drawn for. Without one, the session falls
/// back to the preview transform of whatever is being placed.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInstance {
    pub name: String,
    pub placement: Placement,
    /// Mount point indices already coupled to a neighbour; drawn grayed.
    #[serde(default)]
    pub coupled_mounts: Vec<usize>,
    #[serde(default)]
    pub door_closed: Option<bool>,
}

impl TargetInstance {
    pub fn world_matrix(&self) -> Mat4 {
        self.placement.to_matrix()
    }

    pub fn is_coupled(&self, mount_index: usize) -> bool {
        self.coupled_mounts.contains(&mount_index)
    }
}
