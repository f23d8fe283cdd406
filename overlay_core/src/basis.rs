//! Axis helpers shared by every overlay pass. Block and camera transforms are
//! `Mat4`s with an orthonormal rotation part using a right-handed, +Y up basis
//! where +X is right and -Z is forward. Mount point normals and pressurization
//! faces are expressed with the six-way [`Direction`].

use std::fmt;

use glam::{IVec3, Mat4, Vec3};
use serde::Deserialize;

/// One of the six block faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Which pair of opposite faces a direction belongs to. Overlay fills are
/// lightened or darkened per axis so adjacent faces stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceAxis {
    LeftRight,
    UpDown,
    ForwardBack,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn vector(self) -> IVec3 {
        match self {
            Direction::Forward => IVec3::new(0, 0, -1),
            Direction::Backward => IVec3::new(0, 0, 1),
            Direction::Left => IVec3::new(-1, 0, 0),
            Direction::Right => IVec3::new(1, 0, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::Down => IVec3::new(0, -1, 0),
        }
    }

    pub fn as_vec3(self) -> Vec3 {
        self.vector().as_vec3()
    }

    pub fn axis(self) -> FaceAxis {
        match self {
            Direction::Left | Direction::Right => FaceAxis::LeftRight,
            Direction::Up | Direction::Down => FaceAxis::UpDown,
            Direction::Forward | Direction::Backward => FaceAxis::ForwardBack,
        }
    }

    /// Index of the local coordinate this face is perpendicular to.
    pub fn axis_index(self) -> usize {
        match self.axis() {
            FaceAxis::LeftRight => 0,
            FaceAxis::UpDown => 1,
            FaceAxis::ForwardBack => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orientation basis pulled out of a world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub translation: Vec3,
}

impl Basis {
    pub fn from_matrix(matrix: &Mat4) -> Self {
        Self {
            right: matrix.x_axis.truncate().normalize_or_zero(),
            up: matrix.y_axis.truncate().normalize_or_zero(),
            forward: -matrix.z_axis.truncate().normalize_or_zero(),
            translation: matrix.w_axis.truncate(),
        }
    }

    /// World-space unit vector for a block face.
    pub fn direction(&self, direction: Direction) -> Vec3 {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => -self.forward,
            Direction::Left => -self.right,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => -self.up,
        }
    }
}
