//! Static per-block-type shape metadata and the catalog that serves it.
//! Cell coordinates run from `0` to `size` on each axis with the block center
//! at `size / 2`; one cell is `cell_size` metres wide.

use std::{collections::HashMap, fmt, fs, path::Path};

use anyhow::{Context, Result};
use glam::{IVec3, Mat4, Vec3};
use serde::Deserialize;

use crate::basis::Direction;
use crate::error::OverlayError;
use crate::target::Placement;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MountPoint {
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub normal: Direction,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub exclusion_mask: u8,
    #[serde(default)]
    pub property_mask: u8,
    #[serde(default)]
    pub coupling_tag: Option<String>,
    #[serde(default)]
    pub allow_self_coupling: bool,
}

impl MountPoint {
    pub fn has_mask(&self) -> bool {
        self.exclusion_mask != 0 || self.property_mask != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealMark {
    Sealed,
    SealedWhenClosed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FaceSeal {
    pub face: Direction,
    pub mark: SealMark,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellSeal {
    pub cell: [i32; 3],
    pub faces: Vec<FaceSeal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PortCategory {
    Conveyor,
    Interactive,
    Upgrade,
    #[default]
    Unknown,
}

impl PortCategory {
    pub fn name(self) -> &'static str {
        match self {
            PortCategory::Conveyor => "Conveyor",
            PortCategory::Interactive => "Interactive",
            PortCategory::Upgrade => "Upgrade",
            PortCategory::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PortSize {
    Small,
    Large,
    #[default]
    Unspecified,
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortDescriptor {
    pub placement: Placement,
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub category: PortCategory,
    #[serde(default)]
    pub size: PortSize,
    pub label: String,
}

impl PortDescriptor {
    pub fn local_transform(&self) -> Mat4 {
        self.placement.to_matrix() * Mat4::from_scale(Vec3::from(self.scale))
    }
}

/// Turret aim limits in degrees, azimuth around the block up axis and
/// elevation around its right axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TurretLimits {
    pub min_azimuth_deg: i32,
    pub max_azimuth_deg: i32,
    pub min_elevation_deg: i32,
    pub max_elevation_deg: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RotorLimits {
    pub lower_deg: i32,
    pub upper_deg: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShapeDescriptor {
    pub id: ShapeId,
    /// Key into the specialized overlay registry.
    #[serde(default)]
    pub category: Option<String>,
    pub cell_size: f32,
    pub size: [i32; 3],
    #[serde(default)]
    pub center: [i32; 3],
    #[serde(default)]
    pub mount_points: Vec<MountPoint>,
    #[serde(default)]
    pub fully_airtight: bool,
    #[serde(default)]
    pub pressurization: Vec<CellSeal>,
    #[serde(default)]
    pub ports: Vec<PortDescriptor>,
    #[serde(default)]
    pub turret: Option<TurretLimits>,
    #[serde(default)]
    pub rotor: Option<RotorLimits>,
}

impl ShapeDescriptor {
    pub fn grid_size(&self) -> IVec3 {
        IVec3::from_array(self.size)
    }

    pub fn half_extents(&self) -> Vec3 {
        self.grid_size().as_vec3() * self.cell_size * 0.5
    }

    /// Local-space offset of a cell-grid coordinate relative to the block center.
    pub fn cell_to_local(&self, cell: Vec3) -> Vec3 {
        (cell - self.grid_size().as_vec3() * 0.5) * self.cell_size
    }

    /// The mount point placement snaps to: the one flagged `default`, else the
    /// first enabled one on the down face.
    pub fn auto_rotate_mount(&self) -> Option<usize> {
        let enabled = || self.mount_points.iter().enumerate().filter(|(_, m)| m.enabled);
        enabled()
            .find(|(_, mount)| mount.default)
            .or_else(|| enabled().find(|(_, mount)| mount.normal == Direction::Down))
            .map(|(index, _)| index)
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        let invalid = |detail: String| OverlayError::InvalidShapeData {
            shape: self.id.clone(),
            detail,
        };

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(invalid(format!("cell size {}", self.cell_size)));
        }
        let size = self.grid_size();
        if size.min_element() <= 0 {
            return Err(invalid(format!("grid size {size}")));
        }
        let limit = size.as_vec3();
        for (index, mount) in self.mount_points.iter().enumerate() {
            for corner in [mount.start, mount.end] {
                let corner = Vec3::from(corner);
                if corner.cmplt(Vec3::ZERO).any() || corner.cmpgt(limit).any() {
                    return Err(invalid(format!(
                        "mount point {index} corner {corner} outside grid {size}"
                    )));
                }
            }
        }
        for seal in &self.pressurization {
            let cell = IVec3::from_array(seal.cell);
            if cell.cmplt(IVec3::ZERO).any() || cell.cmpge(size).any() {
                return Err(invalid(format!("sealed cell {cell} outside grid {size}")));
            }
        }
        Ok(())
    }
}

/// Source of shape descriptors by identity.
pub trait ShapeProvider {
    fn shape(&self, id: &ShapeId) -> Option<&ShapeDescriptor>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    shapes: Vec<ShapeDescriptor>,
}

#[derive(Debug, Default)]
pub struct ShapeCatalog {
    shapes: HashMap<ShapeId, ShapeDescriptor>,
}

impl ShapeCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read(path).with_context(|| format!("reading shape catalog {}", path.display()))?;
        Self::from_slice(&data).with_context(|| format!("parsing shape catalog {}", path.display()))
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let file: CatalogFile = serde_json::from_slice(data)?;
        let mut catalog = Self::default();
        for shape in file.shapes {
            shape
                .validate()
                .with_context(|| format!("validating shape {}", shape.id))?;
            catalog.insert(shape);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, shape: ShapeDescriptor) {
        self.shapes.insert(shape.id.clone(), shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapeProvider for ShapeCatalog {
    fn shape(&self, id: &ShapeId) -> Option<&ShapeDescriptor> {
        self.shapes.get(id)
    }
}
