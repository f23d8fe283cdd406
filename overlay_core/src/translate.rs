//! Turns shape metadata into world-space boxes and quads for the airtightness,
//! mount point and port overlays. Picking happens on the unfolded world-space
//! volumes; drawing happens on the folded copies.

use glam::{Mat4, Vec3};

use crate::basis::{Direction, FaceAxis};
use crate::fold::DepthFolder;
use crate::palette;
use crate::picker::ClosestPicker;
use crate::render::{BoxStyle, Color, Paint, PrimitiveSink};
use crate::shape::{MountPoint, SealMark, ShapeDescriptor};
use crate::target::TargetInstance;
use crate::volume::{OrientedBox, Ray};

/// Minimum thickness of a mount point box along its face normal.
pub const MOUNT_THICKNESS: f32 = 0.05;
pub const AIRTIGHT_INFLATE: f32 = 0.05;
pub const SEAL_THICKNESS: f32 = 0.05;
/// Added to the pick distance of grayed mount points so buildable ones win
/// when both sit under the crosshair.
pub const GRAYED_PICK_PENALTY: f32 = 10.0;

pub struct TranslateContext<'a> {
    pub sink: &'a mut dyn PrimitiveSink,
    pub folder: &'a DepthFolder,
    pub aim: Option<&'a Ray>,
    pub line_thickness: f32,
}

impl TranslateContext<'_> {
    fn draw_box(&mut self, volume: &OrientedBox, style: BoxStyle, paint: Paint) {
        let mut folded = *volume;
        let ratio = self.folder.fold_box(&mut folded);
        self.sink
            .oriented_box(&folded, style, self.line_thickness * ratio, paint);
    }

    fn draw_quad(&mut self, mut corners: [Vec3; 4], paint: Paint) {
        self.folder.fold_points(&mut corners);
        self.sink.quad(corners, paint);
    }

    fn pick_distance(&self, volume: &OrientedBox) -> Option<f32> {
        self.aim.and_then(|ray| volume.intersect_ray(ray))
    }
}

/// Fill classification for a mount point, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountClass {
    Grayed,
    Coupling,
    Masked,
    Plain,
}

impl MountClass {
    pub fn classify(mount: &MountPoint, grayed: bool) -> Self {
        if grayed {
            MountClass::Grayed
        } else if mount.coupling_tag.is_some() {
            MountClass::Coupling
        } else if mount.has_mask() {
            MountClass::Masked
        } else {
            MountClass::Plain
        }
    }

    pub fn base_color(self) -> Color {
        match self {
            MountClass::Grayed => palette::MOUNT_GRAYED,
            MountClass::Coupling => palette::MOUNT_COUPLING,
            MountClass::Masked => palette::MOUNT_MASKED,
            MountClass::Plain => palette::MOUNT_PLAIN,
        }
    }

    pub fn fill(self, axis: FaceAxis) -> Color {
        self.base_color().tinted_for(axis)
    }
}

/// World-space box for one mount point, flattened onto its face but never
/// thinner than [`MOUNT_THICKNESS`] along the normal.
pub fn mount_box(shape: &ShapeDescriptor, mount: &MountPoint, world: &Mat4) -> OrientedBox {
    let start = Vec3::from(mount.start);
    let end = Vec3::from(mount.end);
    let mut min = shape.cell_to_local(start.min(end));
    let mut max = shape.cell_to_local(start.max(end));

    let axis = mount.normal.axis_index();
    if max[axis] - min[axis] < MOUNT_THICKNESS {
        let middle = (min[axis] + max[axis]) * 0.5;
        min[axis] = middle - MOUNT_THICKNESS * 0.5;
        max[axis] = middle + MOUNT_THICKNESS * 0.5;
    }
    OrientedBox::from_local_bounds(min, max, world)
}

/// Pick candidate produced by the mount point pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountCandidate {
    pub index: usize,
    pub volume: OrientedBox,
    pub normal: Direction,
    pub grayed: bool,
    pub auto_rotate: bool,
    pub distance: f32,
}

/// Per-mount outcome of one pass, kept for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountReport {
    pub index: usize,
    pub class: MountClass,
    pub fill: Color,
    pub normal: Direction,
    pub auto_rotate: bool,
    pub hit_distance: Option<f32>,
}

/// Draws every enabled mount point and offers each one to `picker`. Mount
/// points missed by the aim ray are offered at infinity, so they never win.
/// Mount points the target reports as already coupled are drawn grayed and
/// ranked behind everything else under the crosshair.
pub fn draw_mount_points(
    cx: &mut TranslateContext<'_>,
    shape: &ShapeDescriptor,
    world: &Mat4,
    target: Option<&TargetInstance>,
    picker: &mut ClosestPicker<MountCandidate>,
    report: &mut Vec<MountReport>,
) -> usize {
    let auto_rotate_index = shape.auto_rotate_mount();
    let mut drawn = 0;

    for (index, mount) in shape.mount_points.iter().enumerate() {
        if !mount.enabled {
            continue;
        }
        let grayed = target.is_some_and(|target| target.is_coupled(index));
        let auto_rotate = auto_rotate_index == Some(index);
        let class = MountClass::classify(mount, grayed);
        let fill = class.fill(mount.normal.axis());
        let volume = mount_box(shape, mount, world);

        cx.draw_box(&volume, BoxStyle::Solid, Paint::solid(fill));
        if auto_rotate {
            cx.draw_box(
                &volume,
                BoxStyle::Wireframe,
                Paint::solid(palette::MOUNT_AUTO_ROTATE),
            );
        }

        let hit_distance = cx.pick_distance(&volume);
        let distance = hit_distance.unwrap_or(f32::INFINITY);
        let ranked = if grayed {
            distance + GRAYED_PICK_PENALTY
        } else {
            distance
        };
        picker.offer(
            MountCandidate {
                index,
                volume,
                normal: mount.normal,
                grayed,
                auto_rotate,
                distance,
            },
            ranked,
        );

        report.push(MountReport {
            index,
            class,
            fill,
            normal: mount.normal,
            auto_rotate,
            hit_distance,
        });
        drawn += 1;
    }
    drawn
}

pub struct AirtightPass {
    /// Also draw faces that only seal while the door is closed.
    pub door_closed: bool,
}

/// Returns how many faces were drawn.
pub fn draw_airtightness(
    cx: &mut TranslateContext<'_>,
    shape: &ShapeDescriptor,
    world: &Mat4,
    pass: &AirtightPass,
) -> usize {
    if shape.fully_airtight {
        let half = shape.half_extents();
        let bounds = OrientedBox::from_local_bounds(-half, half, world).inflated(AIRTIGHT_INFLATE);
        for face in Direction::ALL {
            let fill = palette::AIRTIGHT_FULL.tinted_for(face.axis());
            cx.draw_quad(bounds.face_quad(face), Paint::solid(fill));
        }
        return Direction::ALL.len();
    }

    let half_cell = shape.cell_size * 0.5;
    let mut drawn = 0;
    for seal in &shape.pressurization {
        let cell = Vec3::new(seal.cell[0] as f32, seal.cell[1] as f32, seal.cell[2] as f32);
        let cell_center = shape.cell_to_local(cell + Vec3::splat(0.5));
        for face in &seal.faces {
            let counts = match face.mark {
                SealMark::Sealed => true,
                SealMark::SealedWhenClosed => pass.door_closed,
                SealMark::Open => false,
            };
            if !counts {
                continue;
            }
            let Some(color) = palette::seal_color(face.mark) else {
                continue;
            };

            let normal = face.face.as_vec3();
            let center = cell_center + normal * half_cell;
            let mut half_extents = Vec3::splat(half_cell);
            half_extents[face.face.axis_index()] = SEAL_THICKNESS * 0.5;
            let volume =
                OrientedBox::from_local_bounds(center - half_extents, center + half_extents, world);

            cx.draw_box(
                &volume,
                BoxStyle::Solid,
                Paint::solid(color.tinted_for(face.face.axis())),
            );
            drawn += 1;
        }
    }
    drawn
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortHit {
    pub index: usize,
    pub distance: f32,
    pub volume: OrientedBox,
}

/// Draws every port and offers the ones under the aim ray. Returns how many
/// ports were drawn.
pub fn draw_ports(
    cx: &mut TranslateContext<'_>,
    shape: &ShapeDescriptor,
    world: &Mat4,
    picker: &mut ClosestPicker<PortHit>,
) -> usize {
    let mut drawn = 0;
    for (index, port) in shape.ports.iter().enumerate() {
        let transform = *world * port.local_transform();
        let Some(volume) = OrientedBox::from_unit_transform(&transform) else {
            log::trace!("port {index} of {} has a degenerate transform", shape.id);
            continue;
        };
        let fill = palette::port_color(port.category);
        cx.draw_box(&volume, BoxStyle::Solid, Paint::solid(fill));
        cx.draw_box(&volume, BoxStyle::Wireframe, Paint::solid(palette::outline(fill)));

        if let Some(distance) = cx.pick_distance(&volume) {
            picker.offer(
                PortHit {
                    index,
                    distance,
                    volume,
                },
                distance,
            );
        }
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{Primitive, PrimitiveLog};
    use crate::shape::{CellSeal, FaceSeal, PortCategory, PortDescriptor, PortSize, ShapeId};
    use crate::target::Placement;

    fn coupled_at(indices: &[usize]) -> TargetInstance {
        TargetInstance {
            name: "Armor".into(),
            placement: Placement::default(),
            coupled_mounts: indices.to_vec(),
            door_closed: None,
        }
    }

    fn mount(normal: Direction, start: [f32; 3], end: [f32; 3]) -> MountPoint {
        MountPoint {
            start,
            end,
            normal,
            enabled: true,
            default: false,
            exclusion_mask: 0,
            property_mask: 0,
            coupling_tag: None,
            allow_self_coupling: false,
        }
    }

    fn shape_with(mount_points: Vec<MountPoint>) -> ShapeDescriptor {
        ShapeDescriptor {
            id: ShapeId::new("TestBlock"),
            category: None,
            cell_size: 2.5,
            size: [1, 1, 1],
            center: [0, 0, 0],
            mount_points,
            fully_airtight: false,
            pressurization: Vec::new(),
            ports: Vec::new(),
            turret: None,
            rotor: None,
        }
    }

    #[test]
    fn coupling_outranks_mask() {
        let mut both = mount(Direction::Up, [0.0, 1.0, 0.0], [1.0, 1.0, 1.0]);
        both.coupling_tag = Some("Rotor".into());
        both.exclusion_mask = 4;
        assert_eq!(MountClass::classify(&both, false), MountClass::Coupling);
        assert_eq!(MountClass::classify(&both, true), MountClass::Grayed);

        both.coupling_tag = None;
        assert_eq!(MountClass::classify(&both, false), MountClass::Masked);
        both.exclusion_mask = 0;
        both.property_mask = 1;
        assert_eq!(MountClass::classify(&both, false), MountClass::Masked);
        both.property_mask = 0;
        assert_eq!(MountClass::classify(&both, false), MountClass::Plain);
    }

    #[test]
    fn mount_box_is_thickened_along_normal() {
        let shape = shape_with(Vec::new());
        let down = mount(Direction::Down, [0.0, 0.0, 0.0], [1.0, 0.0, 1.0]);
        let volume = mount_box(&shape, &down, &Mat4::IDENTITY);
        assert!((volume.center - Vec3::new(0.0, -1.25, 0.0)).length() < 1e-6);
        assert!((volume.half_extents - Vec3::new(1.25, MOUNT_THICKNESS * 0.5, 1.25)).length() < 1e-6);
    }

    #[test]
    fn grayed_duplicate_loses_tie() {
        // Two identical boxes straddling the ray; the grayed one is offered first.
        let face = mount(Direction::Backward, [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]);
        let shape = shape_with(vec![face.clone(), face]);
        let folder = DepthFolder::passthrough(Vec3::ZERO);
        // Box face sits at z = 1.25; start the ray 2.0 in front of it.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.25 + MOUNT_THICKNESS * 0.5), Vec3::NEG_Z, 50.0);
        let mut log = PrimitiveLog::default();
        let mut cx = TranslateContext {
            sink: &mut log,
            folder: &folder,
            aim: Some(&ray),
            line_thickness: 0.01,
        };
        let mut picker = ClosestPicker::new();
        let mut report = Vec::new();
        draw_mount_points(
            &mut cx,
            &shape,
            &Mat4::IDENTITY,
            Some(&coupled_at(&[0])),
            &mut picker,
            &mut report,
        );

        assert_eq!(report.len(), 2);
        for entry in &report {
            let distance = entry.hit_distance.expect("hit");
            assert!((distance - 2.0).abs() < 1e-5, "{distance}");
        }
        assert_eq!(picker.distance().map(|d| (d - 2.0).abs() < 1e-5), Some(true));
        let winner = picker.resolve().expect("winner");
        assert_eq!(winner.index, 1);
        assert!(!winner.grayed);
    }

    #[test]
    fn missed_mounts_never_resolve() {
        let shape = shape_with(vec![mount(Direction::Up, [0.0, 1.0, 0.0], [1.0, 1.0, 1.0])]);
        let folder = DepthFolder::passthrough(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X, 50.0);
        let mut log = PrimitiveLog::default();
        let mut cx = TranslateContext {
            sink: &mut log,
            folder: &folder,
            aim: Some(&ray),
            line_thickness: 0.01,
        };
        let mut picker = ClosestPicker::new();
        let mut report = Vec::new();
        let drawn = draw_mount_points(
            &mut cx,
            &shape,
            &Mat4::IDENTITY,
            None,
            &mut picker,
            &mut report,
        );
        assert_eq!(drawn, 1);
        assert_eq!(report[0].hit_distance, None);
        assert!(picker.resolve().is_none());
    }

    #[test]
    fn ports_draw_fill_and_outline() {
        let mut shape = shape_with(Vec::new());
        shape.ports = vec![PortDescriptor {
            placement: Placement::default(),
            scale: [1.0, 1.0, 1.0],
            category: PortCategory::Conveyor,
            size: PortSize::Small,
            label: "Conveyor".into(),
        }];
        let folder = DepthFolder::passthrough(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 50.0);
        let mut log = PrimitiveLog::default();
        let mut cx = TranslateContext {
            sink: &mut log,
            folder: &folder,
            aim: Some(&ray),
            line_thickness: 0.01,
        };
        let mut picker = ClosestPicker::new();
        assert_eq!(draw_ports(&mut cx, &shape, &Mat4::IDENTITY, &mut picker), 1);
        assert_eq!(log.boxes(BoxStyle::Solid).count(), 1);
        assert_eq!(log.boxes(BoxStyle::Wireframe).count(), 1);

        let hit = picker.resolve().expect("port hit");
        assert_eq!(hit.index, 0);
        assert!((hit.distance - 4.5).abs() < 1e-5);
    }

    #[test]
    fn fully_airtight_emits_six_tinted_quads() {
        let mut shape = shape_with(Vec::new());
        shape.fully_airtight = true;
        let folder = DepthFolder::passthrough(Vec3::ZERO);
        let mut log = PrimitiveLog::default();
        let mut cx = TranslateContext {
            sink: &mut log,
            folder: &folder,
            aim: None,
            line_thickness: 0.01,
        };
        let drawn = draw_airtightness(
            &mut cx,
            &shape,
            &Mat4::IDENTITY,
            &AirtightPass { door_closed: false },
        );
        assert_eq!(drawn, 6);
        let colours: Vec<Color> = log.quads().map(|quad| quad.paint().color).collect();
        assert_eq!(colours.len(), 6);
        for (face, colour) in Direction::ALL.into_iter().zip(colours) {
            assert_eq!(colour, palette::AIRTIGHT_FULL.tinted_for(face.axis()));
        }
        if let Some(Primitive::Quad { corners, .. }) = log.quads().next() {
            // Forward face, pushed out by the inflation.
            for corner in corners {
                assert!((corner[2] + 1.25 + AIRTIGHT_INFLATE).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn sealed_when_closed_faces_need_closed_door() {
        let mut shape = shape_with(Vec::new());
        shape.pressurization = vec![CellSeal {
            cell: [0, 0, 0],
            faces: vec![
                FaceSeal {
                    face: Direction::Up,
                    mark: SealMark::Sealed,
                },
                FaceSeal {
                    face: Direction::Forward,
                    mark: SealMark::SealedWhenClosed,
                },
                FaceSeal {
                    face: Direction::Left,
                    mark: SealMark::Open,
                },
            ],
        }];
        let folder = DepthFolder::passthrough(Vec3::ZERO);
        let mut log = PrimitiveLog::default();
        let mut cx = TranslateContext {
            sink: &mut log,
            folder: &folder,
            aim: None,
            line_thickness: 0.01,
        };
        let open = draw_airtightness(
            &mut cx,
            &shape,
            &Mat4::IDENTITY,
            &AirtightPass { door_closed: false },
        );
        let closed = draw_airtightness(
            &mut cx,
            &shape,
            &Mat4::IDENTITY,
            &AirtightPass { door_closed: true },
        );
        assert_eq!((open, closed), (1, 2));

        let Some(Primitive::Box {
            center,
            half_extents,
            ..
        }) = log.boxes(BoxStyle::Solid).next()
        else {
            panic!("expected a seal box");
        };
        assert!((center[1] - 1.25).abs() < 1e-6);
        assert!((half_extents[1] - SEAL_THICKNESS * 0.5).abs() < 1e-6);
    }
}
