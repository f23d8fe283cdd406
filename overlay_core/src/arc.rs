//! Angular sector tessellation for rotation-limit overlays.
//!
//! Limits arrive as integer degrees that are not clamped to `[0, 360)`. Each
//! end is normalized on its own, keeping `360` distinct from `0` (a full turn
//! versus no rotation), and a sweep whose start lands after its end has full
//! turns subtracted from the start until sampling runs upwards. This is how a
//! 300..60 range crosses the wrap. Both ends normalize into `(-360, 360]`, so
//! at most two turns are ever taken off.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::fold::DepthFolder;
use crate::render::{Paint, PrimitiveSink};

/// `angle % 360`, except that non-zero multiples of 360 stay `360`.
pub fn normalize_degrees(angle: i32) -> i32 {
    let normalized = angle % 360;
    if normalized == 0 && angle != 0 {
        360
    } else {
        normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSweep {
    start: f32,
    end: f32,
    step: f32,
}

impl ArcSweep {
    /// `step_deg` is clamped to `1..=360`; the sweep uses `360 / step_deg`
    /// steps per full turn.
    pub fn from_degrees(start_deg: i32, end_deg: i32, step_deg: i32) -> Self {
        let end = normalize_degrees(end_deg);
        let mut start = normalize_degrees(start_deg);
        while start > end {
            start -= 360;
        }
        let steps = 360 / step_deg.clamp(1, 360);
        Self {
            start: (start as f32).to_radians(),
            end: (end as f32).to_radians(),
            step: TAU / steps as f32,
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    /// Sample angles in radians: `start`, then fixed steps, with the final
    /// sample clamped to exactly `end`.
    pub fn angles(&self) -> ArcAngles {
        ArcAngles {
            start: self.start,
            end: self.end,
            step: self.step,
            index: 0,
            finished: false,
        }
    }
}

// Samples closer than this fraction of a step to the end collapse onto it.
const END_SNAP: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct ArcAngles {
    start: f32,
    end: f32,
    step: f32,
    index: u32,
    finished: bool,
}

impl Iterator for ArcAngles {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.finished {
            return None;
        }
        let angle = self.start + self.index as f32 * self.step;
        if angle >= self.end - self.step * END_SNAP {
            self.finished = true;
            return Some(self.end);
        }
        self.index += 1;
        Some(angle)
    }
}

/// Plane of a sector: angle zero points along `forward`, positive angles turn
/// around `axis` by the right-hand rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcFrame {
    pub center: Vec3,
    pub forward: Vec3,
    pub axis: Vec3,
    pub radius: f32,
}

impl ArcFrame {
    pub fn rim_point(&self, angle: f32) -> Vec3 {
        let side = self.axis.cross(self.forward);
        let (sin, cos) = angle.sin_cos();
        self.center + (self.forward * cos + side * sin) * self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcOptions {
    pub edges: bool,
    pub faces: bool,
}

/// First and last rim points, for anchoring a label at the sector boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcResult {
    pub first: Vec3,
    pub last: Vec3,
}

/// Reusable output buffers; [`generate_arc`] clears them on every call.
#[derive(Debug, Default, Clone)]
pub struct ArcGeometry {
    pub center: Vec3,
    pub rim: Vec<Vec3>,
    pub edges: Option<[[Vec3; 2]; 2]>,
    pub faces: Vec<[Vec3; 3]>,
}

impl ArcGeometry {
    pub fn clear(&mut self) {
        self.center = Vec3::ZERO;
        self.rim.clear();
        self.edges = None;
        self.faces.clear();
    }

    pub fn fold(&mut self, folder: &DepthFolder) -> f32 {
        if folder.is_passthrough() {
            return 1.0;
        }
        folder.fold_point(&mut self.center);
        folder.fold_points(&mut self.rim);
        if let Some(edges) = self.edges.as_mut() {
            for edge in edges.iter_mut() {
                folder.fold_points(edge);
            }
        }
        for face in self.faces.iter_mut() {
            folder.fold_points(face);
        }
        folder.ratio()
    }
}

pub fn generate_arc(
    frame: &ArcFrame,
    sweep: &ArcSweep,
    options: ArcOptions,
    out: &mut ArcGeometry,
) -> ArcResult {
    out.clear();
    out.center = frame.center;

    let mut previous: Option<Vec3> = None;
    for angle in sweep.angles() {
        let point = frame.rim_point(angle);
        if let Some(previous) = previous {
            if options.faces {
                out.faces.push([frame.center, point, previous]);
            }
        }
        out.rim.push(point);
        previous = Some(point);
    }

    let first = out.rim.first().copied().unwrap_or(frame.center);
    let last = out.rim.last().copied().unwrap_or(first);
    if options.edges {
        out.edges = Some([[frame.center, first], [frame.center, last]]);
    }
    ArcResult { first, last }
}

#[derive(Debug, Clone, Copy)]
pub struct ArcStyle {
    pub rim: Paint,
    pub fill: Paint,
    pub thickness: f32,
}

pub fn draw_arc(sink: &mut dyn PrimitiveSink, geometry: &ArcGeometry, style: &ArcStyle) {
    for pair in geometry.rim.windows(2) {
        sink.line(pair[0], pair[1], style.thickness, style.rim);
    }
    if let Some(edges) = geometry.edges {
        for [from, to] in edges {
            sink.line(from, to, style.thickness, style.rim);
        }
    }
    for face in &geometry.faces {
        sink.triangle(*face, style.fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn flat_frame() -> ArcFrame {
        ArcFrame {
            center: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            axis: Vec3::Y,
            radius: 2.0,
        }
    }

    #[test]
    fn normalization_keeps_full_turn_distinct() {
        assert_eq!(normalize_degrees(0), 0);
        assert_eq!(normalize_degrees(360), 360);
        assert_eq!(normalize_degrees(720), 360);
        assert_eq!(normalize_degrees(-360), 360);
        assert_eq!(normalize_degrees(-90), -90);
        assert_eq!(normalize_degrees(450), 90);
    }

    #[test]
    fn samples_increase_and_stop_exactly_at_end() {
        let grid = (-720..=720)
            .step_by(7)
            .flat_map(|start| (-720..=720).step_by(11).map(move |end| (start, end)));
        for (start, end) in grid.chain([(701, -27), (360, 0), (-360, 360)]) {
            let sweep = ArcSweep::from_degrees(start, end, 5);
            let expected_end = (normalize_degrees(end) as f32).to_radians();
            let angles: Vec<f32> = sweep.angles().collect();

            assert!(!angles.is_empty());
            assert_eq!(angles[0], sweep.start(), "{start}..{end}");
            assert_eq!(
                *angles.last().expect("sample"),
                expected_end,
                "{start}..{end}"
            );
            for pair in angles.windows(2) {
                assert!(pair[0] < pair[1], "{start}..{end}: {pair:?}");
            }
        }
    }

    #[test]
    fn far_wrapped_start_still_sweeps_upwards() {
        // 701 normalizes to 341 and one turn off still sits above -27.
        let sweep = ArcSweep::from_degrees(701, -27, 5);
        assert!((sweep.start() - (-379.0f32).to_radians()).abs() < EPSILON);
        assert!((sweep.end() - (-27.0f32).to_radians()).abs() < EPSILON);
        assert!(!sweep.is_degenerate());
        // 352 degrees at 5 degree steps: 70 full steps plus the snapped end.
        assert_eq!(sweep.angles().count(), 72);

        let sweep = ArcSweep::from_degrees(-720, -709, 5);
        assert_eq!(sweep.angles().next(), Some(sweep.start()));
        assert!(sweep.angles().count() > 1);
    }

    #[test]
    fn full_turn_start_onto_zero_is_degenerate() {
        let sweep = ArcSweep::from_degrees(360, 0, 5);
        assert!(sweep.is_degenerate());
        assert_eq!(sweep.angles().collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn wrapped_range_subtracts_one_turn() {
        let sweep = ArcSweep::from_degrees(300, 60, 10);
        assert!((sweep.start() - (-60.0f32).to_radians()).abs() < EPSILON);
        assert!((sweep.end() - 60.0f32.to_radians()).abs() < EPSILON);
        assert_eq!(sweep.angles().count(), 13);
    }

    #[test]
    fn zero_length_range_emits_one_point() {
        let mut geometry = ArcGeometry::default();
        let sweep = ArcSweep::from_degrees(45, 405, 5);
        assert!(sweep.is_degenerate());
        let result = generate_arc(
            &flat_frame(),
            &sweep,
            ArcOptions {
                edges: true,
                faces: true,
            },
            &mut geometry,
        );
        assert_eq!(geometry.rim.len(), 1);
        assert!(geometry.faces.is_empty());
        assert_eq!(result.first, result.last);
        let edges = geometry.edges.expect("edges requested");
        assert_eq!(edges[0], edges[1]);
    }

    #[test]
    fn full_turn_fans_every_step() {
        let mut geometry = ArcGeometry::default();
        let sweep = ArcSweep::from_degrees(0, 360, 90);
        let result = generate_arc(
            &flat_frame(),
            &sweep,
            ArcOptions {
                edges: false,
                faces: true,
            },
            &mut geometry,
        );
        assert_eq!(geometry.rim.len(), 5);
        assert_eq!(geometry.faces.len(), 4);
        assert!(geometry.edges.is_none());
        assert!((result.first - result.last).length() < EPSILON);
    }

    #[test]
    fn positive_angles_turn_towards_left() {
        let frame = flat_frame();
        let quarter = frame.rim_point(std::f32::consts::FRAC_PI_2);
        assert!((quarter - Vec3::new(-2.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn buffers_are_reused_between_calls() {
        let mut geometry = ArcGeometry::default();
        let options = ArcOptions {
            edges: true,
            faces: true,
        };
        generate_arc(
            &flat_frame(),
            &ArcSweep::from_degrees(0, 180, 10),
            options,
            &mut geometry,
        );
        let capacity = geometry.rim.capacity();
        generate_arc(
            &flat_frame(),
            &ArcSweep::from_degrees(0, 90, 10),
            options,
            &mut geometry,
        );
        assert_eq!(geometry.rim.len(), 10);
        assert_eq!(geometry.rim.capacity(), capacity);
    }
}
