//! Per-viewer draw session. One session owns its label cache, scratch picker
//! state and reusable buffers; hosts showing several overlay viewers keep one
//! session per viewer.
//!
//! Each [`DrawSession::draw`] call runs a single pass for one target and is
//! the error boundary for it: a failure is logged with the shape and target
//! identity, the rest of that target's pass is dropped, and the next frame
//! starts from scratch.

use std::fmt::Write as _;

use glam::{Mat4, Vec3};

use crate::arc::ArcGeometry;
use crate::basis::{Basis, Direction};
use crate::config::{OverlayMode, OverlaySettings};
use crate::debug;
use crate::error::OverlayError;
use crate::fold::DepthFolder;
use crate::handlers::{HandlerContext, HandlerRegistry};
use crate::labels::{LabelCache, LabelRequest, LabelSlot, LabelText, LabelView};
use crate::palette;
use crate::picker::ClosestPicker;
use crate::render::{BoxStyle, Color, Paint, PrimitiveSink, TextBackend};
use crate::shape::{ShapeDescriptor, ShapeId};
use crate::target::TargetInstance;
use crate::translate::{
    self, AirtightPass, MountCandidate, MountReport, PortHit, TranslateContext,
};
use crate::volume::{OrientedBox, Ray};

/// Growth applied to the winning pick volume before it is outlined.
const HIGHLIGHT_INFLATE: f32 = 0.02;
const HIGHLIGHT_THICKNESS_SCALE: f32 = 2.0;
/// Radius of the dot marking where the aim ray meets the picked volume.
const HIT_MARKER_RADIUS: f32 = 0.04;

/// Host inputs for one frame of one viewer.
pub struct FrameInput<'a> {
    /// Camera world transform.
    pub camera: Mat4,
    pub aim: Option<Ray>,
    /// Transform of the block being placed, used when no target instance is given.
    pub preview: Option<Mat4>,
    pub settings: &'a OverlaySettings,
    pub sink: &'a mut dyn PrimitiveSink,
    pub text: &'a mut dyn TextBackend,
}

/// What the last [`DrawSession::draw`] call did.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub mode: OverlayMode,
    /// Mount points, faces or ports drawn by the translator.
    pub drawn: usize,
    pub mounts: Vec<MountReport>,
    pub closest_mount: Option<MountCandidate>,
    pub closest_port: Option<PortHit>,
    pub handler: Option<&'static str>,
    pub label: Option<String>,
    pub error: Option<String>,
    /// Allocation of the previous label, reused by the next one.
    label_buffer: String,
}

impl FrameReport {
    fn reset(&mut self) {
        self.mode = OverlayMode::Off;
        self.drawn = 0;
        self.mounts.clear();
        self.closest_mount = None;
        self.closest_port = None;
        self.handler = None;
        if let Some(mut label) = self.label.take() {
            label.clear();
            self.label_buffer = label;
        }
        self.error = None;
    }

    fn set_label(&mut self, text: &str) {
        let mut label = std::mem::take(&mut self.label_buffer);
        label.clear();
        label.push_str(text);
        self.label = Some(label);
    }
}

#[derive(Debug)]
struct LoadedShape {
    id: ShapeId,
    cell_size: f32,
    handler: Option<usize>,
}

pub struct DrawSession {
    registry: HandlerRegistry,
    labels: LabelCache,
    loaded: Option<LoadedShape>,
    mount_picker: ClosestPicker<MountCandidate>,
    port_picker: ClosestPicker<PortHit>,
    arc_buffer: ArcGeometry,
    text_buffer: String,
    report: FrameReport,
}

impl DrawSession {
    pub fn new(registry: HandlerRegistry, settings: &OverlaySettings) -> Self {
        Self {
            registry,
            labels: LabelCache::new(settings.label_style()),
            loaded: None,
            mount_picker: ClosestPicker::new(),
            port_picker: ClosestPicker::new(),
            arc_buffer: ArcGeometry::default(),
            text_buffer: String::with_capacity(crate::labels::DEFAULT_TEXT_CAPACITY),
            report: FrameReport::default(),
        }
    }

    pub fn report(&self) -> &FrameReport {
        &self.report
    }

    /// Identity of the shape the session last loaded, if any.
    pub fn loaded_shape(&self) -> Option<&ShapeId> {
        self.loaded.as_ref().map(|loaded| &loaded.id)
    }

    /// Draws one target for this frame. Never fails; errors are logged and the
    /// remainder of this target's pass is skipped.
    pub fn draw(
        &mut self,
        frame: &mut FrameInput<'_>,
        shape: &ShapeDescriptor,
        target: Option<&TargetInstance>,
        mode_override: Option<OverlayMode>,
    ) {
        self.report.reset();
        if let Err(err) = self.draw_pass(frame, shape, target, mode_override) {
            let target_name = target.map_or("<preview>", |target| target.name.as_str());
            log::error!(
                "[overlay] {} pass for {} ({target_name}) failed: {err}",
                mode_label(self.report.mode),
                shape.id
            );
            self.report.error = Some(err.to_string());
            self.clear_scratch();
        }
        if self.labels.take_any_shown() {
            self.labels.hide_stale(&mut *frame.text);
        } else {
            self.labels.hide_all(&mut *frame.text);
        }
    }

    /// Releases every text object owned by the session.
    pub fn teardown(&mut self, text: &mut dyn TextBackend) {
        self.labels.teardown(text);
        self.loaded = None;
        self.clear_scratch();
    }

    fn clear_scratch(&mut self) {
        self.mount_picker.reset();
        self.port_picker.reset();
        self.arc_buffer.clear();
        self.text_buffer.clear();
    }

    fn draw_pass(
        &mut self,
        frame: &mut FrameInput<'_>,
        shape: &ShapeDescriptor,
        target: Option<&TargetInstance>,
        mode_override: Option<OverlayMode>,
    ) -> Result<(), OverlayError> {
        let settings = frame.settings;
        let mode = mode_override.unwrap_or(settings.mode);
        self.report.mode = mode;

        self.observe_shape(shape)?;
        if mode == OverlayMode::Off {
            return Ok(());
        }

        let Some(world) = target.map(TargetInstance::world_matrix).or(frame.preview) else {
            log::trace!("[overlay] no transform for {}, nothing to draw", shape.id);
            return Ok(());
        };
        if !world.is_finite() {
            return Err(OverlayError::InvalidTransform {
                shape: shape.id.clone(),
            });
        }

        self.labels.set_gate(settings.label_gate());
        self.labels.set_style(settings.label_style());
        let camera = Basis::from_matrix(&frame.camera);
        let folder = DepthFolder::new(camera.translation, settings.effective_fold_ratio());

        match mode {
            OverlayMode::Off => Ok(()),
            OverlayMode::Airtightness => {
                self.draw_airtightness(frame, shape, target, &world, &camera, &folder);
                Ok(())
            }
            OverlayMode::MountPoints => {
                self.draw_mount_points(frame, shape, target, &world, &camera, &folder)
            }
            OverlayMode::Ports => {
                self.draw_ports(frame, shape, &world, &camera, &folder);
                Ok(())
            }
        }
    }

    /// Re-derives the cached shape state when the shape identity changes.
    fn observe_shape(&mut self, shape: &ShapeDescriptor) -> Result<(), OverlayError> {
        if self
            .loaded
            .as_ref()
            .is_some_and(|loaded| loaded.id == shape.id)
        {
            return Ok(());
        }

        self.loaded = None;
        shape.validate()?;
        let handler = shape
            .category
            .as_deref()
            .and_then(|category| self.registry.resolve(category));
        log::debug!(
            "[overlay] loaded shape {} (cell {:.2}, handler {})",
            shape.id,
            shape.cell_size,
            handler
                .and_then(|index| self.registry.get(index))
                .map_or("none", |handler| handler.name())
        );
        self.loaded = Some(LoadedShape {
            id: shape.id.clone(),
            cell_size: shape.cell_size,
            handler,
        });
        Ok(())
    }

    fn draw_mount_points(
        &mut self,
        frame: &mut FrameInput<'_>,
        shape: &ShapeDescriptor,
        target: Option<&TargetInstance>,
        world: &Mat4,
        camera: &Basis,
        folder: &DepthFolder,
    ) -> Result<(), OverlayError> {
        let settings = frame.settings;
        self.mount_picker.reset();

        let mut cx = TranslateContext {
            sink: &mut *frame.sink,
            folder,
            aim: frame.aim.as_ref(),
            line_thickness: settings.line_thickness,
        };
        self.report.drawn = translate::draw_mount_points(
            &mut cx,
            shape,
            world,
            target,
            &mut self.mount_picker,
            &mut self.report.mounts,
        );

        let (handler, cell_size) = match self.loaded.as_ref() {
            Some(loaded) => (loaded.handler, loaded.cell_size),
            None => (None, shape.cell_size),
        };
        if let Some(handler) = handler.and_then(|index| self.registry.get(index)) {
            self.report.handler = Some(handler.name());
            let mut cx = HandlerContext {
                sink: &mut *frame.sink,
                text: &mut *frame.text,
                labels: &mut self.labels,
                camera,
                folder,
                world,
                settings,
                cell_size,
                arc: &mut self.arc_buffer,
                text_buffer: &mut self.text_buffer,
            };
            handler
                .draw(&mut cx, shape, target)
                .map_err(|source| OverlayError::HandlerFailed {
                    handler: handler.name(),
                    source: Box::new(source),
                })?;
        }

        let Some(closest) = self.mount_picker.resolve() else {
            return Ok(());
        };
        if debug::config().log_picks() {
            log::info!(
                "[overlay] pick {} mount {} ({}) at {:.3}{}",
                shape.id,
                closest.index,
                closest.normal,
                closest.distance,
                if closest.grayed { ", grayed" } else { "" }
            );
        }
        self.report.closest_mount = Some(closest);
        draw_highlight(
            &mut *frame.sink,
            folder,
            &closest.volume,
            frame.aim.map(|ray| ray.at(closest.distance)),
            settings.line_thickness,
        );

        let Some(mount) = shape.mount_points.get(closest.index) else {
            return Ok(());
        };
        self.text_buffer.clear();
        let _ = write!(
            self.text_buffer,
            "Mount point {} ({})",
            closest.index, closest.normal
        );
        if let Some(tag) = &mount.coupling_tag {
            let _ = write!(self.text_buffer, "\nCouples with {tag}");
        }
        if closest.auto_rotate {
            self.text_buffer.push_str("\nAuto-rotate");
        }
        if closest.grayed {
            self.text_buffer.push_str("\nAlready coupled");
        }

        let fill = self
            .report
            .mounts
            .iter()
            .find(|report| report.index == closest.index)
            .map_or(palette::MOUNT_PLAIN, |report| report.fill);
        let direction = Basis::from_matrix(world).direction(closest.normal);
        self.place_label(
            frame,
            camera,
            folder,
            LabelSlot::MountPoint,
            closest.volume.center,
            direction,
            palette::outline(fill),
            None,
        );
        Ok(())
    }

    fn draw_airtightness(
        &mut self,
        frame: &mut FrameInput<'_>,
        shape: &ShapeDescriptor,
        target: Option<&TargetInstance>,
        world: &Mat4,
        camera: &Basis,
        folder: &DepthFolder,
    ) {
        let settings = frame.settings;
        let door_closed =
            settings.door_closed_seals && target.is_some_and(|target| target.door_closed == Some(true));
        let mut cx = TranslateContext {
            sink: &mut *frame.sink,
            folder,
            aim: None,
            line_thickness: settings.line_thickness,
        };
        let drawn =
            translate::draw_airtightness(&mut cx, shape, world, &AirtightPass { door_closed });
        self.report.drawn = drawn;
        if drawn == 0 {
            return;
        }

        let message = if shape.fully_airtight {
            Some(LabelText::Cached("Airtight"))
        } else {
            self.text_buffer.clear();
            let _ = write!(self.text_buffer, "{drawn} sealed faces");
            None
        };
        let anchor = world.transform_point3(Vec3::new(0.0, shape.half_extents().y, 0.0));
        let direction = Basis::from_matrix(world).direction(Direction::Up);
        self.place_label(
            frame,
            camera,
            folder,
            LabelSlot::Airtightness,
            anchor,
            direction,
            palette::outline(palette::AIRTIGHT_FACE),
            message,
        );
    }

    fn draw_ports(
        &mut self,
        frame: &mut FrameInput<'_>,
        shape: &ShapeDescriptor,
        world: &Mat4,
        camera: &Basis,
        folder: &DepthFolder,
    ) {
        let settings = frame.settings;
        self.port_picker.reset();
        let mut cx = TranslateContext {
            sink: &mut *frame.sink,
            folder,
            aim: frame.aim.as_ref(),
            line_thickness: settings.line_thickness,
        };
        self.report.drawn = translate::draw_ports(&mut cx, shape, world, &mut self.port_picker);

        let Some(closest) = self.port_picker.resolve() else {
            return;
        };
        let Some(port) = shape.ports.get(closest.index) else {
            return;
        };
        if debug::config().log_picks() {
            log::info!(
                "[overlay] pick {} port {} '{}' at {:.3}",
                shape.id,
                closest.index,
                port.label,
                closest.distance
            );
        }
        self.report.closest_port = Some(closest);
        draw_highlight(
            &mut *frame.sink,
            folder,
            &closest.volume,
            frame.aim.map(|ray| ray.at(closest.distance)),
            settings.line_thickness,
        );

        self.text_buffer.clear();
        let _ = write!(self.text_buffer, "{}\n{}", port.label, port.category.name());
        let direction = Basis::from_matrix(world).direction(Direction::Up);
        self.place_label(
            frame,
            camera,
            folder,
            LabelSlot::Port,
            closest.volume.center,
            direction,
            palette::outline(palette::port_color(port.category)),
            None,
        );
    }

    /// Draws a label for `slot`. `message` of `None` uses the text buffer.
    #[allow(clippy::too_many_arguments)]
    fn place_label(
        &mut self,
        frame: &mut FrameInput<'_>,
        camera: &Basis,
        folder: &DepthFolder,
        slot: LabelSlot,
        anchor: Vec3,
        direction: Vec3,
        color: Color,
        message: Option<LabelText<'static>>,
    ) {
        let text = message.unwrap_or(LabelText::Dynamic(&self.text_buffer));
        let mut view = LabelView {
            camera,
            folder,
            sink: &mut *frame.sink,
            text: &mut *frame.text,
        };
        let placed = self.labels.draw_label(
            &mut view,
            &LabelRequest {
                slot,
                anchor,
                direction,
                color,
                text: Some(text),
                line_height: frame.settings.label_line_height,
                always_on_top: frame.settings.always_on_top,
            },
        );
        if placed.is_some() {
            self.report.set_label(text.as_str());
        }
    }
}

/// Outlines the picked volume and drops a dot where the aim ray touches it.
fn draw_highlight(
    sink: &mut dyn PrimitiveSink,
    folder: &DepthFolder,
    volume: &OrientedBox,
    hit: Option<Vec3>,
    line_thickness: f32,
) {
    let mut outline = volume.inflated(HIGHLIGHT_INFLATE);
    let ratio = folder.fold_box(&mut outline);
    sink.oriented_box(
        &outline,
        BoxStyle::Wireframe,
        line_thickness * HIGHLIGHT_THICKNESS_SCALE * ratio,
        Paint::solid(palette::PICK_HIGHLIGHT),
    );
    if let Some(mut hit) = hit {
        let ratio = folder.fold_point(&mut hit);
        sink.point(hit, HIT_MARKER_RADIUS * ratio, Paint::glow(palette::PICK_HIGHLIGHT));
    }
}

fn mode_label(mode: OverlayMode) -> &'static str {
    match mode {
        OverlayMode::Off => "off",
        OverlayMode::Airtightness => "airtightness",
        OverlayMode::MountPoints => "mount point",
        OverlayMode::Ports => "port",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessText, PrimitiveLog};

    fn cube() -> ShapeDescriptor {
        ShapeDescriptor {
            id: ShapeId::new("SmallCube"),
            category: None,
            cell_size: 0.5,
            size: [1, 1, 1],
            center: [0, 0, 0],
            mount_points: Vec::new(),
            fully_airtight: true,
            pressurization: Vec::new(),
            ports: Vec::new(),
            turret: None,
            rotor: None,
        }
    }

    fn run(
        session: &mut DrawSession,
        settings: &OverlaySettings,
        log: &mut PrimitiveLog,
        text: &mut HeadlessText,
        shape: &ShapeDescriptor,
        preview: Option<Mat4>,
    ) {
        let mut frame = FrameInput {
            camera: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            aim: None,
            preview,
            settings,
            sink: log,
            text,
        };
        session.draw(&mut frame, shape, None, None);
    }

    #[test]
    fn shape_change_reloads_cached_state() {
        let settings = OverlaySettings::default();
        let mut session = DrawSession::new(HandlerRegistry::with_builtin(), &settings);
        let (mut log, mut text) = (PrimitiveLog::default(), HeadlessText::default());
        assert!(session.loaded_shape().is_none());

        run(&mut session, &settings, &mut log, &mut text, &cube(), None);
        assert_eq!(session.loaded_shape().map(ShapeId::as_str), Some("SmallCube"));

        let mut other = cube();
        other.id = ShapeId::new("LargeCube");
        run(&mut session, &settings, &mut log, &mut text, &other, None);
        assert_eq!(session.loaded_shape().map(ShapeId::as_str), Some("LargeCube"));
        assert!(log.is_empty());
    }

    #[test]
    fn invalid_shape_is_reported_not_loaded() {
        let settings = OverlaySettings {
            mode: OverlayMode::Airtightness,
            ..OverlaySettings::default()
        };
        let mut session = DrawSession::new(HandlerRegistry::new(), &settings);
        let (mut log, mut text) = (PrimitiveLog::default(), HeadlessText::default());
        let mut broken = cube();
        broken.cell_size = 0.0;
        run(
            &mut session,
            &settings,
            &mut log,
            &mut text,
            &broken,
            Some(Mat4::IDENTITY),
        );
        assert!(session.report().error.is_some());
        assert!(session.loaded_shape().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn non_finite_transform_is_swallowed() {
        let settings = OverlaySettings {
            mode: OverlayMode::Airtightness,
            ..OverlaySettings::default()
        };
        let mut session = DrawSession::new(HandlerRegistry::new(), &settings);
        let (mut log, mut text) = (PrimitiveLog::default(), HeadlessText::default());
        let broken = Mat4::from_translation(Vec3::new(f32::NAN, 0.0, 0.0));
        run(&mut session, &settings, &mut log, &mut text, &cube(), Some(broken));
        let error = session.report().error.as_deref().expect("error recorded");
        assert!(error.contains("not finite"), "{error}");
        assert!(log.is_empty());
    }

    #[test]
    fn airtight_cube_is_labelled() {
        let settings = OverlaySettings {
            mode: OverlayMode::Airtightness,
            ..OverlaySettings::default()
        };
        let mut session = DrawSession::new(HandlerRegistry::new(), &settings);
        let (mut log, mut text) = (PrimitiveLog::default(), HeadlessText::default());
        run(
            &mut session,
            &settings,
            &mut log,
            &mut text,
            &cube(),
            Some(Mat4::IDENTITY),
        );
        assert_eq!(session.report().drawn, 6);
        assert_eq!(log.quads().count(), 6);
        assert_eq!(session.report().label.as_deref(), Some("Airtight"));
        assert_eq!(text.visible_texts(), vec!["Airtight"]);
    }

    #[test]
    fn report_label_keeps_its_allocation_across_frames() {
        let settings = OverlaySettings {
            mode: OverlayMode::Airtightness,
            ..OverlaySettings::default()
        };
        let mut session = DrawSession::new(HandlerRegistry::new(), &settings);
        let (mut log, mut text) = (PrimitiveLog::default(), HeadlessText::default());
        let mut label_ptr = || {
            run(
                &mut session,
                &settings,
                &mut log,
                &mut text,
                &cube(),
                Some(Mat4::IDENTITY),
            );
            session.report().label.as_ref().map(|label| label.as_ptr())
        };
        let first = label_ptr();
        assert!(first.is_some());
        assert_eq!(label_ptr(), first);
    }
}
