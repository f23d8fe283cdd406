//! Per-category overlays drawn on top of the mount point pass, e.g. rotation
//! limit sectors for turrets and rotors. Handlers are looked up by the shape's
//! `category` key; a miss simply means the shape has nothing extra to show.

mod rotor;
mod turret;

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::arc::{ArcFrame, ArcGeometry, ArcOptions, ArcResult, ArcStyle, ArcSweep};
use crate::basis::Basis;
use crate::config::OverlaySettings;
use crate::error::OverlayError;
use crate::fold::DepthFolder;
use crate::labels::{LabelCache, LabelRequest, LabelSlot, LabelText, LabelView};
use crate::palette;
use crate::render::{Color, Paint, PrimitiveSink, TextBackend};
use crate::shape::ShapeDescriptor;
use crate::target::TargetInstance;

pub use rotor::RotorOverlay;
pub use turret::TurretOverlay;

/// Everything a handler may touch while drawing one target.
pub struct HandlerContext<'a> {
    pub sink: &'a mut dyn PrimitiveSink,
    pub text: &'a mut dyn TextBackend,
    pub labels: &'a mut LabelCache,
    pub camera: &'a Basis,
    pub folder: &'a DepthFolder,
    pub world: &'a Mat4,
    pub settings: &'a OverlaySettings,
    pub cell_size: f32,
    /// Scratch geometry reused across sectors and frames.
    pub arc: &'a mut ArcGeometry,
    /// Scratch builder for dynamic label text.
    pub text_buffer: &'a mut String,
}

impl HandlerContext<'_> {
    /// Sector origin for `shape`: the middle of its center cell, in world space.
    pub fn shape_center(&self, shape: &ShapeDescriptor) -> Vec3 {
        let center = glam::IVec3::from_array(shape.center).as_vec3() + Vec3::splat(0.5);
        self.world.transform_point3(shape.cell_to_local(center))
    }

    /// Generates, folds and draws one limit sector, then hangs a label off its
    /// last rim point.
    pub fn draw_limit_sector(
        &mut self,
        frame: &ArcFrame,
        sweep: &ArcSweep,
        color: Color,
        slot: LabelSlot,
        text: Option<LabelText<'_>>,
    ) -> ArcResult {
        if sweep.is_degenerate() {
            log::trace!(
                "[overlay] {slot:?} sector {:.0}..{:.0} collapsed to one point",
                sweep.start().to_degrees(),
                sweep.end().to_degrees()
            );
        }
        let result = crate::arc::generate_arc(
            frame,
            sweep,
            ArcOptions {
                edges: true,
                faces: true,
            },
            &mut *self.arc,
        );
        let ratio = self.arc.fold(self.folder);
        crate::arc::draw_arc(
            &mut *self.sink,
            &*self.arc,
            &ArcStyle {
                rim: Paint::solid(palette::outline(color)),
                fill: Paint::solid(color),
                thickness: self.settings.line_thickness * ratio,
            },
        );

        let mut view = LabelView {
            camera: self.camera,
            folder: self.folder,
            sink: &mut *self.sink,
            text: &mut *self.text,
        };
        self.labels.draw_label(
            &mut view,
            &LabelRequest {
                slot,
                anchor: result.last,
                direction: (result.last - frame.center).normalize_or_zero(),
                color: palette::outline(color),
                text,
                line_height: self.settings.label_line_height,
                always_on_top: self.settings.always_on_top,
            },
        );
        result
    }
}

pub trait SpecializedOverlay {
    fn name(&self) -> &'static str;

    fn draw(
        &self,
        cx: &mut HandlerContext<'_>,
        shape: &ShapeDescriptor,
        target: Option<&TargetInstance>,
    ) -> Result<(), OverlayError>;
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn SpecializedOverlay>>,
    by_category: HashMap<String, usize>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the turret and rotor overlays.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("turret", Box::new(TurretOverlay));
        registry.register("rotor", Box::new(RotorOverlay));
        registry
    }

    /// Registers `handler` for `category`, replacing any previous one.
    pub fn register(&mut self, category: impl Into<String>, handler: Box<dyn SpecializedOverlay>) {
        let category = category.into();
        if let Some(slot) = self
            .by_category
            .get(&category)
            .and_then(|&index| self.handlers.get_mut(index))
        {
            *slot = handler;
            return;
        }
        self.by_category.insert(category, self.handlers.len());
        self.handlers.push(handler);
    }

    pub fn resolve(&self, category: &str) -> Option<usize> {
        self.by_category.get(category).copied()
    }

    pub fn get(&self, index: usize) -> Option<&dyn SpecializedOverlay> {
        self.handlers.get(index).map(|handler| handler.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

/// Errors out when a handler is pointed at a shape lacking the data it draws.
fn missing(shape: &ShapeDescriptor, detail: &str) -> OverlayError {
    OverlayError::MissingShapeData {
        shape: shape.id.clone(),
        detail: detail.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_handlers_resolve_by_category() {
        let registry = HandlerRegistry::with_builtin();
        let turret = registry.resolve("turret").expect("turret registered");
        assert_eq!(registry.get(turret).map(|h| h.name()), Some("turret"));
        let rotor = registry.resolve("rotor").expect("rotor registered");
        assert_eq!(registry.get(rotor).map(|h| h.name()), Some("rotor"));
        assert_eq!(registry.resolve("conveyor"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn re_registering_a_category_replaces_its_handler() {
        let mut registry = HandlerRegistry::with_builtin();
        registry.register("turret", Box::new(RotorOverlay));
        let index = registry.resolve("turret").expect("turret registered");
        assert_eq!(registry.get(index).map(|h| h.name()), Some("rotor"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.handlers.len(), 2);
    }

    #[test]
    fn shape_center_is_middle_of_center_cell() {
        let mut rig = test_rig::Rig::new();
        rig.world = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let mut shape = test_rig::block("turret");
        shape.size = [3, 1, 1];
        shape.center = [1, 0, 0];
        let cx = rig.context();
        let center = cx.shape_center(&shape);
        assert!((center - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5, "{center}");
    }
}
