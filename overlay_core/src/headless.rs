//! Recording implementations of the renderer seams. The probe binary and the
//! tests draw into these instead of a real renderer.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::render::{
    BoxStyle, Paint, PrimitiveSink, TextAlign, TextBackend, TextHandle, TextPlacement,
};
use crate::volume::OrientedBox;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        from: [f32; 3],
        to: [f32; 3],
        thickness: f32,
        paint: Paint,
    },
    Triangle {
        corners: [[f32; 3]; 3],
        paint: Paint,
    },
    Quad {
        corners: [[f32; 3]; 4],
        paint: Paint,
    },
    Box {
        center: [f32; 3],
        half_extents: [f32; 3],
        axes: [[f32; 3]; 3],
        style: BoxStyle,
        thickness: f32,
        paint: Paint,
    },
    Point {
        at: [f32; 3],
        radius: f32,
        paint: Paint,
    },
}

impl Primitive {
    pub fn paint(&self) -> &Paint {
        match self {
            Primitive::Line { paint, .. }
            | Primitive::Triangle { paint, .. }
            | Primitive::Quad { paint, .. }
            | Primitive::Box { paint, .. }
            | Primitive::Point { paint, .. } => paint,
        }
    }
}

#[derive(Debug, Default)]
pub struct PrimitiveLog {
    primitives: Vec<Primitive>,
}

impl PrimitiveLog {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn line_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count()
    }

    pub fn boxes(&self, wanted: BoxStyle) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(move |p| matches!(p, Primitive::Box { style, .. } if *style == wanted))
    }

    pub fn quads(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Quad { .. }))
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Triangle { .. }))
            .count()
    }
}

impl PrimitiveSink for PrimitiveLog {
    fn line(&mut self, from: Vec3, to: Vec3, thickness: f32, paint: Paint) {
        self.primitives.push(Primitive::Line {
            from: from.to_array(),
            to: to.to_array(),
            thickness,
            paint,
        });
    }

    fn triangle(&mut self, corners: [Vec3; 3], paint: Paint) {
        self.primitives.push(Primitive::Triangle {
            corners: corners.map(|corner| corner.to_array()),
            paint,
        });
    }

    fn quad(&mut self, corners: [Vec3; 4], paint: Paint) {
        self.primitives.push(Primitive::Quad {
            corners: corners.map(|corner| corner.to_array()),
            paint,
        });
    }

    fn oriented_box(&mut self, volume: &OrientedBox, style: BoxStyle, thickness: f32, paint: Paint) {
        self.primitives.push(Primitive::Box {
            center: volume.center.to_array(),
            half_extents: volume.half_extents.to_array(),
            axes: volume.rotation.to_cols_array_2d(),
            style,
            thickness,
            paint,
        });
    }

    fn point(&mut self, at: Vec3, radius: f32, paint: Paint) {
        self.primitives.push(Primitive::Point {
            at: at.to_array(),
            radius,
            paint,
        });
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadlessLabel {
    pub text: String,
    pub capacity: usize,
    pub visible: bool,
    pub origin: Option<[f32; 3]>,
    pub scale: f32,
    pub align: Option<TextAlign>,
    pub released: bool,
    #[serde(skip)]
    pub set_text_calls: u32,
}

/// Text objects with monospace metrics: each character advances
/// [`HeadlessText::CHAR_ADVANCE`] and each line is [`HeadlessText::LINE_HEIGHT`]
/// tall, both at scale 1.0.
#[derive(Debug, Default)]
pub struct HeadlessText {
    labels: Vec<HeadlessLabel>,
}

impl HeadlessText {
    pub const CHAR_ADVANCE: f32 = 0.6;
    pub const LINE_HEIGHT: f32 = 1.0;

    pub fn labels(&self) -> &[HeadlessLabel] {
        &self.labels
    }

    pub fn label(&self, handle: TextHandle) -> Option<&HeadlessLabel> {
        self.labels.get(handle.0 as usize)
    }

    /// Texts currently shown. A shadow copy is created right after its label
    /// and carries the same text, so consecutive duplicates collapse.
    pub fn visible_texts(&self) -> Vec<&str> {
        let mut texts: Vec<&str> = self
            .labels
            .iter()
            .filter(|label| label.visible && !label.released)
            .map(|label| label.text.as_str())
            .collect();
        texts.dedup();
        texts
    }

    fn label_mut(&mut self, handle: TextHandle) -> Option<&mut HeadlessLabel> {
        self.labels.get_mut(handle.0 as usize)
    }
}

impl TextBackend for HeadlessText {
    fn create(&mut self, capacity: usize) -> TextHandle {
        let handle = TextHandle(self.labels.len() as u32);
        self.labels.push(HeadlessLabel {
            text: String::with_capacity(capacity),
            capacity,
            visible: false,
            origin: None,
            scale: 1.0,
            align: None,
            released: false,
            set_text_calls: 0,
        });
        handle
    }

    fn set_text(&mut self, handle: TextHandle, text: &str) {
        if let Some(label) = self.label_mut(handle) {
            label.text.clear();
            label.text.push_str(text);
            label.set_text_calls += 1;
        }
    }

    fn place(&mut self, handle: TextHandle, placement: &TextPlacement) {
        if let Some(label) = self.label_mut(handle) {
            label.origin = Some(placement.origin.to_array());
            label.scale = placement.scale;
            label.align = Some(placement.align);
        }
    }

    fn measure(&self, handle: TextHandle) -> Vec2 {
        let Some(label) = self.label(handle) else {
            return Vec2::ZERO;
        };
        let columns = label
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let rows = label.text.lines().count();
        Vec2::new(
            columns as f32 * Self::CHAR_ADVANCE,
            rows as f32 * Self::LINE_HEIGHT,
        )
    }

    fn set_visible(&mut self, handle: TextHandle, visible: bool) {
        if let Some(label) = self.label_mut(handle) {
            label.visible = visible;
        }
    }

    fn release(&mut self, handle: TextHandle) {
        if let Some(label) = self.label_mut(handle) {
            label.visible = false;
            label.released = true;
        }
    }
}
