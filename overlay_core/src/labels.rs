//! Floating labels with a leader line and an underline.
//!
//! Each semantic slot owns one persistent text object (plus an optional shadow
//! copy) that is created on first use and then only updated in place. Cached
//! messages are measured once; dynamic text is re-measured on every draw. The
//! leader line is drawn even when the label gate is closed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec3;

use crate::basis::Basis;
use crate::config::LabelToggles;
use crate::fold::DepthFolder;
use crate::palette::LABEL_SHADOW;
use crate::render::{
    Color, Paint, PrimitiveSink, TextAlign, TextBackend, TextHandle, TextPlacement,
};

pub const DEFAULT_TEXT_CAPACITY: usize = 256;

/// Gap between the leader line end and the text, in text-scale units.
const TEXT_MARGIN: f32 = 0.35;
const SHADOW_OFFSET: f32 = 0.004;
/// Leader lines pointing this far against camera-right put the text on the left.
const FLIP_DOT: f32 = -0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelCategory {
    MountPoints,
    Ports,
    RotationLimits,
    Airtightness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSlot {
    MountPoint,
    Port,
    YawLimit,
    PitchLimit,
    RotorLimits,
    Airtightness,
}

impl LabelSlot {
    pub const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            LabelSlot::MountPoint => 0,
            LabelSlot::Port => 1,
            LabelSlot::YawLimit => 2,
            LabelSlot::PitchLimit => 3,
            LabelSlot::RotorLimits => 4,
            LabelSlot::Airtightness => 5,
        }
    }

    pub fn category(self) -> LabelCategory {
        match self {
            LabelSlot::MountPoint => LabelCategory::MountPoints,
            LabelSlot::Port => LabelCategory::Ports,
            LabelSlot::YawLimit | LabelSlot::PitchLimit | LabelSlot::RotorLimits => {
                LabelCategory::RotationLimits
            }
            LabelSlot::Airtightness => LabelCategory::Airtightness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelText<'a> {
    /// Content that never changes for the slot; measured once.
    Cached(&'static str),
    Dynamic(&'a str),
}

impl LabelText<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            LabelText::Cached(text) => text,
            LabelText::Dynamic(text) => text,
        }
    }
}

/// Decides whether label text may be shown right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelGate {
    pub toggles: LabelToggles,
    pub alt_held: bool,
    pub force: bool,
}

impl LabelGate {
    pub fn can_draw_label(&self, category: LabelCategory) -> bool {
        if self.force || self.alt_held {
            return true;
        }
        match category {
            LabelCategory::MountPoints => self.toggles.mount_points,
            LabelCategory::Ports => self.toggles.ports,
            LabelCategory::RotationLimits => self.toggles.rotation_limits,
            LabelCategory::Airtightness => self.toggles.airtightness,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRequest<'a> {
    pub slot: LabelSlot,
    pub anchor: Vec3,
    pub direction: Vec3,
    pub color: Color,
    pub text: Option<LabelText<'a>>,
    pub line_height: f32,
    pub always_on_top: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub scale: f32,
    pub line_thickness: f32,
    pub shadows: bool,
}

/// Where a label ended up this frame, in (possibly folded) world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub line_end: Vec3,
    pub text_origin: Vec3,
    pub underline_end: Vec3,
    pub flipped: bool,
}

pub struct LabelView<'a> {
    pub camera: &'a Basis,
    pub folder: &'a DepthFolder,
    pub sink: &'a mut dyn PrimitiveSink,
    pub text: &'a mut dyn TextBackend,
}

#[derive(Debug)]
struct LabelEntry {
    text: TextHandle,
    shadow: Option<TextHandle>,
    content_hash: Option<u64>,
    /// Rendered text width at scale 1.0.
    underline: f32,
    visible: bool,
    /// Drawn since the last stale sweep.
    shown: bool,
}

impl LabelEntry {
    fn create(backend: &mut dyn TextBackend, shadows: bool) -> Self {
        let text = backend.create(DEFAULT_TEXT_CAPACITY);
        let shadow = shadows.then(|| backend.create(DEFAULT_TEXT_CAPACITY));
        Self {
            text,
            shadow,
            content_hash: None,
            underline: 0.0,
            visible: false,
            shown: false,
        }
    }

    fn handles(&self) -> impl Iterator<Item = TextHandle> {
        std::iter::once(self.text).chain(self.shadow)
    }
}

fn hide(entry: &mut LabelEntry, backend: &mut dyn TextBackend) {
    if entry.visible {
        for handle in entry.handles() {
            backend.set_visible(handle, false);
        }
        entry.visible = false;
    }
}

fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
pub struct LabelCache {
    entries: [Option<LabelEntry>; LabelSlot::COUNT],
    gate: LabelGate,
    style: LabelStyle,
    any_shown: bool,
}

impl LabelCache {
    pub fn new(style: LabelStyle) -> Self {
        Self {
            entries: Default::default(),
            gate: LabelGate::default(),
            style,
            any_shown: false,
        }
    }

    pub fn set_gate(&mut self, gate: LabelGate) {
        self.gate = gate;
    }

    pub fn set_style(&mut self, style: LabelStyle) {
        self.style = style;
    }

    pub fn can_draw_label(&self, category: LabelCategory) -> bool {
        self.gate.can_draw_label(category)
    }

    pub fn underline_length(&self, slot: LabelSlot) -> Option<f32> {
        self.entries[slot.index()].as_ref().map(|entry| entry.underline)
    }

    pub fn is_visible(&self, slot: LabelSlot) -> bool {
        self.entries[slot.index()]
            .as_ref()
            .is_some_and(|entry| entry.visible)
    }

    pub fn draw_label(
        &mut self,
        view: &mut LabelView<'_>,
        request: &LabelRequest<'_>,
    ) -> Option<LabelPlacement> {
        let style = self.style;
        let direction = request.direction.normalize_or_zero();
        let mut start = request.anchor;
        let mut end = request.anchor + direction * request.line_height;
        let ratio = if request.always_on_top {
            view.folder.fold_point(&mut start);
            view.folder.fold_point(&mut end)
        } else {
            1.0
        };
        let thickness = style.line_thickness * ratio;
        let shadow_shift = (view.camera.right - view.camera.up) * SHADOW_OFFSET * ratio;
        let paint = Paint::solid(request.color);
        let shadow_paint = Paint::solid(LABEL_SHADOW);

        view.sink.line(start, end, thickness, paint);
        if style.shadows {
            view.sink
                .line(start + shadow_shift, end + shadow_shift, thickness, shadow_paint);
        }

        let text = request.text?;
        if !self.gate.can_draw_label(request.slot.category()) {
            return None;
        }

        let entry = self.entries[request.slot.index()]
            .get_or_insert_with(|| LabelEntry::create(view.text, style.shadows));

        let content = text.as_str();
        let hash = content_hash(content);
        let changed = entry.content_hash != Some(hash);
        if changed {
            for handle in entry.handles() {
                view.text.set_text(handle, content);
            }
            entry.content_hash = Some(hash);
        }
        match text {
            LabelText::Cached(_) if !changed => {}
            _ => entry.underline = view.text.measure(entry.text).x,
        }

        let flipped = direction.dot(view.camera.right) <= FLIP_DOT;
        let (side, align) = if flipped {
            (-view.camera.right, TextAlign::Right)
        } else {
            (view.camera.right, TextAlign::Left)
        };
        let scale = style.scale * ratio;
        let margin = TEXT_MARGIN * scale;
        let origin = end + side * margin + view.camera.up * margin;

        view.text.place(
            entry.text,
            &TextPlacement {
                origin,
                right: view.camera.right,
                up: view.camera.up,
                scale,
                align,
                color: request.color,
            },
        );
        if let Some(shadow) = entry.shadow {
            view.text.place(
                shadow,
                &TextPlacement {
                    origin: origin + shadow_shift,
                    right: view.camera.right,
                    up: view.camera.up,
                    scale,
                    align,
                    color: LABEL_SHADOW,
                },
            );
        }
        if !entry.visible {
            for handle in entry.handles() {
                view.text.set_visible(handle, true);
            }
            entry.visible = true;
        }
        entry.shown = true;

        let underline_end = origin + side * entry.underline * scale;
        view.sink.line(origin, underline_end, thickness, paint);
        if style.shadows {
            view.sink.line(
                origin + shadow_shift,
                underline_end + shadow_shift,
                thickness,
                shadow_paint,
            );
        }

        self.any_shown = true;
        Some(LabelPlacement {
            line_end: end,
            text_origin: origin,
            underline_end,
            flipped,
        })
    }

    /// Returns whether any label text was shown since the last call.
    pub fn take_any_shown(&mut self) -> bool {
        std::mem::take(&mut self.any_shown)
    }

    pub fn hide_all(&mut self, backend: &mut dyn TextBackend) {
        for entry in self.entries.iter_mut().flatten() {
            entry.shown = false;
            hide(entry, backend);
        }
    }

    /// Hides every label not drawn since the previous sweep, e.g. the limit
    /// labels of a turret once the viewer moves on to a plain block.
    pub fn hide_stale(&mut self, backend: &mut dyn TextBackend) {
        for entry in self.entries.iter_mut().flatten() {
            if !std::mem::take(&mut entry.shown) {
                hide(entry, backend);
            }
        }
    }

    /// Releases every text object. Slots are recreated lazily if drawn again.
    pub fn teardown(&mut self, backend: &mut dyn TextBackend) {
        for slot in self.entries.iter_mut() {
            if let Some(entry) = slot.take() {
                for handle in entry.handles() {
                    backend.release(handle);
                }
            }
        }
        self.any_shown = false;
    }
}
