//! Collaborator seams. The host supplies a primitive renderer and a floating
//! text renderer; the engine only ever issues requests through these traits.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::basis::FaceAxis;
use crate::volume::OrientedBox;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Moves each channel towards white by `amount` (0..=1), alpha untouched.
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            r: self.r + (1.0 - self.r) * amount,
            g: self.g + (1.0 - self.g) * amount,
            b: self.b + (1.0 - self.b) * amount,
            a: self.a,
        }
    }

    /// Moves each channel towards black by `amount` (0..=1), alpha untouched.
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            r: self.r * keep,
            g: self.g * keep,
            b: self.b * keep,
            a: self.a,
        }
    }

    /// Left/right faces lightened, up/down darkened, forward/back unchanged.
    pub fn tinted_for(self, axis: FaceAxis) -> Self {
        match axis {
            FaceAxis::LeftRight => self.lighten(crate::palette::AXIS_LIGHTEN),
            FaceAxis::UpDown => self.darken(crate::palette::AXIS_DARKEN),
            FaceAxis::ForwardBack => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Square,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Standard,
    Additive,
    PostProcess,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Paint {
    pub material: Material,
    pub color: Color,
    pub blend: BlendMode,
}

impl Paint {
    pub const fn solid(color: Color) -> Self {
        Self {
            material: Material::Square,
            color,
            blend: BlendMode::PostProcess,
        }
    }

    /// Round additive marker, used for point primitives.
    pub const fn glow(color: Color) -> Self {
        Self {
            material: Material::Dot,
            color,
            blend: BlendMode::Additive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxStyle {
    Solid,
    Wireframe,
}

/// Receives world-space primitive requests. Every call is independent; the
/// implementation decides batching.
pub trait PrimitiveSink {
    fn line(&mut self, from: Vec3, to: Vec3, thickness: f32, paint: Paint);
    fn triangle(&mut self, corners: [Vec3; 3], paint: Paint);
    fn quad(&mut self, corners: [Vec3; 4], paint: Paint);
    fn oriented_box(&mut self, volume: &OrientedBox, style: BoxStyle, thickness: f32, paint: Paint);
    fn point(&mut self, at: Vec3, radius: f32, paint: Paint);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Right,
}

/// World-anchored placement for one persistent text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub origin: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub scale: f32,
    pub align: TextAlign,
    pub color: Color,
}

/// Persistent floating text objects owned by the host.
pub trait TextBackend {
    fn create(&mut self, capacity: usize) -> TextHandle;
    fn set_text(&mut self, handle: TextHandle, text: &str);
    fn place(&mut self, handle: TextHandle, placement: &TextPlacement);
    /// Rendered extent of the current text at scale 1.0.
    fn measure(&self, handle: TextHandle) -> Vec2;
    fn set_visible(&mut self, handle: TextHandle, visible: bool);
    fn release(&mut self, handle: TextHandle);
}
