//! Per-frame overlay geometry for block shapes: mount point footprints,
//! airtightness faces, port markers, rotation-limit sectors and the floating
//! labels that annotate them. Nothing here rasterizes; every pass emits
//! primitive requests into a [`render::PrimitiveSink`] and text updates into a
//! [`render::TextBackend`] supplied by the host.

pub mod arc;
pub mod basis;
pub mod config;
pub mod debug;
pub mod error;
pub mod fold;
pub mod handlers;
pub mod headless;
pub mod labels;
pub mod palette;
pub mod picker;
pub mod render;
pub mod session;
pub mod shape;
pub mod target;
pub mod translate;
pub mod volume;

pub use arc::{ArcFrame, ArcGeometry, ArcOptions, ArcResult, ArcSweep, generate_arc};
pub use basis::{Basis, Direction, FaceAxis};
pub use config::{LabelToggles, OverlayMode, OverlaySettings};
pub use error::OverlayError;
pub use fold::DepthFolder;
pub use handlers::{HandlerContext, HandlerRegistry, SpecializedOverlay};
pub use headless::{HeadlessText, Primitive, PrimitiveLog};
pub use labels::{LabelCache, LabelCategory, LabelGate, LabelRequest, LabelSlot, LabelText};
pub use picker::ClosestPicker;
pub use render::{BlendMode, BoxStyle, Color, Material, Paint, PrimitiveSink, TextBackend};
pub use session::{DrawSession, FrameInput, FrameReport};
pub use shape::{ShapeCatalog, ShapeDescriptor, ShapeId, ShapeProvider};
pub use target::{Placement, TargetInstance};
pub use volume::{OrientedBox, Ray};
