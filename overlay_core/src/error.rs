use thiserror::Error;

use crate::shape::ShapeId;

/// Failures raised while drawing one target. The session logs these and drops
/// the remainder of that target's frame; they never reach the host loop.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("shape {shape} is missing {detail}")]
    MissingShapeData { shape: ShapeId, detail: String },
    #[error("shape {shape} has invalid data: {detail}")]
    InvalidShapeData { shape: ShapeId, detail: String },
    #[error("world transform for shape {shape} is not finite")]
    InvalidTransform { shape: ShapeId },
    #[error("{handler} overlay failed: {source}")]
    HandlerFailed {
        handler: &'static str,
        #[source]
        source: Box<OverlayError>,
    },
}
