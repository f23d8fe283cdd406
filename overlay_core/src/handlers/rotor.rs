use std::fmt::Write as _;

use crate::arc::{ArcFrame, ArcSweep};
use crate::basis::Basis;
use crate::error::OverlayError;
use crate::labels::{LabelSlot, LabelText};
use crate::palette;
use crate::shape::ShapeDescriptor;
use crate::target::TargetInstance;

use super::{HandlerContext, SpecializedOverlay, missing};

/// Single sector around the block's up axis, labelled with the numeric range.
pub struct RotorOverlay;

impl SpecializedOverlay for RotorOverlay {
    fn name(&self) -> &'static str {
        "rotor"
    }

    fn draw(
        &self,
        cx: &mut HandlerContext<'_>,
        shape: &ShapeDescriptor,
        _target: Option<&TargetInstance>,
    ) -> Result<(), OverlayError> {
        let limits = shape.rotor.ok_or_else(|| missing(shape, "rotor limits"))?;

        let block = Basis::from_matrix(cx.world);
        let frame = ArcFrame {
            center: cx.shape_center(shape),
            forward: block.forward,
            axis: block.up,
            radius: shape.half_extents().max_element() + cx.cell_size,
        };
        let sweep = ArcSweep::from_degrees(limits.lower_deg, limits.upper_deg, cx.settings.arc_step_deg);

        let mut message = std::mem::take(cx.text_buffer);
        message.clear();
        let _ = write!(message, "Limits {}..{}", limits.lower_deg, limits.upper_deg);
        cx.draw_limit_sector(
            &frame,
            &sweep,
            palette::ARC_ROTOR,
            LabelSlot::RotorLimits,
            Some(LabelText::Dynamic(&message)),
        );
        *cx.text_buffer = message;
        Ok(())
    }
}
