use crate::arc::{ArcFrame, ArcSweep};
use crate::basis::Basis;
use crate::error::OverlayError;
use crate::labels::{LabelSlot, LabelText};
use crate::palette;
use crate::shape::ShapeDescriptor;
use crate::target::TargetInstance;

use super::{HandlerContext, SpecializedOverlay, missing};

/// Yaw sector around the block's up axis and pitch sector around its right
/// axis, both sized one cell past the block's largest half extent.
pub struct TurretOverlay;

impl SpecializedOverlay for TurretOverlay {
    fn name(&self) -> &'static str {
        "turret"
    }

    fn draw(
        &self,
        cx: &mut HandlerContext<'_>,
        shape: &ShapeDescriptor,
        _target: Option<&TargetInstance>,
    ) -> Result<(), OverlayError> {
        let limits = shape.turret.ok_or_else(|| missing(shape, "turret limits"))?;

        let block = Basis::from_matrix(cx.world);
        let center = cx.shape_center(shape);
        let radius = shape.half_extents().max_element() + cx.cell_size;
        let step = cx.settings.arc_step_deg;

        let yaw = ArcFrame {
            center,
            forward: block.forward,
            axis: block.up,
            radius,
        };
        cx.draw_limit_sector(
            &yaw,
            &ArcSweep::from_degrees(limits.min_azimuth_deg, limits.max_azimuth_deg, step),
            palette::ARC_YAW,
            LabelSlot::YawLimit,
            Some(LabelText::Cached("Yaw limit")),
        );

        let pitch = ArcFrame {
            center,
            forward: block.forward,
            axis: block.right,
            radius,
        };
        cx.draw_limit_sector(
            &pitch,
            &ArcSweep::from_degrees(limits.min_elevation_deg, limits.max_elevation_deg, step),
            palette::ARC_PITCH,
            LabelSlot::PitchLimit,
            Some(LabelText::Cached("Pitch limit")),
        );
        Ok(())
    }
}
