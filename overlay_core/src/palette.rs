use crate::render::Color;
use crate::shape::{PortCategory, SealMark};

pub const AXIS_LIGHTEN: f32 = 0.25;
pub const AXIS_DARKEN: f32 = 0.25;

pub const MOUNT_PLAIN: Color = Color::rgba(0.2, 0.95, 0.35, 0.45);
pub const MOUNT_COUPLING: Color = Color::rgba(0.98, 0.74, 0.28, 0.45);
pub const MOUNT_MASKED: Color = Color::rgba(0.95, 0.35, 0.25, 0.45);
pub const MOUNT_GRAYED: Color = Color::rgba(0.5, 0.5, 0.5, 0.3);
pub const MOUNT_AUTO_ROTATE: Color = Color::rgba(1.0, 1.0, 1.0, 0.9);
pub const PICK_HIGHLIGHT: Color = Color::rgba(0.2, 0.95, 0.85, 1.0);

pub const AIRTIGHT_FULL: Color = Color::rgba(0.25, 0.6, 0.95, 0.35);
pub const AIRTIGHT_FACE: Color = Color::rgba(0.25, 0.6, 0.95, 0.55);
pub const AIRTIGHT_DOOR: Color = Color::rgba(0.6, 0.4, 0.95, 0.55);

pub const PORT_CONVEYOR: Color = Color::rgba(0.98, 0.74, 0.28, 0.35);
pub const PORT_INTERACTIVE: Color = Color::rgba(0.25, 0.6, 0.95, 0.35);
pub const PORT_UPGRADE: Color = Color::rgba(0.6, 0.4, 0.95, 0.35);
pub const PORT_UNKNOWN: Color = Color::rgba(0.78, 0.78, 0.78, 0.35);

pub const ARC_YAW: Color = Color::rgba(0.2, 0.85, 0.6, 0.25);
pub const ARC_PITCH: Color = Color::rgba(0.95, 0.45, 0.35, 0.25);
pub const ARC_ROTOR: Color = Color::rgba(0.85, 0.7, 0.25, 0.25);

pub const LABEL_SHADOW: Color = Color::rgba(0.0, 0.0, 0.0, 0.75);

pub fn port_color(category: PortCategory) -> Color {
    match category {
        PortCategory::Conveyor => PORT_CONVEYOR,
        PortCategory::Interactive => PORT_INTERACTIVE,
        PortCategory::Upgrade => PORT_UPGRADE,
        PortCategory::Unknown => PORT_UNKNOWN,
    }
}

pub fn seal_color(mark: SealMark) -> Option<Color> {
    match mark {
        SealMark::Sealed => Some(AIRTIGHT_FACE),
        SealMark::SealedWhenClosed => Some(AIRTIGHT_DOOR),
        SealMark::Open => None,
    }
}

/// Opaque variant of a fill, used for rim lines and wireframes.
pub fn outline(color: Color) -> Color {
    color.with_alpha(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_palettes_are_distinct() {
        let colours = [
            port_color(PortCategory::Conveyor),
            port_color(PortCategory::Interactive),
            port_color(PortCategory::Upgrade),
            port_color(PortCategory::Unknown),
        ];
        for (i, lhs) in colours.iter().enumerate() {
            for rhs in &colours[i + 1..] {
                assert_ne!(lhs, rhs);
            }
        }
    }

    #[test]
    fn open_faces_have_no_colour() {
        assert_eq!(seal_color(SealMark::Open), None);
        assert_eq!(seal_color(SealMark::Sealed), Some(AIRTIGHT_FACE));
        assert_eq!(seal_color(SealMark::SealedWhenClosed), Some(AIRTIGHT_DOOR));
    }

    #[test]
    fn outline_keeps_rgb() {
        let solid = outline(MOUNT_COUPLING);
        assert_eq!(solid.a, 1.0);
        assert_eq!(solid.r, MOUNT_COUPLING.r);
    }
}
