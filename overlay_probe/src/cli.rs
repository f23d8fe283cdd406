use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use overlay_core::OverlayMode;

#[derive(Parser, Debug)]
#[command(
    about = "Headless overlay driver that records primitives for a scene",
    version
)]
pub struct Args {
    /// Shape catalog JSON (`{ "shapes": [...] }`)
    #[arg(long)]
    pub catalog: PathBuf,

    /// Scene JSON describing the camera, aim ray and target or preview transform
    #[arg(long)]
    pub scene: PathBuf,

    /// Optional overlay settings preset; defaults apply when omitted
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Overlay mode to draw instead of the one in the settings preset
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Number of frames to run through the same session
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// When set, write every frame's primitives and visible labels as JSON
    #[arg(long)]
    pub json_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Off,
    Airtightness,
    MountPoints,
    Ports,
}

impl From<ModeArg> for OverlayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Off => OverlayMode::Off,
            ModeArg::Airtightness => OverlayMode::Airtightness,
            ModeArg::MountPoints => OverlayMode::MountPoints,
            ModeArg::Ports => OverlayMode::Ports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flag_uses_kebab_case() {
        let args = Args::try_parse_from([
            "overlay_probe",
            "--catalog",
            "shapes.json",
            "--scene",
            "scene.json",
            "--mode",
            "mount-points",
        ])
        .expect("arguments parse");
        assert_eq!(args.mode.map(OverlayMode::from), Some(OverlayMode::MountPoints));
        assert_eq!(args.frames, 1);
        assert!(args.json_out.is_none());
    }
}
