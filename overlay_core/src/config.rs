use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::debug;
use crate::fold::DEFAULT_FOLD_RATIO;
use crate::labels::{LabelGate, LabelStyle};

/// Which overlay the session draws. Owned by the host; the session only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    #[default]
    Off,
    Airtightness,
    /// Mount points plus the shape's specialized overlay, if one is registered.
    MountPoints,
    Ports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LabelToggles {
    pub mount_points: bool,
    pub ports: bool,
    pub rotation_limits: bool,
    pub airtightness: bool,
}

impl Default for LabelToggles {
    fn default() -> Self {
        Self {
            mount_points: true,
            ports: true,
            rotation_limits: true,
            airtightness: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub mode: OverlayMode,
    pub labels: LabelToggles,
    pub alt_held: bool,
    pub force_labels: bool,
    pub always_on_top: bool,
    pub fold_ratio: f32,
    pub arc_step_deg: i32,
    pub line_thickness: f32,
    pub label_line_height: f32,
    pub label_scale: f32,
    pub label_shadows: bool,
    pub door_closed_seals: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            mode: OverlayMode::Off,
            labels: LabelToggles::default(),
            alt_held: false,
            force_labels: false,
            always_on_top: true,
            fold_ratio: DEFAULT_FOLD_RATIO,
            arc_step_deg: 5,
            line_thickness: 0.02,
            label_line_height: 0.6,
            label_scale: 0.12,
            label_shadows: true,
            door_closed_seals: false,
        }
    }
}

impl OverlaySettings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("reading overlay settings {}", path.display()))?;
        let settings = serde_json::from_slice(&data)
            .with_context(|| format!("parsing overlay settings {}", path.display()))?;
        Ok(settings)
    }

    /// Ratio handed to the depth folder; `1.0` when always-on-top is off.
    pub fn effective_fold_ratio(&self) -> f32 {
        if !self.always_on_top {
            return 1.0;
        }
        debug::config()
            .fold_ratio_override()
            .unwrap_or(self.fold_ratio)
    }

    pub fn label_style(&self) -> LabelStyle {
        LabelStyle {
            scale: self.label_scale,
            line_thickness: self.line_thickness,
            shadows: self.label_shadows,
        }
    }

    pub fn label_gate(&self) -> LabelGate {
        LabelGate {
            toggles: self.labels,
            alt_held: self.alt_held,
            force: self.force_labels || debug::config().force_labels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preset_keeps_defaults() {
        let settings: OverlaySettings = serde_json::from_str(
            r#"{ "mode": "mount_points", "labels": { "ports": false }, "arc_step_deg": 10 }"#,
        )
        .expect("settings");
        assert_eq!(settings.mode, OverlayMode::MountPoints);
        assert!(!settings.labels.ports);
        assert!(settings.labels.mount_points);
        assert_eq!(settings.arc_step_deg, 10);
        assert_eq!(settings.fold_ratio, DEFAULT_FOLD_RATIO);
    }

    #[test]
    fn fold_ratio_is_identity_without_always_on_top() {
        let settings = OverlaySettings {
            always_on_top: false,
            ..OverlaySettings::default()
        };
        assert_eq!(settings.effective_fold_ratio(), 1.0);
    }

    #[test]
    fn settings_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "mode": "ports", "alt_held": true }"#).expect("write");
        let settings = OverlaySettings::load(&path).expect("load");
        assert_eq!(settings.mode, OverlayMode::Ports);
        assert!(settings.alt_held);
    }
}
