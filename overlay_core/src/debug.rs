use std::sync::OnceLock;

/// Diagnostics toggled through the environment, read once per process.
#[derive(Debug, Default)]
pub struct DebugConfig {
    log_picks: bool,
    force_labels: bool,
    fold_ratio_override: Option<f32>,
}

impl DebugConfig {
    fn from_env() -> Self {
        let log_picks = std::env::var("OVERLAY_LOG_PICKS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let force_labels = std::env::var("OVERLAY_FORCE_LABELS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let fold_ratio_override = std::env::var("OVERLAY_FOLD_RATIO")
            .ok()
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|ratio| *ratio > 0.0 && *ratio <= 1.0);

        Self {
            log_picks,
            force_labels,
            fold_ratio_override,
        }
    }

    pub fn log_picks(&self) -> bool {
        self.log_picks
    }

    pub fn force_labels(&self) -> bool {
        self.force_labels
    }

    pub fn fold_ratio_override(&self) -> Option<f32> {
        self.fold_ratio_override
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

pub fn config() -> &'static DebugConfig {
    static CONFIG: OnceLock<DebugConfig> = OnceLock::new();
    CONFIG.get_or_init(DebugConfig::from_env)
}
