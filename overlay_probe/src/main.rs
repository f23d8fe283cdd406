mod cli;
mod scene;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use overlay_core::{
    DrawSession, FrameInput, HandlerRegistry, HeadlessText, OverlayMode, OverlaySettings,
    Primitive, PrimitiveLog, ShapeCatalog, ShapeProvider,
};
use serde::Serialize;

use crate::cli::Args;
use crate::scene::Scene;

#[derive(Debug, Serialize)]
struct FrameDump {
    frame: u32,
    mode: OverlayMode,
    label: Option<String>,
    visible_labels: Vec<String>,
    error: Option<String>,
    primitives: Vec<Primitive>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = ShapeCatalog::load(&args.catalog)?;
    let scene = Scene::load(&args.scene)?;
    let mut settings = match &args.settings {
        Some(path) => OverlaySettings::load(path)?,
        None => OverlaySettings::default(),
    };
    settings.alt_held |= scene.alt_held;

    let shape = catalog.shape(&scene.shape).with_context(|| {
        format!(
            "shape {} not found in {}",
            scene.shape,
            args.catalog.display()
        )
    })?;
    let mode = args.mode.map(OverlayMode::from);
    log::debug!(
        "[overlay_probe] {} frame(s) of {} in {:?} mode",
        args.frames,
        shape.id,
        mode.unwrap_or(settings.mode)
    );

    let mut session = DrawSession::new(HandlerRegistry::with_builtin(), &settings);
    let mut primitives = PrimitiveLog::default();
    let mut text = HeadlessText::default();
    let mut dumps = Vec::new();

    for index in 0..args.frames {
        primitives.clear();
        let mut frame = FrameInput {
            camera: scene.camera_matrix(),
            aim: scene.aim.map(|aim| aim.to_ray()),
            preview: scene.preview_matrix(),
            settings: &settings,
            sink: &mut primitives,
            text: &mut text,
        };
        session.draw(&mut frame, shape, scene.target.as_ref(), mode);

        let report = session.report();
        let label = report
            .label
            .as_deref()
            .map_or_else(|| "none".to_string(), |label| label.replace('\n', " / "));
        println!("frame {index}: {} primitives, label={label}", primitives.len());

        if args.json_out.is_some() {
            dumps.push(FrameDump {
                frame: index,
                mode: report.mode,
                label: report.label.clone(),
                visible_labels: text
                    .visible_texts()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                error: report.error.clone(),
                primitives: primitives.primitives().to_vec(),
            });
        }
    }

    if let Some(path) = &args.json_out {
        let json = serde_json::to_string_pretty(&dumps).context("serializing frame dump")?;
        fs::write(path, json)
            .with_context(|| format!("writing frame dump to {}", path.display()))?;
    }

    session.teardown(&mut text);
    Ok(())
}
