//! CLI command implementations

use crate::output::{to_json, to_table, OutputFormat};
use crate::script;
use console::style;
use kino_quality::{
    ContainerFormat, CookieJar, FileStore, MediaElement, PlaybackController, PlayerConfig,
    PlayerEvent, QualityStore, SimulatedMedia, SourceClassifier, SourceDescriptor,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::Tabled;
use tracing::info;

#[derive(Debug, Serialize, Tabled)]
struct QualityRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Representative")]
    path: String,
    #[tabled(rename = "Type")]
    source_type: String,
}

fn parse_format(prefer: &str) -> ContainerFormat {
    match prefer.to_lowercase().as_str() {
        "mp4" => ContainerFormat::Mp4,
        "webm" => ContainerFormat::Webm,
        other => ContainerFormat::Other(other.to_string()),
    }
}

/// Classify a source list
pub fn classify(path: &Path, prefer: &str, accept: &[String], format: &str) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)?;
    let mut sources: Vec<SourceDescriptor> = serde_json::from_str(&contents)?;

    let engine = if accept.is_empty() {
        SimulatedMedia::new()
    } else {
        let prefixes: Vec<&str> = accept.iter().map(String::as_str).collect();
        SimulatedMedia::supporting(&prefixes)
    };

    let classifier = SourceClassifier::new(parse_format(prefer));
    let map = classifier.classify(&mut sources, |t| engine.can_play_type(t));
    info!(sources = sources.len(), qualities = map.len(), "Classification finished");

    let rows: Vec<QualityRow> = map
        .iter()
        .map(|(name, quality)| QualityRow {
            name: name.to_string(),
            label: quality.label.clone(),
            path: quality.representative.path.clone(),
            source_type: quality.representative.source_type.clone().unwrap_or_default(),
        })
        .collect();

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&rows)),
        OutputFormat::Table => println!("{}", to_table(rows)),
        OutputFormat::Text => {
            println!("Classified {} of {} sources:", count_kept(&sources), sources.len());
            for row in &rows {
                println!("  {} ({}) -> {} [{}]", row.name, row.label, row.path, row.source_type);
            }
            let skipped: Vec<&str> = sources
                .iter()
                .filter(|s| s.quality.is_none())
                .map(|s| s.path.as_str())
                .collect();
            if !skipped.is_empty() {
                println!("\n{}", style("Skipped (unplayable or untyped):").yellow());
                for path in skipped {
                    println!("  - {}", path);
                }
            }
            if map.len() < 2 {
                println!("\nSingle quality: no chooser offered");
            }
        }
    }

    Ok(())
}

fn count_kept(sources: &[SourceDescriptor]) -> usize {
    sources.iter().filter(|s| s.quality.is_some()).count()
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    action: String,
    events: Vec<PlayerEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    quality: Option<String>,
    state: String,
    current_time: f64,
    duration: Option<f64>,
    buffered: f64,
    error: Option<String>,
}

/// Replay a script through a controller over a simulated element
pub async fn simulate(
    config_path: &Path,
    script_path: &Path,
    store: Option<PathBuf>,
    format: &str,
) -> anyhow::Result<()> {
    let config = PlayerConfig::from_path(config_path)?;
    let steps = script::load(script_path)?;

    let store = match store {
        Some(path) => QualityStore::new(Arc::new(FileStore::new(path))),
        None => QualityStore::new(Arc::new(CookieJar::new())),
    };

    let mut controller = PlaybackController::from_config(config, SimulatedMedia::new(), store);
    let mut rx = controller.subscribe();
    controller.ready();

    let mut reports = Vec::with_capacity(steps.len() + 1);
    reports.push(StepReport {
        step: 0,
        action: "create".to_string(),
        events: drain(&mut rx),
        note: None,
    });

    for (index, step) in steps.iter().enumerate() {
        let note = script::apply(&mut controller, step).await?;
        reports.push(StepReport {
            step: index + 1,
            action: step.to_string(),
            events: drain(&mut rx),
            note,
        });
    }

    let summary = Summary {
        quality: controller.get_quality().map(str::to_string),
        state: controller.state().to_string(),
        current_time: controller.get_current_time(),
        duration: controller.get_duration(),
        buffered: controller.get_buffered(),
        error: controller.error_message().map(str::to_string),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let value = serde_json::json!({ "steps": reports, "summary": summary });
            println!("{}", to_json(&value));
        }
        OutputFormat::Text | OutputFormat::Table => {
            for report in &reports {
                println!("{:>3}. {}", report.step, report.action);
                for event in &report.events {
                    println!("       {} {:?}", style("->").cyan(), event);
                }
                if let Some(note) = &report.note {
                    println!("       {} {}", style("!!").red(), note);
                }
            }
            println!("\nFinal state:");
            println!("  Quality: {}", summary.quality.as_deref().unwrap_or("none"));
            println!("  State: {}", summary.state);
            println!("  Position: {:.2}s", summary.current_time);
            if let Some(duration) = summary.duration {
                println!("  Duration: {:.2}s", duration);
            }
            println!("  Buffered: {:.1}%", summary.buffered);
            if let Some(error) = &summary.error {
                println!("  Error: {}", style(error).red());
            }
        }
    }

    Ok(())
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Read or write the stored preference
pub fn preference(path: &Path, set: Option<&str>, format: &str) -> anyhow::Result<()> {
    let store = QualityStore::new(Arc::new(FileStore::new(path)));

    if let Some(name) = set {
        store.set(name);
    }
    let current = store.get();

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!("{}", to_json(&serde_json::json!({ "quality": current })));
        }
        OutputFormat::Text | OutputFormat::Table => match current {
            Some(name) => println!("Preferred quality: {}", style(name).green()),
            None => println!("No preferred quality stored in {}", path.display()),
        },
    }

    Ok(())
}
