//! Scripted host simulation.
//!
//! Plays a conversation script against a ChatGPT-shaped page the way the
//! host application would: user turns appear one by one while the outline
//! session watches, then the demo exercises both navigation modes and
//! prints what the overlay shows at each step.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use outline_core::NavigationMode;
use outline_engine::{
    ElementData, Gesture, OutlineSession, OverlaySettings, Page, Rect, SessionCommand,
    SettingsStore, WatchTiming,
};
use outline_logging::outline_info;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScriptTurn {
    text: String,
    #[serde(default = "default_delay")]
    delay_ms: u64,
}

fn default_delay() -> u64 {
    250
}

const DEFAULT_SCRIPT: &str = r#"[
  { "text": "How do I parse command line arguments in Rust?" },
  { "text": "Can you show the same thing with subcommands?" },
  { "text": "```\nfn main() {\n    let args = std::env::args();\n}\n```\nWhy does this not compile with clap derive?" },
  { "text": "多线程环境下应该怎么处理这个解析结果？" },
  { "text": "Thanks! One more: how do I test a parser like this?" }
]"#;

/// Demo timings are tighter than the production defaults so a full run
/// finishes in a few seconds.
fn demo_settings() -> OverlaySettings {
    OverlaySettings {
        startup_settle: Duration::from_millis(200),
        watch: WatchTiming {
            debounce: Duration::from_millis(150),
            address_poll: Duration::from_millis(100),
            address_settle: Duration::from_millis(200),
        },
        ..OverlaySettings::default()
    }
}

pub async fn run(
    script_path: Option<&Path>,
    store: Arc<dyn SettingsStore>,
) -> anyhow::Result<()> {
    let script = load_script(script_path)?;
    println!(
        "chat outline demo — {} turns, started {}",
        script.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let page = Page::new("https://chatgpt.com/c/demo");
    let main = page
        .insert_element(page.root_id(), ElementData::new("main"))
        .context("demo page lost its root")?;

    let session = OutlineSession::start(page.clone(), store, demo_settings())?;

    for (row, turn) in script.iter().enumerate() {
        tokio::time::sleep(Duration::from_millis(turn.delay_ms)).await;
        page.insert_element(
            main,
            ElementData::new("div")
                .with_attr("data-message-author-role", "user")
                .with_text(&turn.text)
                .with_rect(Rect::new(0.0, row as f64 * 220.0, 600.0, 180.0)),
        );
        outline_info!("host appended turn {}", row + 1);
    }

    // Let the final debounce window close before reading the outline.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snapshot = session.snapshot().await.context("session gone")?;
    println!("\n[list mode] outline after {} extraction passes:", snapshot.pass);
    for (index, title) in snapshot.titles.iter().enumerate() {
        println!("  {}. {title}", index + 1);
    }

    println!("\nclicking entry 3, then switching to precision mode...");
    session.gesture(Gesture::PanelEntry { index: 2 });
    session.command(SessionCommand::SettingsChanged {
        mode: Some(NavigationMode::Precision),
        panel_position: None,
    });

    session.gesture(Gesture::Wheel { delta: 1 });
    session.gesture(Gesture::Wheel { delta: 1 });
    session.gesture(Gesture::TrackClick { fraction: 0.95 });
    let snapshot = session.snapshot().await.context("session gone")?;
    if let Some(state) = snapshot.scrollbar {
        println!(
            "[precision mode] active message {} of {}, handle at {:.0}% of track",
            state.active_index + 1,
            snapshot.titles.len(),
            state.handle_position * 100.0
        );
    }
    println!("page scrolled to {:.0}px", page.viewport().scroll_top);

    session.shutdown().await;
    println!("session shut down, overlay removed");
    Ok(())
}

fn load_script(path: Option<&Path>) -> anyhow::Result<Vec<ScriptTurn>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {path:?}"))?,
        None => DEFAULT_SCRIPT.to_owned(),
    };
    serde_json::from_str(&content).context("script is not a JSON array of turns")
}
