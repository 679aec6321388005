mod demo;
mod logging;
mod persistence;

use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::Terminal);

    let script = std::env::args().nth(1).map(PathBuf::from);
    let store = Arc::new(persistence::FileSettingsStore::new(".outline_settings.ron"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(demo::run(script.as_deref(), store))
}
