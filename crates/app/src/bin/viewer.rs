//! Model viewer: loads an OBJ (plus materials) and shows it with mouse orbit
//! and wheel zoom.

use anyhow::Result;
use app::args::CliArgs;
use asset::Model;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = CliArgs::from_env();
    let path = cli.model_path();
    let title = format!("OBJ Model Viewer - {}", path.display());
    let config = cli.window_config(&title);
    log::info!(
        "Starting model viewer for {}. Backend: {:?}, window_size={}x{}",
        path.display(),
        config.backends,
        config.width,
        config.height
    );

    // A missing or broken file still opens the window with an empty scene.
    let model = Model::load(&path);
    platform::run_model_viewer(model, config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
