//! Cube demo: a procedurally generated cube rotating on a timer.

use anyhow::Result;
use app::args::CliArgs;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CliArgs::from_env().window_config("Cube Demo");
    log::info!(
        "Starting cube demo. Backend: {:?}, window_size={}x{}",
        config.backends,
        config.width,
        config.height
    );

    platform::run_cube_demo(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
