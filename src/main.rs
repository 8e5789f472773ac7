use anyhow::Context;
use winit::event_loop::{ControlFlow, EventLoop};

use glbvis::app::AppHandler;
use glbvis::settings::Settings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = Settings::load().with_args(std::env::args());
    log::info!("Model: {}", settings.asset.model_url);

    let runtime = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;

    let event_loop = EventLoop::new().context("failed to create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new(settings, runtime);
    event_loop
        .run_app(&mut handler)
        .context("event loop terminated with an error")?;

    Ok(())
}
