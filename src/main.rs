use std::sync::Arc;

use sol_vk::vk_renderer::renderer::Renderer;
use sol_vk::vk_renderer::Vk;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("failed to render the sun: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let vk = Arc::new(Vk::new()?);
    let renderer = Renderer::new(vk)?;

    let frame = renderer.draw()?;
    frame.save("sun.png")?;
    log::info!("wrote sun.png");

    Ok(())
}
