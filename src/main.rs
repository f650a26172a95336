use winit::event_loop::{ControlFlow, EventLoop};

use firlight::config::TreeConfig;
use firlight::error::AppError;
use firlight::window::App;

fn main() -> Result<(), AppError> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(TreeConfig::default());
    event_loop.run_app(&mut app)?;
    Ok(())
}
