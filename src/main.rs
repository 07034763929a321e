mod application;
mod input;
mod rendering;

use application::Application;
use input::InputState;

use std::time::{Duration, Instant};

use anyhow::Result;
use glium::glutin::{
    event::{Event, VirtualKeyCode, WindowEvent},
    event_loop::ControlFlow,
};
use log::{error, info};

fn main() -> Result<()> {
    pretty_env_logger::init();

    let (event_loop, display) = rendering::initialize_window();
    let mut app = Application::new(&display)?;
    let mut input = InputState::new();

    info!("Starting event loop");
    let frame_time = Duration::from_nanos(16_666_667);
    let mut last_at = Instant::now();
    event_loop.run(move |ev, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match ev {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                WindowEvent::KeyboardInput { input: event, .. } => {
                    input.process(&event);
                }
                _ => (),
            },
            _ => (),
        }

        if input.key_hit(VirtualKeyCode::Escape) {
            *control_flow = ControlFlow::Exit;
            return;
        }

        let delta = last_at.elapsed();
        if delta < frame_time {
            return;
        }
        last_at = Instant::now();

        app.tick(delta, &input);
        input.end_frame();

        let mut frame = display.draw();
        let drawn = app.draw(&display, &mut frame);
        frame.finish().expect("Failed to finish the frame");
        if let Err(e) = drawn {
            error!("Draw failed: {}", e);
            *control_flow = ControlFlow::Exit;
        }
    });
}
