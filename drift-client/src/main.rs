use std::rc::Rc;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use winit::{
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use drift_core::GLOBAL_CONFIG;

use application::Application;
use client_events::Watching;

mod application;
mod audio;
mod client_events;
mod key_bindings;
mod renderer;
mod score_display;

const START_TITLE: &str = "Drift | press Enter to start";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = GLOBAL_CONFIG.clone();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(START_TITLE)
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)
        .context("failed to open the game window")?;
    let mut application = Application::new(Rc::new(window), settings);

    event_loop.run(move |event, _, control_flow| {
        match event {
            // Window changes
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => application.on_resize(size.width, size.height),

            // X button on window clicked
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => application.close(),

            // Keyboard input
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { input, .. },
                ..
            } => {
                if let Some(key) = input.virtual_keycode {
                    match input.state {
                        ElementState::Pressed => application.on_key_down(key),
                        ElementState::Released => application.on_key_up(key),
                    }
                }
            }

            // Mouse input
            Event::WindowEvent {
                event:
                    WindowEvent::MouseInput {
                        button: MouseButton::Left,
                        state,
                        ..
                    },
                ..
            } => application.on_left_mouse(state),

            // Raw motion keeps working when the cursor leaves the window mid-drag
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                ..
            } => application.on_mouse_motion(dx, dy),

            Event::WindowEvent {
                event: WindowEvent::Touch(touch),
                ..
            } => application.on_touch(touch.id, touch.phase, touch.location.x, touch.location.y),

            // Keys released while unfocused never reach us
            Event::WindowEvent {
                event: WindowEvent::Focused(false),
                ..
            } => application.on_focus_lost(),

            Event::MainEventsCleared => {
                *control_flow = application.update();
            }

            Event::LoopDestroyed => application.close(),

            _ => {}
        }

        if application.is_closed() {
            *control_flow = ControlFlow::Exit;
        }
    })
}
