//! Raymarched 3x3x3 Rubik's cube.
//!
//! Select a slice with the keyboard, turn it, and orbit the camera with the
//! mouse. The cube is drawn entirely by a fragment shader; this crate keeps the
//! cubelet lattice and feeds it to the GPU. Uses iced for the window and wgpu
//! for rendering.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use iced::widget::{Column, Row, Shader, Space, text};
use iced::{Element, Length, Settings, Size, Subscription, Task, keyboard};

mod app;
mod camera;
mod config;
mod cube;
mod error;
mod input;
mod math;
mod renderer;
mod shader_widget;

use app::Driver;
use config::Config;
use error::Result;
use input::Action;
use shader_widget::ShaderFeed;

const TITLE: &str = "Rubik's Cube";

/// Application state: the driver plus the clock it runs on.
pub(crate) struct RubiksApp {
    driver: Driver<ShaderFeed>,
    start: Instant,
    frame_interval: Duration,
}

/// Messages that the application can receive
#[derive(Debug, Clone)]
pub(crate) enum Message {
    /// Frame tick from the fixed-rate timer
    Tick(Instant),
    Input(Action),
    /// Pointer motion while dragging over the viewport
    CameraDrag(f32, f32),
    Zoom(f32),
}

impl RubiksApp {
    pub(crate) fn new(config: &Config, shader_source: String) -> Self {
        let mut driver = Driver::new(config, ShaderFeed::new(shader_source));
        // The viewport needs one frame of parameters before its first draw.
        driver.frame(0.0);

        Self {
            driver,
            start: Instant::now(),
            frame_interval: config.frame_interval(),
        }
    }

    /// Seconds since startup on the monotonic clock.
    fn seconds_at(&self, instant: Instant) -> f32 {
        instant.saturating_duration_since(self.start).as_secs_f32()
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(instant) => {
                let now = self.seconds_at(instant);
                self.driver.frame(now);
            }
            Message::Input(action) => match action {
                Action::CycleAxis(step) => {
                    self.driver.cycle_axis(step);
                }
                Action::CycleSlice(step) => {
                    self.driver.cycle_slice(step);
                }
                Action::Turn(direction) => {
                    let now = self.seconds_at(Instant::now());
                    self.driver.trigger_move(direction, now);
                }
                Action::Quit => {
                    log::info!("Quit requested");
                    return iced::exit();
                }
            },
            Message::CameraDrag(delta_x, delta_y) => self.driver.drag_camera(delta_x, delta_y),
            Message::Zoom(delta) => self.driver.zoom_camera(delta),
        }

        Task::none()
    }

    pub(crate) fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(self.frame_interval).map(Message::Tick),
            keyboard::on_key_press(|key, modifiers| {
                input::action_for_key(&key, modifiers).map(Message::Input)
            }),
        ])
    }

    pub(crate) fn view(&self) -> Element<'_, Message> {
        let selection = self.driver.selection();
        let status = if self.driver.is_animating() {
            "Turning..."
        } else {
            "Ready"
        };

        // Left pane with selection and controls
        let controls = Column::new()
            .spacing(10)
            .width(250)
            .push(text(format!("Axis: {:?}", selection.axis)))
            .push(text(format!("Slice: {:+}", selection.slice.index())))
            .push(text(status))
            .push(Space::with_height(20))
            .push(text("A / D: select axis"))
            .push(text("W / S: select slice"))
            .push(text("Space / Enter: turn"))
            .push(text("Shift: reverse turn"))
            .push(text("Left drag: orbit, wheel: zoom"))
            .push(text("Esc: quit"));

        // Right pane with the raymarched viewport
        let viewport: Element<'_, Message> = match self.driver.backend().program() {
            Some(program) => Shader::new(program)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => Space::new(Length::Fill, Length::Fill).into(),
        };

        Row::new()
            .spacing(10)
            .padding(10)
            .push(controls)
            .push(viewport)
            .into()
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;
    log::debug!("Using {config:?}");
    let shader_source = config.shader_source()?.into_owned();

    let app = RubiksApp::new(&config, shader_source);
    log::info!(
        "Rubik's cube started. Controls: A/D select axis, W/S select slice, \
         Space/Enter to turn (Shift reverses), drag to orbit."
    );

    iced::application(TITLE, RubiksApp::update, RubiksApp::view)
        .subscription(RubiksApp::subscription)
        .window_size(Size::new(config.window_width, config.window_height))
        .settings(Settings {
            antialiasing: true,
            ..Settings::default()
        })
        .run_with(move || (app, Task::none()))?;

    Ok(())
}

/// Entry point for the cube viewer
fn main() -> ExitCode {
    env_logger::builder().format_timestamp(None).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
