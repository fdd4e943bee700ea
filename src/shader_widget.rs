//! Shader widget that hosts the cube renderer inside the iced window.
//!
//! The driver pushes into a [`ShaderFeed`]; each frame the view turns the feed
//! into a [`CubeProgram`], whose primitive carries the latest snapshot and
//! uniforms to the GPU. Pointer dragging is turned back into messages so the
//! driver stays the only owner of the camera.

use std::sync::Arc;

use iced::widget::shader::{self, wgpu};
use iced::{Rectangle, event, mouse};

use crate::Message;
use crate::app::{FrameUniforms, RenderBackend};
use crate::cube::CubeSnapshot;
use crate::input::DragState;
use crate::renderer::Renderer;

/// Latest state handed over by the driver.
#[derive(Debug, Clone)]
pub(crate) struct ShaderFeed {
    shader_source: Arc<str>,
    snapshot: Option<Arc<CubeSnapshot>>,
    /// Bumped on every snapshot upload
    generation: u64,
    uniforms: Option<FrameUniforms>,
}

impl ShaderFeed {
    pub(crate) fn new(shader_source: impl Into<Arc<str>>) -> Self {
        Self {
            shader_source: shader_source.into(),
            snapshot: None,
            generation: 0,
            uniforms: None,
        }
    }

    /// Builds the widget program for the current frame, once the driver has
    /// uploaded a snapshot and produced a frame.
    pub(crate) fn program(&self) -> Option<CubeProgram> {
        let snapshot = self.snapshot.as_ref()?;
        let uniforms = self.uniforms?;
        Some(CubeProgram {
            primitive: CubePrimitive {
                shader_source: Arc::clone(&self.shader_source),
                snapshot: Arc::clone(snapshot),
                generation: self.generation,
                uniforms,
            },
        })
    }
}

impl RenderBackend for ShaderFeed {
    fn upload_state(&mut self, snapshot: &CubeSnapshot) {
        self.snapshot = Some(Arc::new(snapshot.clone()));
        self.generation += 1;
        log::debug!("Queued cube snapshot generation {}", self.generation);
    }

    fn update_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.uniforms = Some(*uniforms);
    }
}

/// Primitive carrying one frame to the GPU.
#[derive(Debug, Clone)]
pub(crate) struct CubePrimitive {
    shader_source: Arc<str>,
    snapshot: Arc<CubeSnapshot>,
    generation: u64,
    uniforms: FrameUniforms,
}

impl shader::Primitive for CubePrimitive {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        storage: &mut shader::Storage,
        bounds: &Rectangle,
        viewport: &shader::Viewport,
    ) {
        if !storage.has::<Renderer>() {
            storage.store(Renderer::new(device, format, &self.shader_source));
        }
        let Some(renderer) = storage.get_mut::<Renderer>() else {
            return;
        };

        let area = *bounds * viewport.scale_factor() as f32;
        renderer.upload_cubelets(queue, &self.snapshot, self.generation);
        renderer.update_uniforms(queue, &self.uniforms, area);
    }

    fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        storage: &shader::Storage,
        target: &wgpu::TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        if let Some(renderer) = storage.get::<Renderer>() {
            renderer.render(encoder, target, clip_bounds);
        }
    }
}

/// The shader program drawn by the viewport widget.
pub(crate) struct CubeProgram {
    primitive: CubePrimitive,
}

impl shader::Program<Message> for CubeProgram {
    type State = DragState;
    type Primitive = CubePrimitive;

    fn update(
        &self,
        state: &mut Self::State,
        event: shader::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
        _shell: &mut iced::advanced::Shell<'_, Message>,
    ) -> (event::Status, Option<Message>) {
        let shader::Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };

        match mouse_event {
            mouse::Event::ButtonPressed(DragState::BUTTON) => {
                if let Some(position) = cursor.position_over(bounds) {
                    state.press(Some(position));
                    return (event::Status::Captured, None);
                }
            }
            mouse::Event::ButtonReleased(DragState::BUTTON) => {
                if state.is_pressed {
                    state.release();
                    return (event::Status::Captured, None);
                }
            }
            mouse::Event::CursorMoved { position } => {
                if let Some((delta_x, delta_y)) = state.motion(position) {
                    return (
                        event::Status::Captured,
                        Some(Message::CameraDrag(delta_x, delta_y)),
                    );
                }
            }
            mouse::Event::WheelScrolled { delta } => {
                if cursor.position_over(bounds).is_some() {
                    let scroll_delta = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y,
                        mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                    };
                    return (event::Status::Captured, Some(Message::Zoom(scroll_delta)));
                }
            }
            _ => {}
        }

        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        _cursor: mouse::Cursor,
        _bounds: Rectangle,
    ) -> Self::Primitive {
        self.primitive.clone()
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.is_pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
