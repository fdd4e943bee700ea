//! GPU rendering for the raymarched cube.
//!
//! Draws one full-screen quad inside the widget bounds. All the geometry lives
//! in the fragment shader, which reads the cubelet lattice and the per-frame
//! parameters from two uniform buffers.

use iced::Rectangle;
use iced::widget::shader::wgpu::{self, CommandEncoder, Device, Queue, TextureFormat, TextureView};
use wgpu::util::DeviceExt;

use crate::app::FrameUniforms;
use crate::cube::{CUBELET_COUNT, CubeSnapshot};

/// Full-screen quad in NDC
const QUAD_VERTICES: &[[f32; 2]] = &[
    [-1.0, -1.0], // bottom-left
    [1.0, -1.0],  // bottom-right
    [1.0, 1.0],   // top-right
    [-1.0, 1.0],  // top-left
];
const QUAD_INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

/// Per-frame parameters as laid out in the shader's `Uniforms` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct UniformsRaw {
    /// Size of the drawing area in physical pixels
    resolution: [f32; 2],
    /// Top-left corner of the drawing area in physical pixels
    origin: [f32; 2],
    time: f32,
    cam_yaw: f32,
    cam_pitch: f32,
    cam_distance: f32,
    selection: [f32; 2],
    anim_angle: f32,
    anim_axis: i32,
    anim_slice: i32,
    expansion: f32,
    _padding: [f32; 2],
    target_center: [f32; 4],
}

impl UniformsRaw {
    pub(crate) fn new(uniforms: &FrameUniforms, area: Rectangle<f32>) -> Self {
        let [cx, cy, cz] = uniforms.target_center;
        Self {
            resolution: [area.width, area.height],
            origin: [area.x, area.y],
            time: uniforms.time,
            cam_yaw: uniforms.cam_yaw,
            cam_pitch: uniforms.cam_pitch,
            cam_distance: uniforms.cam_distance,
            selection: uniforms.selection,
            anim_angle: uniforms.anim_angle,
            anim_axis: uniforms.anim_axis,
            anim_slice: uniforms.anim_slice,
            expansion: uniforms.expansion,
            _padding: [0.0; 2],
            target_center: [cx, cy, cz, 1.0],
        }
    }
}

/// One cubelet as laid out in the shader's `Cubelet` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CubeletRaw {
    position: [f32; 4],
    /// Orientation rows, each padded to a `vec4`
    rows: [[f32; 4]; 3],
}

/// Packs a snapshot into the layout the shader reads.
pub(crate) fn pack_cubelets(snapshot: &CubeSnapshot) -> [CubeletRaw; CUBELET_COUNT] {
    let pad = |[x, y, z]: [f32; 3]| [x, y, z, 0.0];
    std::array::from_fn(|i| CubeletRaw {
        position: pad(snapshot.positions[i]),
        rows: snapshot.orientations[i].map(pad),
    })
}

/// GPU renderer for the cube.
#[derive(Debug)]
pub(crate) struct Renderer {
    /// Physical-pixel area of the target to draw into
    area: Rectangle<f32>,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    cubelet_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Generation of the last snapshot written to `cubelet_buffer`
    uploaded_generation: Option<u64>,
}

impl Renderer {
    /// Creates the pipeline and buffers. `shader_source` must define
    /// `vs_main` and `fs_main`.
    pub(crate) fn new(device: &Device, format: TextureFormat, shader_source: &str) -> Self {
        log::debug!("Creating cube renderer for {format:?}");

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[<UniformsRaw as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let cubelet_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cubelet Buffer"),
            contents: bytemuck::cast_slice(
                &[<CubeletRaw as bytemuck::Zeroable>::zeroed(); CUBELET_COUNT],
            ),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0), uniform_entry(1)],
            label: Some("Cube Bind Group Layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: cubelet_buffer.as_entire_binding(),
                },
            ],
            label: Some("Cube Bind Group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raymarch Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Raymarch Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Raymarch Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            area: Rectangle {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            },
            pipeline,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            cubelet_buffer,
            bind_group,
            uploaded_generation: None,
        }
    }

    /// Writes the full lattice unless this generation is already on the GPU.
    pub(crate) fn upload_cubelets(&mut self, queue: &Queue, snapshot: &CubeSnapshot, generation: u64) {
        if self.uploaded_generation == Some(generation) {
            return;
        }
        queue.write_buffer(
            &self.cubelet_buffer,
            0,
            bytemuck::cast_slice(&pack_cubelets(snapshot)),
        );
        self.uploaded_generation = Some(generation);
        log::debug!("Uploaded cube snapshot generation {generation}");
    }

    /// Writes this frame's parameters. `area` is in physical pixels.
    pub(crate) fn update_uniforms(
        &mut self,
        queue: &Queue,
        uniforms: &FrameUniforms,
        area: Rectangle<f32>,
    ) {
        self.area = area;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[UniformsRaw::new(uniforms, area)]),
        );
    }

    /// Draws the cube into `target`, clipped to `clip_bounds`.
    pub(crate) fn render(
        &self,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        clip_bounds: &Rectangle<u32>,
    ) {
        if self.area.width < 1.0 || self.area.height < 1.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Raymarch Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Only the widget area is drawn
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(
            self.area.x,
            self.area.y,
            self.area.width,
            self.area.height,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(
            clip_bounds.x,
            clip_bounds.y,
            clip_bounds.width,
            clip_bounds.height,
        );
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::CubeState;

    #[test]
    fn test_gpu_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<UniformsRaw>(), 80);
        assert_eq!(std::mem::offset_of!(UniformsRaw, selection), 32);
        assert_eq!(std::mem::offset_of!(UniformsRaw, target_center), 64);
        assert_eq!(std::mem::size_of::<CubeletRaw>(), 64);
    }

    #[test]
    fn test_pack_cubelets() {
        let mut cube = CubeState::new();
        cube.apply_rotation(2, 1, 1).unwrap();
        let packed = pack_cubelets(&cube.snapshot());

        // Cubelet created at (1, -1, 1)
        let raw = packed[20];
        assert_eq!(raw.position, [1.0, 1.0, 1.0, 0.0]);
        assert_eq!(raw.rows[0], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(raw.rows[2], [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_uniforms_carry_area() {
        let uniforms = FrameUniforms {
            time: 1.5,
            cam_yaw: 0.2,
            cam_pitch: -0.1,
            cam_distance: 8.0,
            selection: [2.0, -1.0],
            anim_angle: 0.5,
            anim_axis: 2,
            anim_slice: -1,
            expansion: 2.0,
            target_center: [0.0; 3],
        };
        let area = Rectangle {
            x: 10.0,
            y: 20.0,
            width: 300.0,
            height: 200.0,
        };
        let raw = UniformsRaw::new(&uniforms, area);
        assert_eq!(raw.resolution, [300.0, 200.0]);
        assert_eq!(raw.origin, [10.0, 20.0]);
        assert_eq!(raw.anim_slice, -1);
        assert_eq!(raw.target_center, [0.0, 0.0, 0.0, 1.0]);
    }
}
