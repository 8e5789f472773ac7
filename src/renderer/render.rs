use egui_wgpu::ScreenDescriptor;
use nalgebra_glm as glm;

use crate::model::DecodedMesh;
use crate::renderer::camera::CameraState;
use crate::renderer::renderer::{DrawUniform, FrameUniform, Renderer};
use crate::scene::Environment;

/// Everything the scene pass needs for one frame.
pub struct FrameInput<'a> {
    pub camera: &'a CameraState,
    pub environment: &'a Environment,
    /// The loaded model and its placement, once visible.
    pub model: Option<(&'a DecodedMesh, glm::Mat4)>,
    /// Contact shadow placement and opacity.
    pub shadow: Option<(glm::Mat4, f32)>,
}

/// GPU buffers to bind for one draw; indices into the renderer's meshes.
enum DrawSource {
    Quad,
    Primitive { mesh: usize, primitive: usize },
}

fn vec4(v: &glm::Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

impl Renderer {
    pub fn render(
        &mut self,
        frame: &FrameInput<'_>,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        // Skip rendering if window size is invalid (minimized, not ready, etc.)
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(());
        }

        let env = frame.environment;
        let uniform = FrameUniform {
            view_proj: frame.camera.view_proj(self.aspect()).into(),
            camera_pos: vec4(&frame.camera.position, 1.0),
            light: vec4(&env.light_dir, env.light_intensity),
            sky: vec4(&env.sky_color, 1.0),
            ground_ambient: vec4(&env.ground_ambient, 1.0),
            key: vec4(&env.key_dir, env.key_strength),
        };
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        // Opaque draws first (ground, then model), the blended shadow last
        let ground = &env.ground;
        let mut opaque = vec![(
            DrawUniform::new(
                &env.ground_matrix(),
                [ground.color[0], ground.color[1], ground.color[2], 1.0],
                [ground.metalness, ground.roughness, 0.0, 0.0],
            ),
            DrawSource::Quad,
        )];

        if let Some((mesh, placement)) = &frame.model {
            let world = mesh.world_matrices(placement);
            for (node, matrix) in mesh.nodes.iter().zip(&world) {
                let (Some(mesh_index), Some(matrix)) = (node.mesh, matrix) else {
                    continue;
                };
                let Some(gpu_mesh) = self.meshes.get(mesh_index) else {
                    continue;
                };
                for (primitive, gpu) in gpu_mesh.primitives.iter().enumerate() {
                    opaque.push((
                        DrawUniform::for_material(matrix, &gpu.material),
                        DrawSource::Primitive {
                            mesh: mesh_index,
                            primitive,
                        },
                    ));
                }
            }
        }

        let shadow = frame.shadow.map(|(matrix, opacity)| {
            DrawUniform::new(&matrix, [0.0, 0.0, 0.0, 1.0], [0.0, 0.0, env.shadow.blur, opacity])
        });

        let draw_count = opaque.len() + usize::from(shadow.is_some());
        self.ensure_draw_capacity(draw_count);
        let stride = self.draw_stride as usize;
        let mut staging = vec![0u8; stride * draw_count];
        for (i, draw) in opaque.iter().map(|(d, _)| d).chain(shadow.iter()).enumerate() {
            let bytes = bytemuck::bytes_of(draw);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.draw_buffer, 0, &staging);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: env.background[0] as f64,
                            g: env.background[1] as f64,
                            b: env.background[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.set_pipeline(&self.mesh_pipeline);

            for (i, (_, source)) in opaque.iter().enumerate() {
                let gpu = match source {
                    DrawSource::Quad => &self.quad,
                    DrawSource::Primitive { mesh, primitive } => {
                        &self.meshes[*mesh].primitives[*primitive]
                    }
                };
                let offset = (i * stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }

            if shadow.is_some() {
                let offset = (opaque.len() * stride) as wgpu::DynamicOffset;
                render_pass.set_pipeline(&self.shadow_pipeline);
                render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.quad.index_count, 0, 0..1);
            }
        }

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut egui_rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_rpass, &paint_jobs, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
