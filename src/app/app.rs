use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::window::Window;

use crate::asset::{AssetLoader, LoadRequest};
use crate::model::ModelView;
use crate::renderer::{CameraController, CameraState, ClickGesture, FrameInput, Renderer, project_bounds};
use crate::scene::Environment;
use crate::settings::Settings;
use crate::shell::WindowShell;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    egui_state: State,
    egui_wants_pointer: bool,
    camera_controller: CameraController,
    environment: Environment,
    shell: WindowShell,
    view: ModelView,
    click: ClickGesture,
    current_cursor_pos: Option<(f64, f64)>,
    last_frame: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, settings: Settings, loader: AssetLoader) -> anyhow::Result<Self> {
        let renderer = Renderer::new(window.clone())
            .await
            .context("failed to initialise the renderer")?;

        let egui_ctx = renderer.egui_context();
        let egui_state = State::new(
            egui_ctx,
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let camera_state = CameraState::from_settings(&settings.camera);
        let camera_controller = CameraController::new(
            camera_state,
            settings.camera.damping_factor,
            settings.camera.rotate_speed,
        );
        let environment = Environment::from_settings(&settings.scene);

        // The loader runs as soon as the window exists; the indicator is shown until it finishes
        let shell = WindowShell::new(window.clone());
        let handle = loader.load(LoadRequest::new(settings.asset.model_url.clone()));
        let view = ModelView::new(handle, settings.scene.model_position);

        Ok(Self {
            window,
            renderer,
            egui_state,
            egui_wants_pointer: false,
            camera_controller,
            environment,
            shell,
            view,
            click: ClickGesture::default(),
            current_cursor_pos: None,
            last_frame: Instant::now(),
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);

        match event {
            WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if self.egui_wants_pointer {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                let is_pressed = *state == ElementState::Pressed;
                self.camera_controller.on_mouse_button(*button, is_pressed);

                if *button == MouseButton::Left {
                    match (is_pressed, self.current_cursor_pos) {
                        (true, Some(pos)) => self.click.press(pos),
                        (false, _) => {
                            if self.click.release() && self.view.is_hovered() && self.view.on_click() {
                                log::debug!("Model clicked, restarting animations");
                            }
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = (position.x, position.y);
                self.current_cursor_pos = Some(pos);
                self.click.moved(pos);
                if self.egui_wants_pointer {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                let (_, height) = self.renderer.size();
                self.camera_controller.on_mouse_move(pos, height as f32);
                self.update_hover();
            }
            WindowEvent::CursorLeft { .. } => {
                self.current_cursor_pos = None;
                self.update_hover();
            }
            _ => {}
        }

        EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        }
    }

    /// The pointer is over the model when it lies inside the model's projected bounds.
    fn update_hover(&mut self) {
        let hit = match (self.current_cursor_pos, self.view.world_bounds()) {
            (Some((x, y)), Some(bounds)) => {
                let (width, height) = self.renderer.size();
                let view_proj = self
                    .camera_controller
                    .state()
                    .view_proj(self.renderer.aspect());
                project_bounds(&bounds, &view_proj, (width as f32, height as f32))
                    .is_some_and(|rect| rect.contains(x as f32, y as f32))
            }
            _ => false,
        };
        self.view.set_hovered(hit, &mut self.shell);
    }

    pub fn reconfigure(&mut self) {
        self.renderer.reconfigure();
    }

    pub fn dispose(&mut self) {
        self.view.dispose();
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.view.tick(elapsed, &mut self.shell);

        if let Some(mesh) = self.view.visible_mesh() {
            if !self.renderer.has_model() {
                self.renderer.upload_model(mesh);
            }
        }

        // a finished load or a running clip can move the model under a still pointer
        let camera_moved = self.camera_controller.update();
        if camera_moved || self.view.visible_mesh().is_some() {
            self.update_hover();
        }

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();
        let loading = self.shell.loading();
        let mut full_output = egui_ctx.run(raw_input, |ctx| {
            crate::ui::show_loading(ctx, loading);
        });
        self.egui_wants_pointer = egui_ctx.wants_pointer_input();

        self.shell.cursor().apply_to(&mut full_output.platform_output);
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [self.window.inner_size().width, self.window.inner_size().height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let bounds = self.view.world_bounds();
        let frame = FrameInput {
            camera: self.camera_controller.state(),
            environment: &self.environment,
            model: self.view.visible_mesh().map(|mesh| (mesh, self.view.placement())),
            shadow: self.environment.shadow_under(bounds.as_ref()),
        };

        self.renderer
            .render(&frame, paint_jobs, full_output.textures_delta, screen_descriptor)
    }
}
