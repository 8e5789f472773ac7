pub mod camera;
pub mod picking;
pub mod render;
pub mod renderer;
pub mod vertex;

pub use camera::{CameraController, CameraState};
pub use picking::{ClickGesture, ScreenRect, project_bounds};
pub use render::FrameInput;
pub use renderer::Renderer;
