mod bounds;
mod mesh;
mod node;
mod view;

pub use bounds::*;
pub use mesh::*;
pub use node::*;
pub use view::{LoadOutcome, ModelView};
