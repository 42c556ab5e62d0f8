pub mod vk_renderer;

pub use vulkano::*;
pub use vulkano_shaders::*;
