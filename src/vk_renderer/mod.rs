pub mod buffer;
pub mod command;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod renderer;
pub mod shaders;
pub mod vk;

pub use vk::*;
