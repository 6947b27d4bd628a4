//! Shader program runtime: compiles, validates and drives a GPU program
//! through a full-screen quad.

mod context;
mod error;
mod program;
pub mod recording;
mod surface;
mod uniforms;
#[cfg(target_arch = "wasm32")]
mod webgl;

pub use context::{DrawMode, GraphicsContext, ShaderStage};
pub use error::GlError;
pub use program::{ShaderProgram, VERTEX_POSITION_ATTRIBUTE};
pub use recording::RecordingContext;
pub use surface::{
    RenderSurface, SurfaceConfig, FULL_SCREEN_QUAD, QUAD_VERTEX_COMPONENTS, QUAD_VERTEX_COUNT,
};
pub use uniforms::{UniformKind, UniformSchema, UniformValue, UniformValues};
#[cfg(target_arch = "wasm32")]
pub use webgl::WebGlContext;
