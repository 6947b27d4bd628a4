//! The stateful graphics API the runtime drives.
//!
//! The underlying API keeps a current program binding and a current array
//! buffer binding. Nothing in this crate assumes either survives between
//! calls: every operation re-binds what it needs before issuing work.

use std::fmt;

/// Which pipeline stage a shader object belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Primitive topology for `draw_arrays`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
}

/// A GPU context with WebGL 1 semantics.
///
/// Creation methods return `None` when the API hands back a null object.
/// Handles are owned by the caller, which must release each one exactly once
/// through the matching `delete_*` call.
pub trait GraphicsContext {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    /// True when the context can no longer be used (e.g. the GPU was reset).
    fn is_context_lost(&self) -> bool;

    /// Size of the drawing buffer in pixels.
    fn drawing_buffer_size(&self) -> (i32, i32);

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: Option<&Self::Program>);

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn uniform_1f(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_1i(&self, location: &Self::UniformLocation, x: i32);
    fn uniform_2f(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4f(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    /// Column-major, never transposed.
    fn uniform_matrix_2fv(&self, location: &Self::UniformLocation, data: &[f32; 4]);
    fn uniform_matrix_3fv(&self, location: &Self::UniformLocation, data: &[f32; 9]);
    fn uniform_matrix_4fv(&self, location: &Self::UniformLocation, data: &[f32; 16]);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_array_buffer(&self, buffer: Option<&Self::Buffer>);
    /// Uploads to the currently bound array buffer with static-draw usage.
    fn buffer_data_static(&self, data: &[f32]);
    fn delete_buffer(&self, buffer: &Self::Buffer);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&self);

    /// Float attribute sourced from the currently bound array buffer.
    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, location: u32);
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
}
