//! WebGL 1 backend for the browser.

use crate::context::{DrawMode, GraphicsContext, ShaderStage};
use crate::error::GlError;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader,
    WebGlUniformLocation,
};

/// A `webgl` context acquired from a canvas.
pub struct WebGlContext {
    gl: Gl,
}

impl WebGlContext {
    /// Acquires the canvas's WebGL context. There is no fallback if the
    /// browser refuses.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, GlError> {
        let gl = canvas
            .get_context("webgl")
            .map_err(|e| GlError::ContextUnavailable(format!("{e:?}")))?
            .ok_or_else(|| GlError::ContextUnavailable("webgl is not supported".to_string()))?
            .dyn_into::<Gl>()
            .map_err(|_| GlError::ContextUnavailable("unexpected context type".to_string()))?;

        log::info!(
            "Acquired WebGL context ({}x{})",
            gl.drawing_buffer_width(),
            gl.drawing_buffer_height()
        );
        Ok(Self { gl })
    }

    pub fn raw(&self) -> &Gl {
        &self.gl
    }
}

impl GraphicsContext for WebGlContext {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;

    fn is_context_lost(&self) -> bool {
        self.gl.is_context_lost()
    }

    fn drawing_buffer_size(&self) -> (i32, i32) {
        (self.gl.drawing_buffer_width(), self.gl.drawing_buffer_height())
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compile_status(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> String {
        self.gl
            .get_shader_info_log(shader)
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn program_link_status(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> String {
        self.gl
            .get_program_info_log(program)
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    fn delete_program(&self, program: &WebGlProgram) {
        self.gl.delete_program(Some(program));
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        self.gl.use_program(program);
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        // -1 means the attribute is not active
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn uniform_1f(&self, location: &WebGlUniformLocation, x: f32) {
        self.gl.uniform1f(Some(location), x);
    }

    fn uniform_1i(&self, location: &WebGlUniformLocation, x: i32) {
        self.gl.uniform1i(Some(location), x);
    }

    fn uniform_2f(&self, location: &WebGlUniformLocation, x: f32, y: f32) {
        self.gl.uniform2f(Some(location), x, y);
    }

    fn uniform_3f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32) {
        self.gl.uniform3f(Some(location), x, y, z);
    }

    fn uniform_4f(&self, location: &WebGlUniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.gl.uniform4f(Some(location), x, y, z, w);
    }

    fn uniform_matrix_2fv(&self, location: &WebGlUniformLocation, data: &[f32; 4]) {
        self.gl
            .uniform_matrix2fv_with_f32_array(Some(location), false, data);
    }

    fn uniform_matrix_3fv(&self, location: &WebGlUniformLocation, data: &[f32; 9]) {
        self.gl
            .uniform_matrix3fv_with_f32_array(Some(location), false, data);
    }

    fn uniform_matrix_4fv(&self, location: &WebGlUniformLocation, data: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, data);
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_array_buffer(&self, buffer: Option<&WebGlBuffer>) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, buffer);
    }

    fn buffer_data_static(&self, data: &[f32]) {
        self.gl.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(data),
            Gl::STATIC_DRAW,
        );
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear_color_buffer(&self) {
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, stride, offset);
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let mode = match mode {
            DrawMode::Triangles => Gl::TRIANGLES,
            DrawMode::TriangleStrip => Gl::TRIANGLE_STRIP,
        };
        self.gl.draw_arrays(mode, first, count);
    }
}

#[cfg(test)]
mod browser_tests {
    use super::*;
    use crate::{RenderSurface, ShaderProgram, UniformKind, UniformSchema, UniformValues};
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const VERTEX: &str = "attribute vec4 aVertexPosition;\n\
                          void main() { gl_Position = aVertexPosition; }";
    const FRAGMENT: &str = "precision mediump float;\n\
                            uniform float uZoom;\n\
                            void main() { gl_FragColor = vec4(uZoom, 0.0, 0.0, 1.0); }";

    fn canvas() -> HtmlCanvasElement {
        web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into::<HtmlCanvasElement>()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_program_links_and_draws_in_browser() {
        let ctx = Rc::new(WebGlContext::from_canvas(&canvas()).unwrap());
        let mut surface = RenderSurface::new(Rc::clone(&ctx)).unwrap();

        let schema = UniformSchema::new().with("uZoom", UniformKind::Float);
        let program = ShaderProgram::new(Rc::clone(&ctx), VERTEX, FRAGMENT, &schema).unwrap();
        surface.set_program(program).unwrap();

        surface
            .set_uniform_values(&UniformValues::new().with("uZoom", 0.5_f32))
            .unwrap();
        surface.render();
        assert_eq!(ctx.raw().get_error(), Gl::NO_ERROR);
    }

    #[wasm_bindgen_test]
    fn test_compile_error_carries_driver_log() {
        let ctx = Rc::new(WebGlContext::from_canvas(&canvas()).unwrap());
        let result = ShaderProgram::new(ctx, VERTEX, "void main() { oops }", &UniformSchema::new());
        match result {
            Err(GlError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            Err(other) => panic!("expected compile error, got {other}"),
            Ok(_) => panic!("expected compile error"),
        }
    }

    #[wasm_bindgen_test]
    fn test_absent_uniform_fails_construction() {
        let ctx = Rc::new(WebGlContext::from_canvas(&canvas()).unwrap());
        let schema = UniformSchema::new().with("uMissing", UniformKind::Vec2);
        let result = ShaderProgram::new(ctx, VERTEX, FRAGMENT, &schema);
        assert!(matches!(result, Err(GlError::MissingUniform(name)) if name == "uMissing"));
    }
}
