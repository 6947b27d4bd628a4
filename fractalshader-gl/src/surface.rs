//! Drawing surface: a full-screen quad plus at most one installed program.

use crate::context::{DrawMode, GraphicsContext};
use crate::error::GlError;
use crate::program::ShaderProgram;
use crate::uniforms::UniformValues;
use std::rc::Rc;

/// Two triangles covering clip space, as a 4-vertex triangle strip.
pub const FULL_SCREEN_QUAD: [f32; 8] = [1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0];

/// Components per quad vertex.
pub const QUAD_VERTEX_COMPONENTS: i32 = 2;

/// Vertices in the quad strip.
pub const QUAD_VERTEX_COUNT: i32 = 4;

/// Surface settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// RGBA color the frame is cleared to before drawing.
    pub background: [f32; 4],
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Owns the quad vertex buffer and the currently installed program.
pub struct RenderSurface<C: GraphicsContext> {
    ctx: Rc<C>,
    config: SurfaceConfig,
    position_buffer: C::Buffer,
    program: Option<ShaderProgram<C>>,
}

impl<C: GraphicsContext> RenderSurface<C> {
    pub fn new(ctx: Rc<C>) -> Result<Self, GlError> {
        Self::with_config(ctx, SurfaceConfig::default())
    }

    /// Uploads the quad once. Fails immediately if the context is unusable.
    pub fn with_config(ctx: Rc<C>, config: SurfaceConfig) -> Result<Self, GlError> {
        if ctx.is_context_lost() {
            return Err(GlError::ContextUnavailable("context is lost".to_string()));
        }

        let position_buffer = ctx
            .create_buffer()
            .ok_or(GlError::ResourceCreation("vertex buffer"))?;
        ctx.bind_array_buffer(Some(&position_buffer));
        ctx.buffer_data_static(&FULL_SCREEN_QUAD);

        log::debug!("Render surface created");

        Ok(Self {
            ctx,
            config,
            position_buffer,
            program: None,
        })
    }

    /// Context handle for creating programs that can be installed here.
    pub fn context(&self) -> &Rc<C> {
        &self.ctx
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Installs `program`, destroying the one previously installed.
    ///
    /// The surface owns the program from now on. A program built on another
    /// context is rejected and released there; the installed one stays.
    pub fn set_program(&mut self, program: ShaderProgram<C>) -> Result<(), GlError> {
        if !Rc::ptr_eq(program.context(), &self.ctx) {
            log::warn!("Rejecting shader program created on another context");
            return Err(GlError::ForeignProgram);
        }
        if let Some(previous) = self.program.replace(program) {
            previous.destroy();
        }
        Ok(())
    }

    /// Removes the installed program and hands ownership back to the caller.
    pub fn take_program(&mut self) -> Option<ShaderProgram<C>> {
        self.program.take()
    }

    pub fn program(&self) -> Option<&ShaderProgram<C>> {
        self.program.as_ref()
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Forwards to the installed program. Without one there is nothing to set.
    pub fn set_uniform_values(&self, values: &UniformValues) -> Result<(), GlError> {
        match &self.program {
            Some(program) => program.set_uniform_values(values),
            None => {
                log::debug!("No program installed, ignoring {} uniforms", values.len());
                Ok(())
            }
        }
    }

    /// Clears the frame and, if a program is installed, draws the quad through it.
    pub fn render(&self) {
        let ctx = self.ctx.as_ref();
        let (width, height) = ctx.drawing_buffer_size();
        ctx.viewport(0, 0, width, height);

        let [r, g, b, a] = self.config.background;
        ctx.clear_color(r, g, b, a);
        ctx.clear_color_buffer();

        let Some(program) = &self.program else {
            return;
        };

        ctx.use_program(Some(program.handle()));
        ctx.bind_array_buffer(Some(&self.position_buffer));

        let location = program.vertex_position_location();
        ctx.vertex_attrib_pointer_f32(location, QUAD_VERTEX_COMPONENTS, 0, 0);
        ctx.enable_vertex_attrib_array(location);
        ctx.draw_arrays(DrawMode::TriangleStrip, 0, QUAD_VERTEX_COUNT);
    }

    /// Destroys the installed program, then the quad buffer.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<C: GraphicsContext> Drop for RenderSurface<C> {
    fn drop(&mut self) {
        log::debug!("Destroying render surface");
        if let Some(program) = self.program.take() {
            program.destroy();
        }
        self.ctx.delete_buffer(&self.position_buffer);
    }
}
