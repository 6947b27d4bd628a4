//! Linked GPU program with a validated uniform interface.

use crate::context::{GraphicsContext, ShaderStage};
use crate::error::GlError;
use crate::uniforms::{UniformKind, UniformSchema, UniformValue, UniformValues};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Vertex attribute every program must declare for the full-screen quad.
pub const VERTEX_POSITION_ATTRIBUTE: &str = "aVertexPosition";

struct ResolvedUniform<L> {
    location: L,
    kind: UniformKind,
}

/// A linked vertex + fragment program and its resolved uniform locations.
///
/// Owns three GPU handles (two shader stages and the program) and releases
/// them on drop. [`ShaderProgram::destroy`] consumes the program, so it cannot
/// be released twice or used afterwards.
pub struct ShaderProgram<C: GraphicsContext> {
    ctx: Rc<C>,
    vertex_shader: C::Shader,
    fragment_shader: C::Shader,
    program: C::Program,
    vertex_position: u32,
    schema: UniformSchema,
    uniforms: BTreeMap<String, ResolvedUniform<C::UniformLocation>>,
}

impl<C: GraphicsContext> ShaderProgram<C> {
    /// Compiles both stages, links them and resolves the attribute and every
    /// uniform named in `schema`.
    ///
    /// Any failure releases the handles created so far before returning.
    pub fn new(
        ctx: Rc<C>,
        vertex_source: &str,
        fragment_source: &str,
        schema: &UniformSchema,
    ) -> Result<Self, GlError> {
        log::debug!("Creating shader program ({} uniforms)", schema.len());

        let vertex_shader = compile_shader(ctx.as_ref(), ShaderStage::Vertex, vertex_source)?;
        let fragment_shader =
            match compile_shader(ctx.as_ref(), ShaderStage::Fragment, fragment_source) {
                Ok(shader) => shader,
                Err(e) => {
                    ctx.delete_shader(&vertex_shader);
                    return Err(e);
                }
            };

        let Some(program) = ctx.create_program() else {
            ctx.delete_shader(&vertex_shader);
            ctx.delete_shader(&fragment_shader);
            return Err(GlError::ResourceCreation("shader program"));
        };

        // From here on, dropping `linked` on an error path releases all three handles.
        let mut linked = Self {
            ctx,
            vertex_shader,
            fragment_shader,
            program,
            vertex_position: 0,
            schema: schema.clone(),
            uniforms: BTreeMap::new(),
        };

        linked.link()?;
        linked.vertex_position = linked.resolve_attribute(VERTEX_POSITION_ATTRIBUTE)?;
        linked.resolve_uniforms()?;

        Ok(linked)
    }

    fn link(&self) -> Result<(), GlError> {
        let ctx = self.ctx.as_ref();
        ctx.attach_shader(&self.program, &self.vertex_shader);
        ctx.attach_shader(&self.program, &self.fragment_shader);
        ctx.link_program(&self.program);

        if !ctx.program_link_status(&self.program) {
            let log = ctx.program_info_log(&self.program);
            log::warn!("Shader link failed: {log}");
            return Err(GlError::Link(log));
        }
        Ok(())
    }

    fn resolve_attribute(&self, name: &str) -> Result<u32, GlError> {
        self.ctx
            .attrib_location(&self.program, name)
            .ok_or_else(|| GlError::MissingAttribute(name.to_string()))
    }

    fn resolve_uniforms(&mut self) -> Result<(), GlError> {
        for (name, kind) in self.schema.iter() {
            let location = self
                .ctx
                .uniform_location(&self.program, name)
                .ok_or_else(|| GlError::MissingUniform(name.to_string()))?;
            self.uniforms
                .insert(name.to_string(), ResolvedUniform { location, kind });
        }
        Ok(())
    }

    /// Writes uniform values, binding this program first.
    ///
    /// The whole submission is checked before anything is written: an unknown
    /// name or a value whose kind differs from the declared one rejects the
    /// call and leaves every uniform as it was.
    pub fn set_uniform_values(&self, values: &UniformValues) -> Result<(), GlError> {
        let mut writes = Vec::with_capacity(values.len());
        for (name, value) in values.iter() {
            let uniform = self
                .uniforms
                .get(name)
                .ok_or_else(|| GlError::UnknownUniform(name.to_string()))?;
            if value.kind() != uniform.kind {
                return Err(GlError::UniformKindMismatch {
                    name: name.to_string(),
                    declared: uniform.kind,
                    provided: value.kind(),
                });
            }
            writes.push((&uniform.location, value));
        }

        let ctx = self.ctx.as_ref();
        ctx.use_program(Some(&self.program));
        for (location, value) in writes {
            match value {
                UniformValue::Float(x) => ctx.uniform_1f(location, *x),
                UniformValue::Int(x) => ctx.uniform_1i(location, *x),
                UniformValue::Vec2([x, y]) => ctx.uniform_2f(location, *x, *y),
                UniformValue::Vec3([x, y, z]) => ctx.uniform_3f(location, *x, *y, *z),
                UniformValue::Vec4([x, y, z, w]) => ctx.uniform_4f(location, *x, *y, *z, *w),
                UniformValue::Mat2(m) => ctx.uniform_matrix_2fv(location, m),
                UniformValue::Mat3(m) => ctx.uniform_matrix_3fv(location, m),
                UniformValue::Mat4(m) => ctx.uniform_matrix_4fv(location, m),
            }
        }
        Ok(())
    }

    pub fn schema(&self) -> &UniformSchema {
        &self.schema
    }

    pub fn uniform_kind(&self, name: &str) -> Option<UniformKind> {
        self.uniforms.get(name).map(|u| u.kind)
    }

    /// Resolved location of [`VERTEX_POSITION_ATTRIBUTE`].
    pub fn vertex_position_location(&self) -> u32 {
        self.vertex_position
    }

    pub fn context(&self) -> &Rc<C> {
        &self.ctx
    }

    pub(crate) fn handle(&self) -> &C::Program {
        &self.program
    }

    /// Releases the program and both shader stages.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<C: GraphicsContext> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        log::debug!("Destroying shader program");
        self.ctx.delete_program(&self.program);
        self.ctx.delete_shader(&self.vertex_shader);
        self.ctx.delete_shader(&self.fragment_shader);
    }
}

fn compile_shader<C: GraphicsContext>(
    ctx: &C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, GlError> {
    let shader = ctx
        .create_shader(stage)
        .ok_or(GlError::ResourceCreation("shader"))?;
    ctx.shader_source(&shader, source);
    ctx.compile_shader(&shader);

    if !ctx.shader_compile_status(&shader) {
        let log = ctx.shader_info_log(&shader);
        ctx.delete_shader(&shader);
        log::warn!("Failed to compile {stage} shader: {log}");
        return Err(GlError::Compile { stage, log });
    }

    Ok(shader)
}
