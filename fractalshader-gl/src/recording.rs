//! In-memory [`GraphicsContext`] that records every call.
//!
//! Used to test the runtime without a GPU. Besides logging calls it behaves
//! like a tiny driver:
//! - compiling scans `attribute` and `uniform` declarations out of the source,
//!   and fails on a `#error` directive;
//! - linking merges the declarations of the attached stages, and can be told
//!   to fail once with a given log;
//! - uniform writes only land when the owning program is bound, otherwise
//!   they count as invalid operations;
//! - deleting a handle that is not alive counts as a double release.

use crate::context::{DrawMode, GraphicsContext, ShaderStage};
use crate::uniforms::UniformValue;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FakeUniformLocation {
    pub program: ProgramId,
    pub name: String,
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, ShaderId),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    /// Any uniform write; the variant reflects which write call was used.
    Uniform { name: String, value: UniformValue },
    CreateBuffer(BufferId),
    BindArrayBuffer(Option<BufferId>),
    BufferData(Vec<f32>),
    DeleteBuffer(BufferId),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    VertexAttribPointer {
        location: u32,
        components: i32,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    DrawArrays {
        mode: DrawMode,
        first: i32,
        count: i32,
    },
}

struct FakeShader {
    source: String,
    compiled: bool,
    info_log: String,
    stage: ShaderStage,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<ShaderId>,
    linked: bool,
    info_log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    calls: Vec<GlCall>,
    shaders: BTreeMap<ShaderId, FakeShader>,
    programs: BTreeMap<ProgramId, FakeProgram>,
    buffers: BTreeMap<BufferId, Vec<f32>>,
    current_program: Option<ProgramId>,
    current_buffer: Option<BufferId>,
    uniform_values: BTreeMap<(ProgramId, String), UniformValue>,
    double_releases: usize,
    invalid_operations: usize,
    fail_next_link: Option<String>,
    fail_next_program_creation: bool,
    fail_next_buffer_creation: bool,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct RecordingContext {
    lost: bool,
    size: (i32, i32),
    state: RefCell<State>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::with_size(800, 600)
    }

    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            lost: false,
            size: (width, height),
            state: RefCell::new(State::default()),
        }
    }

    /// A context that reports itself lost.
    pub fn lost() -> Self {
        Self {
            lost: true,
            ..Self::new()
        }
    }

    /// The next `link_program` fails with `info_log`.
    pub fn fail_next_link(&self, info_log: impl Into<String>) {
        self.state.borrow_mut().fail_next_link = Some(info_log.into());
    }

    /// The next `create_program` returns `None`.
    pub fn fail_next_program_creation(&self) {
        self.state.borrow_mut().fail_next_program_creation = true;
    }

    /// The next `create_buffer` returns `None`.
    pub fn fail_next_buffer_creation(&self) {
        self.state.borrow_mut().fail_next_buffer_creation = true;
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_handle_count(&self) -> usize {
        self.live_shader_count() + self.live_program_count() + self.live_buffer_count()
    }

    pub fn double_release_count(&self) -> usize {
        self.state.borrow().double_releases
    }

    /// Calls the real API would reject, such as a uniform write to an unbound program.
    pub fn invalid_operation_count(&self) -> usize {
        self.state.borrow().invalid_operations
    }

    pub fn bound_program(&self) -> Option<ProgramId> {
        self.state.borrow().current_program
    }

    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.state.borrow().current_buffer
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<f32>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Last value written to `name` in `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniform_values
            .get(&(program, name.to_string()))
            .copied()
    }

    /// Every program ever created, live or not, in creation order.
    pub fn created_programs(&self) -> Vec<ProgramId> {
        self.count_calls(|call| match call {
            GlCall::CreateProgram(id) => Some(*id),
            _ => None,
        })
    }

    /// Every shader ever created, in creation order.
    pub fn created_shaders(&self) -> Vec<ShaderId> {
        self.count_calls(|call| match call {
            GlCall::CreateShader(_, id) => Some(*id),
            _ => None,
        })
    }

    pub fn source_of(&self, shader: ShaderId) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.source.clone())
    }

    pub fn draw_count(&self) -> usize {
        self.count_calls(|call| matches!(call, GlCall::DrawArrays { .. }).then_some(()))
            .len()
    }

    fn count_calls<T>(&self, f: impl Fn(&GlCall) -> Option<T>) -> Vec<T> {
        self.state.borrow().calls.iter().filter_map(f).collect()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn write_uniform(&self, location: &FakeUniformLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::Uniform {
            name: location.name.clone(),
            value,
        });
        if state.current_program != Some(location.program) {
            state.invalid_operations += 1;
            return;
        }
        state
            .uniform_values
            .insert((location.program, location.name.clone()), value);
    }
}

/// Names declared with `keyword` (e.g. `uniform highp vec2 uCenter;`).
fn declared_names(source: &str, keyword: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            // Declarations can follow a function body within the same statement.
            let statement = statement
                .rsplit(|c: char| c == '{' || c == '}')
                .next()
                .unwrap_or(statement);
            let mut tokens = statement.split_whitespace();
            if tokens.next() != Some(keyword) {
                return None;
            }
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

fn error_directive(source: &str) -> Option<String> {
    source.lines().enumerate().find_map(|(i, line)| {
        let message = line.trim().strip_prefix("#error")?;
        Some(format!("ERROR: 0:{}: '#error' : {}", i + 1, message.trim()))
    })
}

impl GraphicsContext for RecordingContext {
    type Shader = ShaderId;
    type Program = ProgramId;
    type Buffer = BufferId;
    type UniformLocation = FakeUniformLocation;

    fn is_context_lost(&self) -> bool {
        self.lost
    }

    fn drawing_buffer_size(&self) -> (i32, i32) {
        self.size
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<ShaderId> {
        let mut state = self.state.borrow_mut();
        let id = ShaderId(state.next_id());
        state.shaders.insert(
            id,
            FakeShader {
                source: String::new(),
                compiled: false,
                info_log: String::new(),
                stage,
                attributes: Vec::new(),
                uniforms: Vec::new(),
            },
        );
        state.calls.push(GlCall::CreateShader(stage, id));
        Some(id)
    }

    fn shader_source(&self, shader: &ShaderId, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: &ShaderId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::CompileShader(*shader));
        let Some(s) = state.shaders.get_mut(shader) else {
            state.invalid_operations += 1;
            return;
        };
        match error_directive(&s.source) {
            Some(log) => {
                s.compiled = false;
                s.info_log = log;
            }
            None => {
                s.compiled = true;
                s.info_log.clear();
                s.attributes = declared_names(&s.source, "attribute");
                s.uniforms = declared_names(&s.source, "uniform");
            }
        }
    }

    fn shader_compile_status(&self, shader: &ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: &ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: &ShaderId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DeleteShader(*shader));
        if state.shaders.remove(shader).is_none() {
            state.double_releases += 1;
        }
    }

    fn create_program(&self) -> Option<ProgramId> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_program_creation) {
            return None;
        }
        let id = ProgramId(state.next_id());
        state.programs.insert(id, FakeProgram::default());
        state.calls.push(GlCall::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: &ProgramId, shader: &ShaderId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::AttachShader(*program, *shader));
        match state.programs.get_mut(program) {
            Some(p) => p.attached.push(*shader),
            None => state.invalid_operations += 1,
        }
    }

    fn link_program(&self, program: &ProgramId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::LinkProgram(*program));
        let forced_failure = state.fail_next_link.take();

        let Some(attached) = state.programs.get(program).map(|p| p.attached.clone()) else {
            state.invalid_operations += 1;
            return;
        };

        let mut attributes = Vec::new();
        let mut uniforms = Vec::new();
        let mut stages = Vec::new();
        for id in &attached {
            if let Some(s) = state.shaders.get(id).filter(|s| s.compiled) {
                stages.push(s.stage);
                if s.stage == ShaderStage::Vertex {
                    attributes.extend(s.attributes.iter().cloned());
                }
                for name in &s.uniforms {
                    if !uniforms.contains(name) {
                        uniforms.push(name.clone());
                    }
                }
            }
        }

        let failure = forced_failure.or_else(|| {
            let has_both = stages.contains(&ShaderStage::Vertex)
                && stages.contains(&ShaderStage::Fragment);
            (!has_both).then(|| "ERROR: missing compiled vertex or fragment shader".to_string())
        });

        if let Some(p) = state.programs.get_mut(program) {
            match failure {
                Some(log) => {
                    p.linked = false;
                    p.info_log = log;
                }
                None => {
                    p.linked = true;
                    p.info_log.clear();
                    p.attributes = attributes;
                    p.uniforms = uniforms;
                }
            }
        }
    }

    fn program_link_status(&self, program: &ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: &ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: &ProgramId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DeleteProgram(*program));
        if state.programs.remove(program).is_none() {
            state.double_releases += 1;
        }
        if state.current_program == Some(*program) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program: Option<&ProgramId>) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::UseProgram(program.copied()));
        match program {
            Some(id) if !state.programs.get(id).is_some_and(|p| p.linked) => {
                state.invalid_operations += 1;
            }
            _ => state.current_program = program.copied(),
        }
    }

    fn attrib_location(&self, program: &ProgramId, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let p = state.programs.get(program).filter(|p| p.linked)?;
        p.attributes
            .iter()
            .position(|a| a == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, program: &ProgramId, name: &str) -> Option<FakeUniformLocation> {
        let state = self.state.borrow();
        let p = state.programs.get(program).filter(|p| p.linked)?;
        p.uniforms
            .iter()
            .any(|u| u == name)
            .then(|| FakeUniformLocation {
                program: *program,
                name: name.to_string(),
            })
    }

    fn uniform_1f(&self, location: &FakeUniformLocation, x: f32) {
        self.write_uniform(location, UniformValue::Float(x));
    }

    fn uniform_1i(&self, location: &FakeUniformLocation, x: i32) {
        self.write_uniform(location, UniformValue::Int(x));
    }

    fn uniform_2f(&self, location: &FakeUniformLocation, x: f32, y: f32) {
        self.write_uniform(location, UniformValue::Vec2([x, y]));
    }

    fn uniform_3f(&self, location: &FakeUniformLocation, x: f32, y: f32, z: f32) {
        self.write_uniform(location, UniformValue::Vec3([x, y, z]));
    }

    fn uniform_4f(&self, location: &FakeUniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.write_uniform(location, UniformValue::Vec4([x, y, z, w]));
    }

    fn uniform_matrix_2fv(&self, location: &FakeUniformLocation, data: &[f32; 4]) {
        self.write_uniform(location, UniformValue::Mat2(*data));
    }

    fn uniform_matrix_3fv(&self, location: &FakeUniformLocation, data: &[f32; 9]) {
        self.write_uniform(location, UniformValue::Mat3(*data));
    }

    fn uniform_matrix_4fv(&self, location: &FakeUniformLocation, data: &[f32; 16]) {
        self.write_uniform(location, UniformValue::Mat4(*data));
    }

    fn create_buffer(&self) -> Option<BufferId> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_next_buffer_creation) {
            return None;
        }
        let id = BufferId(state.next_id());
        state.buffers.insert(id, Vec::new());
        state.calls.push(GlCall::CreateBuffer(id));
        Some(id)
    }

    fn bind_array_buffer(&self, buffer: Option<&BufferId>) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::BindArrayBuffer(buffer.copied()));
        match buffer {
            Some(id) if !state.buffers.contains_key(id) => state.invalid_operations += 1,
            _ => state.current_buffer = buffer.copied(),
        }
    }

    fn buffer_data_static(&self, data: &[f32]) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::BufferData(data.to_vec()));
        let Some(id) = state.current_buffer else {
            state.invalid_operations += 1;
            return;
        };
        if let Some(contents) = state.buffers.get_mut(&id) {
            *contents = data.to_vec();
        }
    }

    fn delete_buffer(&self, buffer: &BufferId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DeleteBuffer(*buffer));
        if state.buffers.remove(buffer).is_none() {
            state.double_releases += 1;
        }
        if state.current_buffer == Some(*buffer) {
            state.current_buffer = None;
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_color_buffer(&self) {
        self.record(GlCall::Clear);
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::VertexAttribPointer {
            location,
            components,
            stride,
            offset,
        });
        if state.current_buffer.is_none() {
            state.invalid_operations += 1;
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray(location));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::DrawArrays { mode, first, count });
        if state.current_program.is_none() {
            state.invalid_operations += 1;
        }
    }
}
