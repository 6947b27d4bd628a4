//! Shader runtime error types.

use crate::context::ShaderStage;
use crate::uniforms::UniformKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GlError {
    #[error("Failed to initialize graphics context: {0}")]
    ContextUnavailable(String),

    #[error("Failed to create {0}")]
    ResourceCreation(&'static str),

    #[error("Failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("Failed to link shader: {0}")]
    Link(String),

    #[error("Failed to find attribute '{0}'")]
    MissingAttribute(String),

    #[error("Failed to find uniform '{0}'")]
    MissingUniform(String),

    #[error("Shader program belongs to a different graphics context")]
    ForeignProgram,

    #[error("Tried to set unknown uniform '{0}'")]
    UnknownUniform(String),

    #[error("Uniform '{name}' is declared as {declared} but was given a {provided} value")]
    UniformKindMismatch {
        name: String,
        declared: UniformKind,
        provided: UniformKind,
    },
}
