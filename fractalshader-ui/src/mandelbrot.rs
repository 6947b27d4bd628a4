//! Mandelbrot shader asset and its uniform interface.

use fractalshader_gl::{GlError, GraphicsContext, ShaderProgram, UniformKind, UniformSchema};
use std::rc::Rc;

pub const VERTEX_SHADER: &str = r#"
    precision highp float;

    attribute vec4 aVertexPosition;
    uniform vec2 uScreenSize;

    varying vec2 vPos;

    void main() {
        gl_Position = aVertexPosition;
        float aspect = uScreenSize.y / uScreenSize.x;
        vPos = vec2(gl_Position.x / aspect, gl_Position.y);
    }
"#;

pub const FRAGMENT_SHADER: &str = r#"
    precision highp float;

    const int MAX_ITERATIONS = 10000;
    const float ESCAPE_RADIUS_SQR = 4.0;

    uniform int uIterations;
    uniform vec2 uInitialZ;
    uniform mat3 uViewMat;

    varying vec2 vPos;

    void main() {
        vec3 transformed = uViewMat * vec3(vPos, 1.0);
        vec2 c = transformed.xy;
        vec2 z = uInitialZ;

        int escapeIter = 0;
        for (int i = 1; i < MAX_ITERATIONS; i++) {
            if (i > uIterations) {
                break;
            }
            z = vec2(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + c;
            if (dot(z, z) > ESCAPE_RADIUS_SQR) {
                escapeIter = i;
                break;
            }
        }

        if (escapeIter == 0) {
            gl_FragColor = vec4(0.0, 0.0, 0.0, 1.0);
        } else {
            float lightness = pow(float(escapeIter) / float(uIterations), 0.25);
            gl_FragColor = vec4(lightness, 0.0, lightness, 1.0);
        }
    }
"#;

pub const U_SCREEN_SIZE: &str = "uScreenSize";
pub const U_ITERATIONS: &str = "uIterations";
pub const U_INITIAL_Z: &str = "uInitialZ";
pub const U_VIEW_MAT: &str = "uViewMat";

pub fn mandelbrot_schema() -> UniformSchema {
    UniformSchema::new()
        .with(U_SCREEN_SIZE, UniformKind::Vec2)
        .with(U_ITERATIONS, UniformKind::Int)
        .with(U_INITIAL_Z, UniformKind::Vec2)
        .with(U_VIEW_MAT, UniformKind::Mat3)
}

pub fn create_mandelbrot_program<C: GraphicsContext>(
    ctx: Rc<C>,
) -> Result<ShaderProgram<C>, GlError> {
    log::debug!("Creating Mandelbrot shader program");
    ShaderProgram::new(ctx, VERTEX_SHADER, FRAGMENT_SHADER, &mandelbrot_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalshader_gl::RecordingContext;

    #[test]
    fn shader_declares_every_schema_uniform() {
        let ctx = Rc::new(RecordingContext::new());
        let program = match create_mandelbrot_program(Rc::clone(&ctx)) {
            Ok(program) => program,
            Err(e) => panic!("Mandelbrot program should build: {e}"),
        };

        for (name, kind) in mandelbrot_schema().iter() {
            assert_eq!(program.uniform_kind(name), Some(kind), "{name}");
        }
        assert_eq!(ctx.live_handle_count(), 3);
    }
}
