//! Viewer state and the uniforms derived from it.

use crate::config::{FractalConfig, MANDELBROT_CONFIG};
use crate::mandelbrot::{U_INITIAL_Z, U_ITERATIONS, U_SCREEN_SIZE, U_VIEW_MAT};
use fractalshader_core::{Mat3, MathError, Vec2};
use fractalshader_gl::UniformValues;
use serde::{Deserialize, Serialize};

/// Pan/zoom state of the viewer.
///
/// Shader space is clip space stretched by the aspect ratio, so x spans
/// `[-width/height, width/height]` and y spans `[-1, 1]`. The view matrix maps
/// it to fractal space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    /// Canvas size in CSS pixels
    pub screen_size: Vec2,
    pub render_scale: f64,
    pub iterations: i32,
    /// Starting value of z (zero gives the classic Mandelbrot set)
    pub initial_z: Vec2,
    pub center: Vec2,
    pub zoom: f64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&MANDELBROT_CONFIG)
    }
}

impl ViewerState {
    pub fn new(config: &FractalConfig) -> Self {
        let (cx, cy) = config.default_center;
        Self {
            screen_size: Vec2::new(1.0, 1.0),
            render_scale: config.default_render_scale,
            iterations: config.default_iterations,
            initial_z: Vec2::ZERO,
            center: Vec2::new(cx, cy),
            zoom: config.default_zoom,
        }
    }

    /// Back to the configured defaults. Screen size is kept.
    pub fn reset(&mut self, config: &FractalConfig) {
        *self = Self {
            screen_size: self.screen_size,
            ..Self::new(config)
        };
    }

    pub fn view_matrix(&self) -> Mat3 {
        Mat3::transformation(self.center, self.zoom)
    }

    /// Resolution the fractal is rendered at.
    pub fn render_size(&self) -> Vec2 {
        self.screen_size.scale(self.render_scale)
    }

    /// Clip-space point to shader space, matching the vertex shader.
    fn clip_to_shader(&self, clip: Vec2) -> Vec2 {
        let size = self.render_size();
        Vec2::new(clip.x * size.x / size.y, clip.y)
    }

    /// The fractal-space point drawn at a clip-space position.
    pub fn clip_to_fractal(&self, clip: Vec2) -> Vec2 {
        self.view_matrix().transform_point(self.clip_to_shader(clip))
    }

    /// Where a fractal-space point lands in clip space.
    ///
    /// Fails when the zoom is zero and the view cannot be inverted.
    pub fn fractal_to_clip(&self, point: Vec2) -> Result<Vec2, MathError> {
        let shader = self.view_matrix().inverse()?.transform_point(point);
        let size = self.render_size();
        Ok(Vec2::new(shader.x * size.y / size.x, shader.y))
    }

    /// Uniform values for the Mandelbrot program.
    pub fn uniforms(&self) -> UniformValues {
        UniformValues::new()
            .with(U_SCREEN_SIZE, self.render_size())
            .with(U_ITERATIONS, self.iterations)
            .with(U_INITIAL_Z, self.initial_z)
            .with(U_VIEW_MAT, self.view_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalshader_gl::UniformValue;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-12, "{:?} != {:?}", a, b);
    }

    #[test]
    fn default_matches_mandelbrot_config() {
        let state = ViewerState::default();
        assert_eq!(state.iterations, 1000);
        assert_eq!(state.center, Vec2::ZERO);
        assert_eq!(state.initial_z, Vec2::ZERO);
        assert_eq!(state.zoom, 1.0);
        assert_eq!(state.render_scale, 1.0);
    }

    #[test]
    fn view_matrix_is_center_and_zoom() {
        let state = ViewerState {
            center: Vec2::new(-0.5, 0.1),
            zoom: 0.25,
            ..ViewerState::default()
        };
        assert_eq!(
            state.view_matrix(),
            Mat3::transformation(Vec2::new(-0.5, 0.1), 0.25)
        );
    }

    #[test]
    fn render_size_applies_scale() {
        let state = ViewerState {
            screen_size: Vec2::new(1920.0, 1080.0),
            render_scale: 0.5,
            ..ViewerState::default()
        };
        assert_eq!(state.render_size(), Vec2::new(960.0, 540.0));
    }

    #[test]
    fn uniforms_cover_the_mandelbrot_schema() {
        let state = ViewerState {
            screen_size: Vec2::new(800.0, 600.0),
            iterations: 250,
            initial_z: Vec2::new(0.1, 0.2),
            center: Vec2::new(-1.0, 0.0),
            zoom: 2.0,
            ..ViewerState::default()
        };
        let uniforms = state.uniforms();

        assert_eq!(uniforms.len(), 4);
        assert_eq!(
            uniforms.get(U_SCREEN_SIZE),
            Some(&UniformValue::Vec2([800.0, 600.0]))
        );
        assert_eq!(uniforms.get(U_ITERATIONS), Some(&UniformValue::Int(250)));
        assert_eq!(
            uniforms.get(U_INITIAL_Z),
            Some(&UniformValue::Vec2([0.1, 0.2]))
        );
        assert_eq!(
            uniforms.get(U_VIEW_MAT),
            Some(&UniformValue::Mat3([
                2.0, 0.0, 0.0, 0.0, 2.0, 0.0, -1.0, 0.0, 1.0
            ]))
        );
    }

    #[test]
    fn reset_restores_defaults_but_keeps_screen_size() {
        let mut state = ViewerState {
            screen_size: Vec2::new(300.0, 200.0),
            render_scale: 2.0,
            iterations: 5,
            initial_z: Vec2::new(1.0, 1.0),
            center: Vec2::new(3.0, 3.0),
            zoom: 1e-9,
        };
        state.reset(&MANDELBROT_CONFIG);

        let expected = ViewerState {
            screen_size: Vec2::new(300.0, 200.0),
            ..ViewerState::default()
        };
        assert_eq!(state, expected);
    }

    #[test]
    fn clip_center_maps_to_view_center() {
        let state = ViewerState {
            screen_size: Vec2::new(1600.0, 900.0),
            center: Vec2::new(-0.75, 0.1),
            zoom: 0.01,
            ..ViewerState::default()
        };
        assert_close(state.clip_to_fractal(Vec2::ZERO), Vec2::new(-0.75, 0.1));
    }

    #[test]
    fn clip_edges_are_aspect_corrected() {
        let state = ViewerState {
            screen_size: Vec2::new(800.0, 400.0),
            ..ViewerState::default()
        };
        assert_close(state.clip_to_fractal(Vec2::new(1.0, 1.0)), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn fractal_to_clip_inverts_clip_to_fractal() {
        let state = ViewerState {
            screen_size: Vec2::new(1024.0, 768.0),
            center: Vec2::new(-0.1, 0.65),
            zoom: 0.003,
            ..ViewerState::default()
        };
        let clip = Vec2::new(0.3, -0.8);
        let back = state
            .fractal_to_clip(state.clip_to_fractal(clip))
            .unwrap();
        assert!((back - clip).length() < 1e-9);
    }

    #[test]
    fn fractal_to_clip_fails_at_zero_zoom() {
        let state = ViewerState {
            zoom: 0.0,
            ..ViewerState::default()
        };
        assert!(state.fractal_to_clip(Vec2::ZERO).is_err());
    }
}
