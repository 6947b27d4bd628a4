//! Mandelbrot viewer: a render surface driven by a [`ViewerState`].

use crate::config::FractalConfig;
use crate::mandelbrot::create_mandelbrot_program;
use crate::persistence::PersistedState;
use crate::state::ViewerState;
use fractalshader_gl::{GlError, GraphicsContext, RenderSurface, SurfaceConfig};
use std::rc::Rc;

pub struct Viewer<C: GraphicsContext> {
    surface: RenderSurface<C>,
    config: &'static FractalConfig,
    state: ViewerState,
}

impl<C: GraphicsContext> Viewer<C> {
    /// Builds the surface and installs the Mandelbrot program.
    pub fn new(
        ctx: Rc<C>,
        config: &'static FractalConfig,
        state: ViewerState,
    ) -> Result<Self, GlError> {
        let surface_config = SurfaceConfig {
            background: config.background,
        };
        let mut surface = RenderSurface::with_config(Rc::clone(&ctx), surface_config)?;
        surface.set_program(create_mandelbrot_program(ctx)?)?;

        log::info!("Viewer ready: {}", config.display_name);
        Ok(Self {
            surface,
            config,
            state,
        })
    }

    pub fn config(&self) -> &'static FractalConfig {
        self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn surface(&self) -> &RenderSurface<C> {
        &self.surface
    }

    pub fn reset(&mut self) {
        self.state.reset(self.config);
    }

    /// Snapshot suitable for [`crate::persistence::save_state`].
    pub fn persisted(&self) -> PersistedState {
        PersistedState::new(self.state.clone(), self.config.id.to_string())
    }

    /// Uploads the current state and draws one frame.
    ///
    /// Nothing is drawn if the uniforms are rejected.
    pub fn render_frame(&self) -> Result<(), GlError> {
        self.surface.set_uniform_values(&self.state.uniforms())?;
        self.surface.render();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MANDELBROT_CONFIG;
    use crate::mandelbrot::{U_ITERATIONS, U_VIEW_MAT};
    use fractalshader_core::Vec2;
    use fractalshader_gl::{RecordingContext, UniformValue};

    fn viewer(ctx: &Rc<RecordingContext>) -> Viewer<RecordingContext> {
        match Viewer::new(Rc::clone(ctx), &MANDELBROT_CONFIG, ViewerState::default()) {
            Ok(viewer) => viewer,
            Err(e) => panic!("viewer should build: {e}"),
        }
    }

    #[test]
    fn new_installs_program_and_quad() {
        let ctx = Rc::new(RecordingContext::new());
        let viewer = viewer(&ctx);

        assert!(viewer.surface().has_program());
        assert_eq!(ctx.live_program_count(), 1);
        assert_eq!(ctx.live_buffer_count(), 1);
        assert_eq!(viewer.surface().config().background, MANDELBROT_CONFIG.background);
    }

    #[test]
    fn new_on_lost_context_fails() {
        let ctx = Rc::new(RecordingContext::lost());
        let result = Viewer::new(Rc::clone(&ctx), &MANDELBROT_CONFIG, ViewerState::default());

        assert!(matches!(result, Err(GlError::ContextUnavailable(_))));
        assert_eq!(ctx.live_handle_count(), 0);
    }

    #[test]
    fn link_failure_releases_the_surface() {
        let ctx = Rc::new(RecordingContext::new());
        ctx.fail_next_link("too many uniforms");
        let result = Viewer::new(Rc::clone(&ctx), &MANDELBROT_CONFIG, ViewerState::default());

        assert!(matches!(result, Err(GlError::Link(_))));
        assert_eq!(ctx.live_handle_count(), 0);
        assert_eq!(ctx.double_release_count(), 0);
    }

    #[test]
    fn render_frame_uploads_state_then_draws() {
        let ctx = Rc::new(RecordingContext::new());
        let mut viewer = viewer(&ctx);
        viewer.state_mut().iterations = 321;
        viewer.state_mut().center = Vec2::new(-0.5, 0.25);
        viewer.state_mut().zoom = 0.5;

        viewer.render_frame().unwrap();

        let program = ctx.created_programs()[0];
        assert_eq!(
            ctx.uniform_value(program, U_ITERATIONS),
            Some(UniformValue::Int(321))
        );
        assert_eq!(
            ctx.uniform_value(program, U_VIEW_MAT),
            Some(UniformValue::Mat3([
                0.5, 0.0, 0.0, 0.0, 0.5, 0.0, -0.5, 0.25, 1.0
            ]))
        );
        assert_eq!(ctx.draw_count(), 1);
        assert_eq!(ctx.invalid_operation_count(), 0);
    }

    #[test]
    fn reset_restores_config_defaults() {
        let ctx = Rc::new(RecordingContext::new());
        let mut viewer = viewer(&ctx);
        viewer.state_mut().screen_size = Vec2::new(640.0, 480.0);
        viewer.state_mut().zoom = 1e-6;

        viewer.reset();

        assert_eq!(viewer.state().zoom, MANDELBROT_CONFIG.default_zoom);
        assert_eq!(viewer.state().screen_size, Vec2::new(640.0, 480.0));
    }

    #[test]
    fn persisted_records_config_id() {
        let ctx = Rc::new(RecordingContext::new());
        let viewer = viewer(&ctx);
        let persisted = viewer.persisted();

        assert_eq!(persisted.config_id, "mandelbrot");
        assert_eq!(&persisted.viewer, viewer.state());
    }

    #[test]
    fn dropping_viewer_releases_everything() {
        let ctx = Rc::new(RecordingContext::new());
        drop(viewer(&ctx));

        assert_eq!(ctx.live_handle_count(), 0);
        assert_eq!(ctx.double_release_count(), 0);
    }
}
