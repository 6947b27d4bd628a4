pub mod config;
pub mod mandelbrot;
pub mod persistence;
pub mod state;
pub mod viewer;

pub use config::{get_config, FractalConfig, DEFAULT_CANVAS_ID, MANDELBROT_CONFIG};
pub use persistence::PersistedState;
pub use state::ViewerState;
pub use viewer::Viewer;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::config::{get_config, FractalConfig, DEFAULT_CANVAS_ID, MANDELBROT_CONFIG};
    use crate::persistence::{clear_state, load_state, save_state};
    use crate::state::ViewerState;
    use crate::viewer::Viewer;
    use fractalshader_core::Vec2;
    use fractalshader_gl::{GlError, WebGlContext};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    fn to_js(e: GlError) -> JsValue {
        js_sys::Error::new(&e.to_string()).into()
    }

    fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document"))?
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("No element with id '{canvas_id}'")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("'{canvas_id}' is not a canvas")))
    }

    /// Restores the last session if it was for the same fractal.
    fn initial_state(config: &FractalConfig) -> ViewerState {
        match load_state() {
            Some(persisted) if persisted.config_id == config.id => persisted.viewer,
            _ => ViewerState::new(config),
        }
    }

    #[wasm_bindgen]
    pub struct FractalViewer {
        canvas: HtmlCanvasElement,
        viewer: Viewer<WebGlContext>,
    }

    #[wasm_bindgen]
    impl FractalViewer {
        /// Attaches to `canvas_id`, or the default canvas when omitted.
        #[wasm_bindgen(constructor)]
        pub fn new(
            canvas_id: Option<String>,
            config_id: Option<String>,
        ) -> Result<FractalViewer, JsValue> {
            let config = config_id
                .as_deref()
                .and_then(get_config)
                .unwrap_or(&MANDELBROT_CONFIG);
            let canvas = find_canvas(canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID))?;
            let ctx = Rc::new(WebGlContext::from_canvas(&canvas).map_err(to_js)?);
            let viewer = Viewer::new(ctx, config, initial_state(config)).map_err(to_js)?;

            let this = Self { canvas, viewer };
            this.sync_canvas_size();
            Ok(this)
        }

        /// Canvas size in CSS pixels. The drawing buffer follows the render scale.
        pub fn set_screen_size(&mut self, width: f64, height: f64) {
            self.viewer.state_mut().screen_size = Vec2::new(width, height);
            self.sync_canvas_size();
        }

        pub fn set_render_scale(&mut self, scale: f64) {
            self.viewer.state_mut().render_scale = scale;
            self.sync_canvas_size();
        }

        pub fn set_view(&mut self, center_x: f64, center_y: f64, zoom: f64) {
            let state = self.viewer.state_mut();
            state.center = Vec2::new(center_x, center_y);
            state.zoom = zoom;
        }

        pub fn set_iterations(&mut self, iterations: i32) {
            self.viewer.state_mut().iterations = iterations;
        }

        pub fn set_initial_z(&mut self, x: f64, y: f64) {
            self.viewer.state_mut().initial_z = Vec2::new(x, y);
        }

        /// Fractal-space point under a clip-space position, as `[x, y]`.
        pub fn clip_to_fractal(&self, x: f64, y: f64) -> Vec<f64> {
            let point = self.viewer.state().clip_to_fractal(Vec2::new(x, y));
            vec![point.x, point.y]
        }

        pub fn reset(&mut self) {
            self.viewer.reset();
            self.sync_canvas_size();
            clear_state();
        }

        pub fn render(&self) -> Result<(), JsValue> {
            self.viewer.render_frame().map_err(to_js)
        }

        pub fn save(&self) {
            save_state(&self.viewer.persisted());
        }
    }

    impl FractalViewer {
        fn sync_canvas_size(&self) {
            let size = self.viewer.state().render_size();
            self.canvas.set_width(size.x.round().max(1.0) as u32);
            self.canvas.set_height(size.y.round().max(1.0) as u32);
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        _ = console_log::init_with_level(log::Level::Debug);
        log::info!("fractalshader loaded");
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::FractalViewer;
