//! Fractal configuration registry.
//!
//! Defines the available fractal shaders with their default view, plus the
//! DOM id of the canvas the viewer draws into.

/// Id of the `<canvas>` element the viewer attaches to by default.
pub const DEFAULT_CANVAS_ID: &str = "fractal-canvas";

/// Configuration for a fractal type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalConfig {
    /// Unique identifier
    pub id: &'static str,
    /// Human-readable name for UI display
    pub display_name: &'static str,
    /// View center in fractal space
    pub default_center: (f64, f64),
    /// Fractal units per unit of shader space; smaller zooms in
    pub default_zoom: f64,
    pub default_iterations: i32,
    /// Ratio of render resolution to screen resolution
    pub default_render_scale: f64,
    /// RGBA clear color behind the fractal
    pub background: [f32; 4],
}

/// Mandelbrot set configuration.
pub static MANDELBROT_CONFIG: FractalConfig = FractalConfig {
    id: "mandelbrot",
    display_name: "Mandelbrot Set",
    default_center: (0.0, 0.0),
    default_zoom: 1.0,
    default_iterations: 1000,
    default_render_scale: 1.0,
    background: [0.0, 0.0, 0.0, 1.0],
};

pub static FRACTAL_CONFIGS: &[&FractalConfig] = &[&MANDELBROT_CONFIG];

/// Look up a fractal configuration by ID.
pub fn get_config(id: &str) -> Option<&'static FractalConfig> {
    FRACTAL_CONFIGS.iter().copied().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_config_finds_mandelbrot() {
        let config = get_config("mandelbrot").unwrap();
        assert_eq!(config.display_name, "Mandelbrot Set");
        assert_eq!(config.default_iterations, 1000);
    }

    #[test]
    fn get_config_unknown_returns_none() {
        assert!(get_config("julia").is_none());
    }
}
