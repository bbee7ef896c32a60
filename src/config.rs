//! Build-time configuration. Nothing here is mutated at runtime.

/// Output width in pixels.
pub const WIDTH: u32 = 900;

/// Output height in pixels.
pub const HEIGHT: u32 = 900;

/// Length of the FPS measurement window, in seconds.
pub const RUN_TIME: f64 = 30.0;

/// Iteration cap for the escape-time kernel.
pub const MAX_ITER: u32 = 50;

/// Pixels-to-plane scale factor, shared by both axes.
pub const SCALE: f64 = 1.0 / 300.0;

/// Real-axis offset of pixel (0, 0).
pub const OFFSET_X: f64 = -2.25;

/// Imaginary-axis offset of pixel (0, 0).
pub const OFFSET_Y: f64 = -1.5;

/// Rows per parallel work unit in the frame fill.
pub const CHUNK_SIZE: usize = 2;

pub const WINDOW_TITLE: &str = "Mandelbrot Fractal";
