//! The per-frame escape-time field and its parallel fill.

use log::trace;
use rayon::prelude::*;

use crate::{colour, mandelbrot, screen};

/// Affine map from pixel indices to complex-plane coordinates:
/// `c = pixel * scale + offset`, per axis.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Viewport {
    #[inline]
    pub fn plane_coord(self, x: u32, y: u32) -> (f64, f64) {
        (
            f64::from(x) * self.scale + self.offset_x,
            f64::from(y) * self.scale + self.offset_y,
        )
    }
}

/// A persistent RGBA8 pixel buffer plus everything needed to recompute it.
///
/// The buffer starts fully opaque black. A fill pass rewrites the RGB bytes
/// of escaped pixels only; alpha bytes and the RGB of non-escaping pixels
/// keep whatever they already held, so interior pixels can carry colour from
/// an earlier frame.
pub struct Field {
    size: screen::Size,
    viewport: Viewport,
    max_iter: u32,
    chunk_rows: usize,
    pixels: Vec<u8>,
}

impl Field {
    pub fn new(size: screen::Size, viewport: Viewport, max_iter: u32, chunk_rows: usize) -> Self {
        assert!(max_iter > 0);
        assert!(viewport.scale > 0.0);
        assert!(chunk_rows > 0);

        let mut pixels = vec![0_u8; size.byte_len()];
        for pixel in pixels.chunks_exact_mut(screen::BYTES_PER_PIXEL) {
            pixel[3] = 0xff;
        }

        Self {
            size,
            viewport,
            max_iter,
            chunk_rows,
            pixels,
        }
    }

    /// Read-only view of the buffer for the texture upload.
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Recompute the field for the animation time `time`.
    ///
    /// The buffer is split into bands of `chunk_rows` rows, one worker task
    /// per band; rows within a band and columns within a row run
    /// sequentially. Returns only once every band is done, so the caller
    /// never observes a torn frame.
    pub fn fill(&mut self, time: f64) {
        trace!("begin fill, time {time}");

        let viewport = self.viewport;
        let width = self.size.width;
        let row_bytes = self.size.row_bytes();
        let chunk_rows = self.chunk_rows;
        let max_iter = self.max_iter;
        let bound = f64::from(max_iter);

        self.pixels
            .par_chunks_mut(row_bytes * chunk_rows)
            .enumerate()
            .for_each(|(band_index, band)| {
                let first_row = band_index * chunk_rows;
                for (row_in_band, row) in band.chunks_exact_mut(row_bytes).enumerate() {
                    let y = (first_row + row_in_band) as u32;
                    for x in 0..width {
                        let (c_re, c_im) = viewport.plane_coord(x, y);
                        let escape = mandelbrot::escape_time(c_re, c_im, max_iter);
                        if escape < bound {
                            let [r, g, b] = colour::shade(escape, time);
                            let offset = x as usize * screen::BYTES_PER_PIXEL;
                            row[offset] = r;
                            row[offset + 1] = g;
                            row[offset + 2] = b;
                        }
                    }
                }
            });

        trace!("end fill");
    }
}
