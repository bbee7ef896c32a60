//! HUD composition: the live FPS readout and the end-of-run summary.

use crate::{colour, font, fps, screen};

// Bitmap-font scales approximating point sizes 30 and 80.
const READOUT_SCALE: i32 = 4;
const SUMMARY_SCALE: i32 = 11;

/// CPU-side overlay buffer, alpha-blended over the fractal as a second quad.
///
/// Rewritten from scratch every frame: transparent while the measurement is
/// running, opaque black (covering the animation) once it has finished.
pub struct Hud {
    size: screen::Size,
    pixels: Vec<u8>,
}

impl Hud {
    pub fn new(size: screen::Size) -> Self {
        Self {
            size,
            pixels: vec![0_u8; size.byte_len()],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn compose(&mut self, measurement: &fps::Measurement) {
        if measurement.finished() {
            self.clear(colour::BLACK);

            font::draw_text(
                &mut self.pixels,
                self.size,
                180,
                150,
                "Average FPS:",
                SUMMARY_SCALE,
                colour::WHITE,
            );

            let average = measurement.average_fps();
            font::draw_text(
                &mut self.pixels,
                self.size,
                370,
                250,
                &format!("{average:.1}"),
                SUMMARY_SCALE,
                grade(average),
            );
        } else {
            self.clear(colour::TRANSPARENT);

            font::draw_text(
                &mut self.pixels,
                self.size,
                10,
                10,
                &format!("FPS: {:.0}", measurement.average_fps()),
                READOUT_SCALE,
                colour::WHITE,
            );
        }

        // Drawn last so it stays visible over the summary screen too.
        font::draw_text(
            &mut self.pixels,
            self.size,
            10,
            45,
            "Rust",
            READOUT_SCALE,
            colour::GREEN,
        );
    }

    fn clear(&mut self, rgba: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(screen::BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

/// Colour grading for the final average.
fn grade(average_fps: f64) -> [u8; 4] {
    if average_fps < 30.0 {
        colour::RED
    } else if average_fps < 60.0 {
        colour::ORANGE
    } else {
        colour::GREEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: screen::Size = screen::Size {
        width: 900,
        height: 900,
    };

    /// Drive a measurement to a frozen state with the given final average.
    fn frozen_measurement(frames: u32, final_elapsed: f64) -> fps::Measurement {
        let mut measurement = fps::Measurement::new(1.0);
        for frame in 1..frames {
            measurement.record_frame(f64::from(frame) * 0.5 / f64::from(frames));
        }
        measurement.record_frame(final_elapsed);
        assert!(measurement.finished());
        measurement
    }

    fn pixel(hud: &Hud, x: u32, y: u32) -> [u8; 4] {
        let offset = SIZE.byte_index(x, y);
        [
            hud.pixels[offset],
            hud.pixels[offset + 1],
            hud.pixels[offset + 2],
            hud.pixels[offset + 3],
        ]
    }

    fn contains_colour(hud: &Hud, rgba: [u8; 4]) -> bool {
        hud.pixels
            .chunks_exact(screen::BYTES_PER_PIXEL)
            .any(|pixel| pixel == rgba)
    }

    #[test]
    fn running_hud_is_transparent_away_from_text() {
        let mut hud = Hud::new(SIZE);
        hud.compose(&fps::Measurement::new(30.0));

        assert_eq!(pixel(&hud, 899, 899), colour::TRANSPARENT);
        assert_eq!(pixel(&hud, 450, 450), colour::TRANSPARENT);
        assert!(contains_colour(&hud, colour::WHITE), "FPS readout missing");
        assert!(contains_colour(&hud, colour::GREEN), "language label missing");
    }

    #[test]
    fn summary_screen_is_opaque_black() {
        let mut hud = Hud::new(SIZE);
        hud.compose(&frozen_measurement(100, 1.0));

        assert_eq!(pixel(&hud, 899, 899), colour::BLACK);
        assert_eq!(pixel(&hud, 0, 899), colour::BLACK);
        assert!(contains_colour(&hud, colour::WHITE), "summary heading missing");
    }

    #[test]
    fn summary_grades_the_average() {
        // 2 frames over 1.1s: ~1.8 FPS, red.
        let mut hud = Hud::new(SIZE);
        hud.compose(&frozen_measurement(2, 1.1));
        assert!(contains_colour(&hud, colour::RED));
        assert!(!contains_colour(&hud, colour::ORANGE));

        // 50 frames over 1s: orange band.
        hud.compose(&frozen_measurement(50, 1.0));
        assert!(contains_colour(&hud, colour::ORANGE));
        assert!(!contains_colour(&hud, colour::RED));

        // 200 frames over 1s: green.
        hud.compose(&frozen_measurement(200, 1.0));
        assert!(!contains_colour(&hud, colour::RED));
        assert!(!contains_colour(&hud, colour::ORANGE));
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(grade(0.0), colour::RED);
        assert_eq!(grade(29.9), colour::RED);
        assert_eq!(grade(30.0), colour::ORANGE);
        assert_eq!(grade(59.9), colour::ORANGE);
        assert_eq!(grade(60.0), colour::GREEN);
        assert_eq!(grade(240.0), colour::GREEN);
    }

    #[test]
    fn label_survives_the_summary_screen() {
        let mut hud = Hud::new(SIZE);
        hud.compose(&frozen_measurement(200, 1.0));
        // "Rust" is green and drawn after the black fill.
        assert!(contains_colour(&hud, colour::GREEN));
    }
}
