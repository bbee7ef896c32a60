//! Escape-time evaluation for single points of the complex plane.

/// Smoothed escape count for `c = c_re + c_im*i` under `z ← z² + c`.
///
/// Returns `max_iter as f64` exactly when the orbit stays bounded; any
/// smaller value is a fractional iteration count suitable for continuous
/// colouring. Pure and total: every finite input maps to a finite output.
#[inline(always)]
pub fn escape_time(c_re: f64, c_im: f64, max_iter: u32) -> f64 {
    let c_norm = c_re * c_re + c_im * c_im;

    // Main cardioid, closed form. Bounded without iterating.
    if 256.0 * c_norm * c_norm - 96.0 * c_norm + 32.0 * c_re < 3.0 {
        return f64::from(max_iter);
    }

    // Period-2 bulb.
    if 16.0 * c_norm + 32.0 * c_re < -15.0 {
        return f64::from(max_iter);
    }

    let mut z_re = 0.0_f64;
    let mut z_im = 0.0_f64;
    for i in 0..max_iter {
        let z_re_sqr = z_re * z_re;
        let z_im_sqr = z_im * z_im;
        z_im = 2.0 * z_re * z_im + c_im;
        z_re = z_re_sqr - z_im_sqr + c_re;

        // Escape test reuses the squares from before the update, so it sees
        // the norm of the previous iterate. The lag is part of the output.
        let z_norm = z_re_sqr + z_im_sqr;
        if z_norm > 16.0 {
            return f64::from(i) - z_norm.log10().log2();
        }
    }

    f64::from(max_iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_ITER: u32 = 50;

    /// Same recurrence, no interior short-circuits. The short-circuits only
    /// skip work for points that would reach the cap anyway, so the two
    /// functions must agree everywhere.
    fn reference(c_re: f64, c_im: f64, max_iter: u32) -> f64 {
        let mut z_re = 0.0_f64;
        let mut z_im = 0.0_f64;
        for i in 0..max_iter {
            let z_re_sqr = z_re * z_re;
            let z_im_sqr = z_im * z_im;
            z_im = 2.0 * z_re * z_im + c_im;
            z_re = z_re_sqr - z_im_sqr + c_re;

            let z_norm = z_re_sqr + z_im_sqr;
            if z_norm > 16.0 {
                return f64::from(i) - z_norm.log10().log2();
            }
        }
        f64::from(max_iter)
    }

    fn in_cardioid(c_re: f64, c_im: f64) -> bool {
        let c_norm = c_re * c_re + c_im * c_im;
        256.0 * c_norm * c_norm - 96.0 * c_norm + 32.0 * c_re < 3.0
    }

    fn in_bulb(c_re: f64, c_im: f64) -> bool {
        let c_norm = c_re * c_re + c_im * c_im;
        16.0 * c_norm + 32.0 * c_re < -15.0
    }

    #[test]
    fn origin_is_interior() {
        assert_eq!(escape_time(0.0, 0.0, MAX_ITER), f64::from(MAX_ITER));
    }

    #[test]
    fn cardioid_points_are_bounded() {
        let samples = [(0.0, 0.0), (-0.1, 0.1), (0.2, 0.0), (-0.4, 0.3)];
        for (c_re, c_im) in samples {
            assert!(in_cardioid(c_re, c_im), "({c_re}, {c_im}) not in cardioid");
            assert_eq!(escape_time(c_re, c_im, MAX_ITER), f64::from(MAX_ITER));
            assert_eq!(reference(c_re, c_im, MAX_ITER), f64::from(MAX_ITER));
        }
    }

    #[test]
    fn bulb_points_are_bounded() {
        let samples = [(-1.0, 0.0), (-1.2, 0.1), (-0.9, 0.2)];
        for (c_re, c_im) in samples {
            assert!(in_bulb(c_re, c_im), "({c_re}, {c_im}) not in bulb");
            assert_eq!(escape_time(c_re, c_im, MAX_ITER), f64::from(MAX_ITER));
            assert_eq!(reference(c_re, c_im, MAX_ITER), f64::from(MAX_ITER));
        }
    }

    #[test]
    fn divergent_point_escapes_with_fractional_count() {
        let escape = escape_time(2.0, 2.0, MAX_ITER);
        assert!(escape < f64::from(MAX_ITER));
        assert_ne!(escape.fract(), 0.0, "smoothed count should not land on an integer");
    }

    #[test]
    fn evaluation_is_deterministic() {
        let samples = [(2.0, 2.0), (-0.7, 0.3), (0.3, 0.6), (-1.8, 0.0)];
        for (c_re, c_im) in samples {
            let first = escape_time(c_re, c_im, MAX_ITER);
            let second = escape_time(c_re, c_im, MAX_ITER);
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }

    #[test]
    fn agrees_with_reference_over_the_rendered_window() {
        // Same window the renderer shows: re in [-2.25, 0.75], im in [-1.5, 1.5].
        for row in 0..=60 {
            for col in 0..=60 {
                let c_re = -2.25 + f64::from(col) * 0.05;
                let c_im = -1.5 + f64::from(row) * 0.05;
                let fast = escape_time(c_re, c_im, MAX_ITER);
                let slow = reference(c_re, c_im, MAX_ITER);
                assert_eq!(
                    fast.to_bits(),
                    slow.to_bits(),
                    "disagreement at c = ({c_re}, {c_im})"
                );
            }
        }
    }
}
