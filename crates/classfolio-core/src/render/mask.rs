//! Circular mask for the round profile-photo output.
//!
//! The mask is the circle inscribed in a square canvas. Coverage falls from
//! 1.0 to 0.0 across one pixel at the boundary so the edge is antialiased, and
//! everything outside the circle becomes fully transparent.

/// Smootherstep interpolation function.
///
/// Returns values from 0.0 to 1.0 with zero velocity and acceleration at boundaries.
///
/// Formula: `6t^5 - 15t^4 + 10t^3`
#[inline]
pub(crate) fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Coverage of the circle inscribed in a `size` x `size` canvas at pixel `(x, y)`.
#[inline]
pub(crate) fn circle_coverage(size: u32, x: u32, y: u32) -> f64 {
    let radius = size as f64 / 2.0;
    let dx = x as f64 + 0.5 - radius;
    let dy = y as f64 + 0.5 - radius;
    let distance = dx.hypot(dy);

    // Transition band is one pixel wide, centered on the boundary
    1.0 - smootherstep(distance - radius + 0.5)
}

/// Multiply the alpha of an RGBA square buffer by the circle coverage.
pub(crate) fn apply_circle_mask(pixels: &mut [u8], size: u32) {
    for (idx, chunk) in pixels.chunks_exact_mut(4).enumerate() {
        let x = (idx as u32) % size;
        let y = (idx as u32) / size;
        let coverage = circle_coverage(size, x, y);
        if coverage >= 1.0 {
            continue;
        }
        chunk[3] = (chunk[3] as f64 * coverage).round() as u8;
        if chunk[3] == 0 {
            chunk[..3].fill(0);
        }
    }
}
