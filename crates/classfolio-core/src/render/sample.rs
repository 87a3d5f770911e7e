//! Pixel sampling for the rotated render path.

use crate::decode::Bitmap;

/// Nearest-neighbor read at continuous source coordinates.
///
/// Coordinates address pixel edges, so `(0.5, 0.5)` is the center of the first
/// pixel. Outside the bitmap reads as transparent.
#[inline]
pub(crate) fn sample_nearest(bitmap: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    if x < 0.0 || y < 0.0 {
        return [0; 4];
    }
    bitmap.pixel(x.floor() as u32, y.floor() as u32)
}

/// Bilinear interpolation at continuous source coordinates.
///
/// Considers the 4 nearest pixel centers weighted by distance. Color is
/// interpolated premultiplied by alpha so that transparent neighbors outside
/// the bitmap fade the edge instead of darkening it.
pub(crate) fn sample_bilinear(bitmap: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    // Shift from edge coordinates to pixel-center coordinates
    let cx = x - 0.5;
    let cy = y - 0.5;

    let x0 = cx.floor();
    let y0 = cy.floor();
    let fx = cx - x0;
    let fy = cy - y0;

    let (w, h) = (bitmap.width as i64, bitmap.height as i64);
    let fetch = |px: i64, py: i64| -> [f64; 4] {
        if px < 0 || py < 0 || px >= w || py >= h {
            return [0.0; 4];
        }
        let p = bitmap.pixel(px as u32, py as u32);
        [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
    };

    let (ix, iy) = (x0 as i64, y0 as i64);
    let taps = [
        (fetch(ix, iy), (1.0 - fx) * (1.0 - fy)),
        (fetch(ix + 1, iy), fx * (1.0 - fy)),
        (fetch(ix, iy + 1), (1.0 - fx) * fy),
        (fetch(ix + 1, iy + 1), fx * fy),
    ];

    let mut premul = [0.0f64; 3];
    let mut alpha = 0.0f64;
    for (p, weight) in taps {
        let a = p[3] * weight;
        premul[0] += p[0] * a;
        premul[1] += p[1] * a;
        premul[2] += p[2] * a;
        alpha += a;
    }

    if alpha <= f64::EPSILON {
        return [0; 4];
    }

    [
        (premul[0] / alpha).clamp(0.0, 255.0).round() as u8,
        (premul[1] / alpha).clamp(0.0, 255.0).round() as u8,
        (premul[2] / alpha).clamp(0.0, 255.0).round() as u8,
        alpha.clamp(0.0, 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_reads_containing_pixel() {
        let mut bmp = Bitmap::filled(2, 2, [0, 0, 0, 255]);
        bmp.pixels[4] = 200; // (1, 0) red channel
        assert_eq!(sample_nearest(&bmp, 1.2, 0.9)[0], 200);
        assert_eq!(sample_nearest(&bmp, 0.9, 0.9)[0], 0);
        assert_eq!(sample_nearest(&bmp, -0.1, 0.5), [0; 4]);
        assert_eq!(sample_nearest(&bmp, 2.0, 0.5), [0; 4]);
    }

    #[test]
    fn test_bilinear_at_pixel_center_is_exact() {
        let bmp = Bitmap::filled(3, 3, [10, 20, 30, 255]);
        assert_eq!(sample_bilinear(&bmp, 1.5, 1.5), [10, 20, 30, 255]);
    }

    #[test]
    fn test_bilinear_midpoint_blends() {
        let mut bmp = Bitmap::filled(2, 1, [0, 0, 0, 255]);
        bmp.pixels[4] = 200;
        let p = sample_bilinear(&bmp, 1.0, 0.5);
        assert_eq!(p[0], 100);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_bilinear_edge_fades_without_darkening() {
        let bmp = Bitmap::filled(2, 2, [200, 100, 50, 255]);
        // Half a pixel outside the left edge
        let p = sample_bilinear(&bmp, 0.0, 1.0);
        assert_eq!(&p[..3], &[200, 100, 50]);
        assert_eq!(p[3], 128);
    }

    #[test]
    fn test_bilinear_far_outside_is_transparent() {
        let bmp = Bitmap::filled(2, 2, [255; 4]);
        assert_eq!(sample_bilinear(&bmp, -10.0, -10.0), [0; 4]);
    }
}
