//! Hue/saturation histograms and the distance used to rank card matches.
//!
//! Hue follows the 8-bit convention of `[0, 180)` and saturation `[0, 256)`,
//! binned 50 x 60 and min-max normalized into `[0, 1]`.

pub mod crop;

use anyhow::{bail, Result};
use image::{GenericImageView, Pixel};

pub use crop::{degold, is_premium, premium_code, CropMode, Rect};

pub const HUE_BINS: usize = 50;
pub const SAT_BINS: usize = 60;
const HUE_RANGE: u32 = 180;
const SAT_RANGE: u32 = 256;

/// Normalized 2D hue/saturation histogram, row-major by hue bin.
#[derive(Debug, Clone, PartialEq)]
pub struct CardHistogram {
    bins: Vec<f32>,
}

impl CardHistogram {
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }
}

/// Builds the histogram of a whole image.
pub fn histogram<I>(region: &I) -> CardHistogram
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    from_pixels(region.pixels().map(|(_, _, pixel)| pixel.to_rgb().0))
}

/// Crops `rect` out of `image` and histograms it.
pub fn histogram_of_region<I>(image: &I, rect: Rect) -> Result<CardHistogram>
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    if !rect.fits_within(width, height) {
        bail!(
            "region {}x{}+{}+{} outside {}x{} image",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            width,
            height
        );
    }
    let pixels = (rect.y..rect.y + rect.height).flat_map(|y| {
        (rect.x..rect.x + rect.width).map(move |x| image.get_pixel(x, y).to_rgb().0)
    });
    Ok(from_pixels(pixels))
}

fn from_pixels(pixels: impl Iterator<Item = [u8; 3]>) -> CardHistogram {
    let mut counts = vec![0f32; HUE_BINS * SAT_BINS];
    for [r, g, b] in pixels {
        let (h, s) = hue_saturation(r, g, b);
        let hue_bin = (h as usize * HUE_BINS) / HUE_RANGE as usize;
        let sat_bin = (s as usize * SAT_BINS) / SAT_RANGE as usize;
        counts[hue_bin * SAT_BINS + sat_bin] += 1.0;
    }
    normalize_min_max(&mut counts);
    CardHistogram { bins: counts }
}

/// Bhattacharyya distance in `[0, 1]`; 0 means identical distributions.
pub fn distance(a: &CardHistogram, b: &CardHistogram) -> f64 {
    let mut overlap = 0f64;
    let mut sum_a = 0f64;
    let mut sum_b = 0f64;
    for (&x, &y) in a.bins.iter().zip(b.bins.iter()) {
        let (x, y) = (x as f64, y as f64);
        overlap += (x * y).sqrt();
        sum_a += x;
        sum_b += y;
    }

    let mass = (sum_a * sum_b).sqrt();
    if mass <= f64::EPSILON {
        // Empty histograms only match each other.
        return if a == b { 0.0 } else { 1.0 };
    }
    (1.0 - overlap / mass).max(0.0).sqrt()
}

/// 8-bit HSV: hue in `[0, 180)`, saturation in `[0, 255]`.
fn hue_saturation(r: u8, g: u8, b: u8) -> (u32, u32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let sat = if max > 0.0 {
        (255.0 * delta / max).round()
    } else {
        0.0
    };

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };
    let hue = ((hue / 2.0).round() as u32).min(HUE_RANGE - 1);

    (hue, (sat as u32).min(SAT_RANGE - 1))
}

fn normalize_min_max(values: &mut [f32]) {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = max - min;
    if span <= f32::EPSILON {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    values.iter_mut().for_each(|v| *v = (*v - min) / span);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(seed: u8) -> RgbImage {
        RgbImage::from_fn(40, 40, |x, y| {
            Rgb([
                (x as u8).wrapping_mul(6).wrapping_add(seed),
                (y as u8).wrapping_mul(5),
                seed.wrapping_mul(3),
            ])
        })
    }

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(20, 20, Rgb(color))
    }

    #[test]
    fn self_distance_is_zero() {
        for image in [gradient(0), gradient(90), solid([200, 10, 10]), solid([0, 0, 0])] {
            let h = histogram(&image);
            assert_eq!(distance(&h, &h), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = histogram(&gradient(10));
        let b = histogram(&gradient(170));
        let c = histogram(&solid([30, 200, 90]));
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &c), distance(&c, &a));
    }

    #[test]
    fn disjoint_colors_are_far_apart() {
        let red = histogram(&RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgb([255, 0, 0]) } else { Rgb([250, 5, 5]) }
        }));
        let blue = histogram(&RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 { Rgb([0, 0, 255]) } else { Rgb([5, 5, 250]) }
        }));
        assert!(distance(&red, &blue) > 0.99);
    }

    #[test]
    fn similar_images_are_closer_than_different_ones() {
        let base = histogram(&gradient(40));
        let near = histogram(&gradient(42));
        let far = histogram(&solid([10, 240, 20]));
        assert!(distance(&base, &near) < distance(&base, &far));
    }

    #[test]
    fn normalized_into_unit_range() {
        let h = histogram(&gradient(7));
        let max = h.bins().iter().copied().fold(0f32, f32::max);
        assert_eq!(max, 1.0);
        assert!(h.bins().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn hsv_matches_reference_values() {
        assert_eq!(hue_saturation(255, 0, 0), (0, 255));
        assert_eq!(hue_saturation(0, 255, 0), (60, 255));
        assert_eq!(hue_saturation(0, 0, 255), (120, 255));
        assert_eq!(hue_saturation(128, 128, 128), (0, 0));
    }

    #[test]
    fn region_outside_image_is_rejected() {
        let image = gradient(0);
        assert!(histogram_of_region(&image, Rect::new(30, 30, 20, 20)).is_err());
        assert!(histogram_of_region(&image, Rect::new(10, 10, 20, 20)).is_ok());
    }
}
