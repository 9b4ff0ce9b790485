//! Image wrapper over normalized floating-point pixels.
//!
//! Pixels are stored as RGBA `f32` in `[0.0, 1.0]` regardless of whether the
//! source had an alpha channel; [`Channels`] remembers which layout to hand
//! back on egress. The pixel buffer sits behind an `Arc`, so cloning an
//! [`Image`] is cheap and frame sets can share frames freely.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, Rgba32FImage};
use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};

use crate::vector::Quad2d;

/// Channel layout of an image as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channels {
    Rgb,
    Rgba,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    pub fn from_count(count: usize) -> VbatchResult<Self> {
        match count {
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            other => Err(VbatchError::construction(format!(
                "unsupported channel count {other} (expected 3 or 4)"
            ))),
        }
    }
}

/// Resampling filter for [`Image::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
}

impl From<Resampling> for FilterType {
    fn from(value: Resampling) -> Self {
        match value {
            Resampling::Nearest => FilterType::Nearest,
            Resampling::Bilinear => FilterType::Triangle,
        }
    }
}

/// A single frame.
#[derive(Clone)]
pub struct Image {
    pixels: Arc<Rgba32FImage>,
    channels: Channels,
}

impl Image {
    /// Wrap an RGBA float buffer.
    pub fn from_rgba32f(pixels: Rgba32FImage, channels: Channels) -> Self {
        Self {
            pixels: Arc::new(pixels),
            channels,
        }
    }

    /// Build from a row-major `height × width × channels` array.
    ///
    /// Values are clamped to `[0, 1]`. Three-channel input gets an opaque alpha.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: &[f32]) -> VbatchResult<Self> {
        let layout = Channels::from_count(channels)?;
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(VbatchError::construction(format!(
                "pixel array has {} values, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for px in data.chunks_exact(channels) {
            rgba.extend(px[..3].iter().map(|v| v.clamp(0.0, 1.0)));
            rgba.push(if channels == 4 {
                px[3].clamp(0.0, 1.0)
            } else {
                1.0
            });
        }

        let pixels = Rgba32FImage::from_raw(width, height, rgba).ok_or_else(|| {
            VbatchError::construction(format!("cannot allocate {width}x{height} image"))
        })?;
        Ok(Self::from_rgba32f(pixels, layout))
    }

    /// Convert a decoded image, keeping track of whether it had alpha.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let channels = if image.color().has_alpha() {
            Channels::Rgba
        } else {
            Channels::Rgb
        };
        Self::from_rgba32f(image.to_rgba32f(), channels)
    }

    /// Solid colour image.
    pub fn solid(width: u32, height: u32, channels: Channels, color: [f32; 4]) -> Self {
        let pixels = Rgba32FImage::from_pixel(width, height, Rgba(color));
        Self::from_rgba32f(pixels, channels)
    }

    /// Row-major `height × width × channels` copy of the pixels.
    pub fn to_raw(&self) -> Vec<f32> {
        let n = self.channels.count();
        self.pixels
            .pixels()
            .flat_map(|p| p.0.into_iter().take(n))
            .collect()
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        let rgba = DynamicImage::ImageRgba32F((*self.pixels).clone());
        match self.channels {
            Channels::Rgba => rgba,
            Channels::Rgb => DynamicImage::ImageRgb32F(rgba.to_rgb32f()),
        }
    }

    pub fn as_rgba32f(&self) -> &Rgba32FImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Image bounds as a rectangle from `(0, 0)` to `(width, height)`.
    pub fn quad(&self) -> Quad2d {
        Quad2d::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()))
    }

    /// RGBA value at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels.get_pixel(x, y).0
    }

    fn with_pixels(&self, pixels: Rgba32FImage) -> Self {
        Self::from_rgba32f(pixels, self.channels)
    }

    /// Crop to the box `[x0, x1) × [y0, y1)`.
    ///
    /// The box may extend past the image; uncovered pixels are black and
    /// transparent. An inverted box yields an empty image.
    pub fn crop(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> Image {
        let out_w = (x1 - x0).max(0) as u32;
        let out_h = (y1 - y0).max(0) as u32;
        let (src_w, src_h) = (i64::from(self.width()), i64::from(self.height()));

        let out = Rgba32FImage::from_fn(out_w, out_h, |x, y| {
            let sx = x0 + i64::from(x);
            let sy = y0 + i64::from(y);
            if (0..src_w).contains(&sx) && (0..src_h).contains(&sy) {
                *self.pixels.get_pixel(sx as u32, sy as u32)
            } else {
                Rgba([0.0, 0.0, 0.0, 0.0])
            }
        });
        self.with_pixels(out)
    }

    /// Crop with fractional box coordinates, rounded to the nearest pixel.
    pub fn crop_rounded(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Image {
        self.crop(
            x0.round() as i64,
            y0.round() as i64,
            x1.round() as i64,
            y1.round() as i64,
        )
    }

    /// Resize to `width × height`.
    ///
    /// If one side is `<= 0` it is derived from the other to keep the aspect
    /// ratio; if both are `<= 0` the image is returned unchanged.
    pub fn resize(&self, width: i64, height: i64, resampling: Resampling) -> Image {
        if width <= 0 && height <= 0 {
            return self.clone();
        }
        let ratio = f64::from(self.width()) / f64::from(self.height().max(1));
        let (w, h) = if height <= 0 {
            (width, (width as f64 / ratio).round() as i64)
        } else if width <= 0 {
            ((height as f64 * ratio).round() as i64, height)
        } else {
            (width, height)
        };
        let (w, h) = (w.max(1) as u32, h.max(1) as u32);

        if (w, h) == self.dimensions() {
            return self.clone();
        }
        self.with_pixels(imageops::resize(&*self.pixels, w, h, resampling.into()))
    }

    /// Rotate counter-clockwise by `degrees` about the centre.
    ///
    /// The output keeps the input size; corners uncovered by the rotated
    /// frame are black. Sampling is nearest-neighbour.
    pub fn rotate(&self, degrees: f64) -> Image {
        let degrees = degrees.rem_euclid(360.0);
        if degrees == 0.0 {
            return self.clone();
        }

        // Round away float noise so quarter turns land exactly on pixel centres.
        let snap = |v: f64| (v * 1e15).round() / 1e15;
        let theta = -degrees.to_radians();
        let (sin, cos) = (snap(theta.sin()), snap(theta.cos()));

        let (w, h) = self.dimensions();
        let cx = f64::from(w) * 0.5;
        let cy = f64::from(h) * 0.5;

        let out = Rgba32FImage::from_fn(w, h, |x, y| {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            let sx = (cos * dx + sin * dy + cx).floor();
            let sy = (-sin * dx + cos * dy + cy).floor();
            if sx >= 0.0 && sy >= 0.0 && sx < f64::from(w) && sy < f64::from(h) {
                *self.pixels.get_pixel(sx as u32, sy as u32)
            } else {
                Rgba([0.0, 0.0, 0.0, 0.0])
            }
        });
        self.with_pixels(out)
    }

    /// Weighted mix of two equally sized images:
    /// `self * weight_self / total + other * weight_other / total`.
    pub fn blend(&self, other: &Image, weight_self: f64, weight_other: f64) -> VbatchResult<Image> {
        let total = weight_self + weight_other;
        if !(total > 0.0) {
            return Err(VbatchError::processing(format!(
                "blend weights must sum to a positive value (got {weight_self} + {weight_other})"
            )));
        }
        self.cross_fade(other, weight_other / total)
    }

    /// Linear cross-fade: `self * (1 - f) + other * f`.
    pub fn cross_fade(&self, other: &Image, f: f64) -> VbatchResult<Image> {
        if self.dimensions() != other.dimensions() {
            return Err(VbatchError::incompatible(
                "blend",
                format!(
                    "image dimensions {:?} and {:?} differ",
                    self.dimensions(),
                    other.dimensions()
                ),
            ));
        }
        let f = f as f32;
        let mut out = (*self.pixels).clone();
        for (dst, src) in out.pixels_mut().zip(other.pixels.pixels()) {
            for c in 0..4 {
                dst.0[c] = dst.0[c] * (1.0 - f) + src.0[c] * f;
            }
        }
        Ok(self.with_pixels(out))
    }

    /// Scale colour channels by `factor` (0 = black, 1 = unchanged).
    pub fn change_brightness(&self, factor: f64) -> Image {
        let factor = factor as f32;
        self.map_rgb(|v| v * factor)
    }

    /// Scale distance from the mean luminance by `factor` (0 = flat grey).
    pub fn change_contrast(&self, factor: f64) -> Image {
        let mean = self.mean_luminance();
        let factor = factor as f32;
        self.map_rgb(|v| mean + (v - mean) * factor)
    }

    fn mean_luminance(&self) -> f32 {
        let count = self.width() as usize * self.height() as usize;
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .pixels
            .pixels()
            .map(|p| f64::from(0.299 * p.0[0] + 0.587 * p.0[1] + 0.114 * p.0[2]))
            .sum();
        (sum / count as f64) as f32
    }

    fn map_rgb(&self, f: impl Fn(f32) -> f32) -> Image {
        let mut out = (*self.pixels).clone();
        for p in out.pixels_mut() {
            for c in 0..3 {
                p.0[c] = f(p.0[c]).clamp(0.0, 1.0);
            }
        }
        self.with_pixels(out)
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.channels == other.channels
            && self.dimensions() == other.dimensions()
            && self.pixels.as_raw() == other.pixels.as_raw()
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channels", &self.channels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Image {
        let data: Vec<f32> = (0..width * height)
            .flat_map(|i| {
                let v = i as f32 / (width * height) as f32;
                [v, v, v]
            })
            .collect();
        Image::from_raw(width, height, 3, &data).unwrap()
    }

    #[test]
    fn test_raw_roundtrip_rgb() {
        let data = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let img = Image::from_raw(2, 1, 3, &data).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.pixel(1, 0), [0.4, 0.5, 0.6, 1.0]);
        assert_eq!(img.to_raw(), data);
    }

    #[test]
    fn test_raw_clamps_values() {
        let img = Image::from_raw(1, 1, 4, &[1.5, -0.5, 0.5, 2.0]).unwrap();
        assert_eq!(img.pixel(0, 0), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_raw_rejects_bad_shapes() {
        assert!(Image::from_raw(2, 2, 3, &[0.0; 11]).is_err());
        assert!(Image::from_raw(1, 1, 2, &[0.0; 2]).is_err());
    }

    #[test]
    fn test_crop_inside() {
        let img = gradient(4, 4);
        let c = img.crop(1, 1, 3, 3);
        assert_eq!(c.dimensions(), (2, 2));
        assert_eq!(c.pixel(0, 0), img.pixel(1, 1));
        assert_eq!(c.pixel(1, 1), img.pixel(2, 2));
    }

    #[test]
    fn test_crop_outside_is_black() {
        let img = Image::solid(2, 2, Channels::Rgb, [1.0, 1.0, 1.0, 1.0]);
        let c = img.crop(-1, 0, 1, 1);
        assert_eq!(c.dimensions(), (2, 1));
        assert_eq!(c.pixel(0, 0), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(c.pixel(1, 0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_resize_keeps_aspect_when_one_side_missing() {
        let img = gradient(8, 4);
        assert_eq!(img.resize(4, 0, Resampling::Bilinear).dimensions(), (4, 2));
        assert_eq!(img.resize(0, 1, Resampling::Nearest).dimensions(), (2, 1));
        assert_eq!(img.resize(0, 0, Resampling::Nearest), img);
    }

    #[test]
    fn test_resize_solid_stays_solid() {
        let img = Image::solid(6, 6, Channels::Rgb, [0.25, 0.5, 0.75, 1.0]);
        let r = img.resize(3, 2, Resampling::Bilinear);
        assert_eq!(r.dimensions(), (3, 2));
        let p = r.pixel(1, 1);
        assert!((p[0] - 0.25).abs() < 1e-5);
        assert!((p[2] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_half_turn_swaps_pixels() {
        let img = Image::from_raw(2, 1, 3, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        let r = img.rotate(180.0);
        assert_eq!(r.pixel(0, 0), img.pixel(1, 0));
        assert_eq!(r.pixel(1, 0), img.pixel(0, 0));
    }

    #[test]
    fn test_rotate_zero_and_full_turn_are_identity() {
        let img = gradient(3, 3);
        assert_eq!(img.rotate(0.0), img);
        assert_eq!(img.rotate(360.0), img);
    }

    #[test]
    fn test_blend_weights() {
        let black = Image::solid(1, 1, Channels::Rgb, [0.0, 0.0, 0.0, 1.0]);
        let white = Image::solid(1, 1, Channels::Rgb, [1.0, 1.0, 1.0, 1.0]);
        let mix = black.blend(&white, 2.0, 1.0).unwrap();
        assert!((mix.pixel(0, 0)[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_blend_rejects_mismatched_dimensions() {
        let a = Image::solid(1, 1, Channels::Rgb, [0.0; 4]);
        let b = Image::solid(2, 1, Channels::Rgb, [0.0; 4]);
        let err = a.cross_fade(&b, 0.5).unwrap_err();
        assert!(matches!(err, VbatchError::Incompatible { .. }));
    }

    #[test]
    fn test_blend_rejects_zero_weights() {
        let a = Image::solid(1, 1, Channels::Rgb, [0.0; 4]);
        assert!(a.blend(&a, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_brightness_keeps_alpha() {
        let img = Image::solid(1, 1, Channels::Rgba, [0.8, 0.4, 0.2, 0.5]);
        let dim = img.change_brightness(0.5);
        let p = dim.pixel(0, 0);
        assert!((p[0] - 0.4).abs() < 1e-6);
        assert!((p[1] - 0.2).abs() < 1e-6);
        assert_eq!(p[3], 0.5);
    }

    #[test]
    fn test_contrast_zero_is_flat() {
        let img = Image::from_raw(2, 1, 3, &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let flat = img.change_contrast(0.0);
        assert_eq!(flat.pixel(0, 0), flat.pixel(1, 0));
        assert!((flat.pixel(0, 0)[0] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_dynamic_roundtrip_keeps_channels() {
        let img = gradient(2, 2);
        let back = Image::from_dynamic(&img.to_dynamic());
        assert_eq!(back.channels(), Channels::Rgb);
        assert_eq!(back.dimensions(), (2, 2));
    }
}
