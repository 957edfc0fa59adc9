//! Software raster used for both the persistent display and the per-frame scratch layer.

use crate::color::Color;
use crate::surface::{BlendMode, RadialGradient, Rect, Surface};

/// Premultiplied RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
}

#[inline]
fn blend_pixel(dst: &mut [f32; 4], src: [f32; 4], blend: BlendMode) {
    match blend {
        BlendMode::SourceOver => {
            let keep = 1.0 - src[3];
            for c in 0..4 {
                dst[c] = src[c] + dst[c] * keep;
            }
        }
        BlendMode::Lighter => {
            for c in 0..4 {
                dst[c] = (dst[c] + src[c]).min(1.0);
            }
        }
    }
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width * height],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// True when every pixel holds the transparent background.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == [0.0; 4])
    }

    /// Pixel index ranges whose centers fall inside `rect`, clipped to the buffer.
    fn span(&self, rect: Rect) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let clip = |start: f32, len: f32, limit: usize| {
            let lo = (start - 0.5).ceil().max(0.0);
            let hi = (start + len - 0.5).ceil().min(limit as f32);
            (lo < hi).then(|| lo as usize..hi as usize)
        };
        let xs = clip(rect.x, rect.width, self.width)?;
        let ys = clip(rect.y, rect.height, self.height)?;
        Some((xs, ys))
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, blend: BlendMode) {
        let Some((xs, ys)) = self.span(rect) else {
            return;
        };
        let src = color.premultiplied();
        for y in ys {
            let row = y * self.width;
            for px in &mut self.pixels[row + xs.start..row + xs.end] {
                blend_pixel(px, src, blend);
            }
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        let Some((xs, ys)) = self.span(rect) else {
            return;
        };
        for y in ys {
            let row = y * self.width;
            self.pixels[row + xs.start..row + xs.end].fill([0.0; 4]);
        }
    }

    fn fill_gradient(&mut self, rect: Rect, gradient: &RadialGradient, blend: BlendMode) {
        if gradient.is_degenerate() {
            return;
        }
        let Some((xs, ys)) = self.span(rect) else {
            return;
        };
        for y in ys {
            let row = y * self.width;
            for x in xs.clone() {
                let src = gradient.sample(x as f32 + 0.5, y as f32 + 0.5);
                blend_pixel(&mut self.pixels[row + x], src, blend);
            }
        }
    }

    fn composite(&mut self, source: &Self, blend: BlendMode) {
        debug_assert_eq!((self.width, self.height), (source.width, source.height));
        for (dst, src) in self.pixels.iter_mut().zip(&source.pixels) {
            if src[3] > 0.0 || src[0] > 0.0 || src[1] > 0.0 || src[2] > 0.0 {
                blend_pixel(dst, *src, blend);
            }
        }
    }

    fn create_compatible(&self) -> Self {
        Self::new(self.width, self.height)
    }
}
