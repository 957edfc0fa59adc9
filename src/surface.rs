//! The drawing operations the simulation needs from whatever it renders into.

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(x: f32, y: f32, side: f32) -> Self {
        Self::new(x, y, side, side)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Paint over what is there, weighted by source alpha.
    SourceOver,
    /// Saturating sum: overlapping light gets brighter instead of covering.
    Lighter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

/// Radial gradient between two concentric circles, offsets relative to the ring between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: (f32, f32),
    pub inner_radius: f32,
    pub outer_radius: f32,
    stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn new(center: (f32, f32), inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            stops: Vec::with_capacity(3),
        }
    }

    pub fn add_stop(&mut self, offset: f32, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|stop| stop.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Nothing is painted when the circles coincide or there are no stops.
    pub fn is_degenerate(&self) -> bool {
        self.outer_radius <= self.inner_radius || self.stops.is_empty()
    }

    /// Premultiplied color at a point.
    pub fn sample(&self, x: f32, y: f32) -> [f32; 4] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0; 4],
        };

        let distance = ((x - self.center.0).powi(2) + (y - self.center.1).powi(2)).sqrt();
        let t = (distance - self.inner_radius) / (self.outer_radius - self.inner_radius);

        if t <= first.offset {
            return first.color.premultiplied();
        }
        if t >= last.offset {
            return last.color.premultiplied();
        }

        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.offset {
                let span = to.offset - from.offset;
                let k = if span > 0.0 { (t - from.offset) / span } else { 1.0 };
                let a = from.color.premultiplied();
                let b = to.color.premultiplied();
                return [
                    a[0] + (b[0] - a[0]) * k,
                    a[1] + (b[1] - a[1]) * k,
                    a[2] + (b[2] - a[2]) * k,
                    a[3] + (b[3] - a[3]) * k,
                ];
            }
        }
        last.color.premultiplied()
    }
}

/// A raster target the compositor can fade, clear, paint and layer.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, blend: BlendMode);

    /// Resets the covered pixels to the transparent background.
    fn clear_rect(&mut self, rect: Rect);

    fn fill_gradient(&mut self, rect: Rect, gradient: &RadialGradient, blend: BlendMode);

    /// Draws `source` (same size as `self`) on top of this surface.
    fn composite(&mut self, source: &Self, blend: BlendMode);

    /// A blank offscreen surface with the same dimensions.
    fn create_compatible(&self) -> Self
    where
        Self: Sized;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> RadialGradient {
        let mut g = RadialGradient::new((0.0, 0.0), 0.0, 10.0);
        g.add_stop(1.0, Color::TRANSPARENT);
        g.add_stop(0.1, Color::WHITE);
        g.add_stop(0.6, Color::rgba(1.0, 0.0, 0.0, 1.0));
        g
    }

    #[test]
    fn stops_are_kept_sorted() {
        let offsets: Vec<f32> = gradient().stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.1, 0.6, 1.0]);
    }

    #[test]
    fn sample_clamps_to_end_stops() {
        let g = gradient();
        assert_eq!(g.sample(0.0, 0.0), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(g.sample(50.0, 0.0), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn sample_interpolates_between_stops() {
        let g = gradient();
        // halfway between offset 0.1 (white) and 0.6 (red)
        let [r, green, b, a] = g.sample(3.5, 0.0);
        assert!((r - 1.0).abs() < 1e-5);
        assert!((green - 0.5).abs() < 1e-5);
        assert!((b - 0.5).abs() < 1e-5);
        assert!((a - 1.0).abs() < 1e-5);
    }

    #[test]
    fn coincident_circles_are_degenerate() {
        let mut g = RadialGradient::new((0.0, 0.0), 2.0, 2.0);
        g.add_stop(0.0, Color::WHITE);
        assert!(g.is_degenerate());
    }
}
