//! Toolkit brushes: how shapes are filled.

use kurbo::{Affine, Point};
use peniko::Color;

use crate::image::{premultiplied_bgra, Image, ImageFormat};

/// A color at a position along a gradient, `position` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

impl PartialEq for ColorStop {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.color.components == other.color.components
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub focal: Point,
    pub radius: f64,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConicalGradient {
    pub center: Point,
    /// Start angle in degrees.
    pub angle: f64,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum BrushStyle {
    #[default]
    NoBrush,
    Solid,
    Dense1,
    Dense2,
    Dense3,
    Dense4,
    Dense5,
    Dense6,
    Dense7,
    Horizontal,
    Vertical,
    Cross,
    BackwardDiagonal,
    ForwardDiagonal,
    DiagonalCross,
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    ConicalGradient(ConicalGradient),
    Texture(Image),
}

impl BrushStyle {
    /// The 8x8 monochrome pattern of a hatch or dense style. Rows are stored least
    /// significant bit first; a set bit is painted with the brush color.
    pub fn pattern_bits(&self) -> Option<[u8; 8]> {
        let bits = match self {
            BrushStyle::Dense1 => [0xff, 0xbb, 0xff, 0xff, 0xff, 0xbb, 0xff, 0xff],
            BrushStyle::Dense2 => [0x77, 0xff, 0xdd, 0xff, 0x77, 0xff, 0xdd, 0xff],
            BrushStyle::Dense3 => [0x55, 0xbb, 0x55, 0xee, 0x55, 0xbb, 0x55, 0xee],
            BrushStyle::Dense4 => [0x55, 0xaa, 0x55, 0xaa, 0x55, 0xaa, 0x55, 0xaa],
            BrushStyle::Dense5 => [0xaa, 0x44, 0xaa, 0x11, 0xaa, 0x44, 0xaa, 0x11],
            BrushStyle::Dense6 => [0x88, 0x00, 0x22, 0x00, 0x88, 0x00, 0x22, 0x00],
            BrushStyle::Dense7 => [0x00, 0x44, 0x00, 0x00, 0x00, 0x44, 0x00, 0x00],
            BrushStyle::Horizontal => [0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00],
            BrushStyle::Vertical => [0x10; 8],
            BrushStyle::Cross => [0x10, 0x10, 0x10, 0xff, 0x10, 0x10, 0x10, 0x10],
            BrushStyle::BackwardDiagonal => [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80],
            BrushStyle::ForwardDiagonal => [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01],
            BrushStyle::DiagonalCross => [0x81, 0x42, 0x24, 0x18, 0x18, 0x24, 0x42, 0x81],
            _ => return None,
        };
        Some(bits)
    }
}

/// Rasterizes a pattern style into a premultiplied 8x8 image: `color` where a bit is
/// set, transparent elsewhere.
pub fn pattern_image(style: &BrushStyle, color: Color) -> Option<Image> {
    let bits = style.pattern_bits()?;
    let fg = premultiplied_bgra(color);
    let mut data = Vec::with_capacity(8 * 8 * 4);
    for row in bits {
        for x in 0..8 {
            if row & (1 << x) != 0 {
                data.extend_from_slice(&fg);
            } else {
                data.extend_from_slice(&[0; 4]);
            }
        }
    }
    Image::new(8, 8, ImageFormat::Argb32Premultiplied, data)
}

#[derive(Debug, Clone)]
pub struct Brush {
    pub style: BrushStyle,
    pub color: Color,
    /// Applied to gradient and texture brushes on top of their own geometry.
    pub transform: Affine,
}

impl PartialEq for Brush {
    fn eq(&self, other: &Self) -> bool {
        self.style == other.style
            && self.color.components == other.color.components
            && self.transform == other.transform
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::none()
    }
}

impl Brush {
    pub fn none() -> Self {
        Self {
            style: BrushStyle::NoBrush,
            color: Color::BLACK,
            transform: Affine::IDENTITY,
        }
    }

    pub fn solid(color: Color) -> Self {
        Self::with_style(BrushStyle::Solid, color)
    }

    pub fn with_style(style: BrushStyle, color: Color) -> Self {
        Self {
            style,
            color,
            transform: Affine::IDENTITY,
        }
    }

    pub fn linear(start: Point, end: Point, stops: Vec<ColorStop>) -> Self {
        Self::with_style(BrushStyle::LinearGradient(LinearGradient { start, end, stops }), Color::BLACK)
    }

    pub fn radial(center: Point, focal: Point, radius: f64, stops: Vec<ColorStop>) -> Self {
        Self::with_style(
            BrushStyle::RadialGradient(RadialGradient {
                center,
                focal,
                radius,
                stops,
            }),
            Color::BLACK,
        )
    }

    pub fn texture(image: Image) -> Self {
        Self::with_style(BrushStyle::Texture(image), Color::BLACK)
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_none(&self) -> bool {
        matches!(self.style, BrushStyle::NoBrush)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(img: &Image) -> Vec<Vec<bool>> {
        (0..img.height())
            .map(|y| img.row(y).chunks_exact(4).map(|px| px[3] == 255).collect())
            .collect()
    }

    #[test]
    fn horizontal_hatch_has_single_row() {
        let img = pattern_image(&BrushStyle::Horizontal, Color::BLACK).unwrap();
        let px = opaque(&img);
        for (y, row) in px.iter().enumerate() {
            assert!(row.iter().all(|&on| on == (y == 3)), "row {y}");
        }
    }

    #[test]
    fn bits_are_read_lsb_first() {
        let img = pattern_image(&BrushStyle::BackwardDiagonal, Color::WHITE).unwrap();
        let px = opaque(&img);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(px[y][x], x == y);
            }
        }
        let vertical = opaque(&pattern_image(&BrushStyle::Vertical, Color::WHITE).unwrap());
        assert!(vertical.iter().all(|row| row[4] && row.iter().filter(|on| **on).count() == 1));
    }

    #[test]
    fn unset_texels_are_transparent() {
        let red = Color::new([1.0, 0.0, 0.0, 1.0]);
        let img = pattern_image(&BrushStyle::Dense7, red).unwrap();
        assert_eq!(&img.row(1)[2 * 4..3 * 4], &[0, 0, 255, 255]);
        assert_eq!(&img.row(0)[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn only_patterns_have_bits() {
        assert!(BrushStyle::Solid.pattern_bits().is_none());
        assert!(BrushStyle::NoBrush.pattern_bits().is_none());
        assert!(BrushStyle::DiagonalCross.pattern_bits().is_some());
    }
}
