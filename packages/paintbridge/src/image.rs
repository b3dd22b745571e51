//! Pixel buffers handed over by the host toolkit.

use std::borrow::Cow;
use std::sync::Arc;

use peniko::Color;

use crate::shapes::IntRect;

/// Memory layout of an [`Image`]. Every format uses four bytes per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// `B, G, R, A` bytes with straight alpha.
    Argb32,
    /// `B, G, R, A` bytes with premultiplied alpha. This is what native bitmaps take.
    Argb32Premultiplied,
    /// `B, G, R, X` bytes; the fourth byte is ignored and the pixel is opaque.
    Rgb32,
    /// `R, G, B, A` bytes with straight alpha.
    Rgba8888,
}

/// An immutable image with an explicit row stride.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    stride: usize,
    format: ImageFormat,
    data: Arc<[u8]>,
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.stride == other.stride
            && self.format == other.format
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

impl Image {
    /// Wraps `data` as an image. Returns `None` when the stride is shorter than a row or
    /// the buffer cannot hold `height` rows.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        format: ImageFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> Option<Self> {
        let data = data.into();
        let row = width as usize * 4;
        if stride < row {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => stride * (h as usize - 1) + row,
        };
        if data.len() < needed {
            return None;
        }
        Some(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// Tightly packed image.
    pub fn new(width: u32, height: u32, format: ImageFormat, data: impl Into<Arc<[u8]>>) -> Option<Self> {
        Self::from_raw(width, height, width as usize * 4, format, data)
    }

    /// A premultiplied image filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let px = premultiplied_bgra(color);
        let data: Vec<u8> = px.iter().copied().cycle().take(width as usize * height as usize * 4).collect();
        Self {
            width,
            height,
            stride: width as usize * 4,
            format: ImageFormat::Argb32Premultiplied,
            data: data.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_null(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes of row `y`, without the stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 4]
    }

    pub fn is_premultiplied(&self) -> bool {
        self.format == ImageFormat::Argb32Premultiplied
    }

    /// Converts to [`ImageFormat::Argb32Premultiplied`], borrowing when no work is needed.
    pub fn to_premultiplied(&self) -> Cow<'_, Image> {
        if self.is_premultiplied() {
            return Cow::Borrowed(self);
        }
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for px in self.row(y).chunks_exact(4) {
                let [b, g, r, a] = match self.format {
                    ImageFormat::Argb32 | ImageFormat::Argb32Premultiplied => [px[0], px[1], px[2], px[3]],
                    ImageFormat::Rgb32 => [px[0], px[1], px[2], 255],
                    ImageFormat::Rgba8888 => [px[2], px[1], px[0], px[3]],
                };
                out.extend_from_slice(&[premultiply(b, a), premultiply(g, a), premultiply(r, a), a]);
            }
        }
        Cow::Owned(Self {
            width: self.width,
            height: self.height,
            stride: self.width as usize * 4,
            format: ImageFormat::Argb32Premultiplied,
            data: out.into(),
        })
    }

    /// Copies the part of the image covered by `rect`, clamped to the image bounds.
    pub fn sub_image(&self, rect: IntRect) -> Option<Image> {
        let x0 = rect.x.clamp(0, self.width as i32) as u32;
        let y0 = rect.y.clamp(0, self.height as i32) as u32;
        let x1 = rect.right().clamp(0, self.width as i32) as u32;
        let y1 = rect.bottom().clamp(0, self.height as i32) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        if (x0, y0, x1, y1) == (0, 0, self.width, self.height) {
            return Some(self.clone());
        }
        let width = x1 - x0;
        let mut out = Vec::with_capacity(width as usize * (y1 - y0) as usize * 4);
        for y in y0..y1 {
            let row = self.row(y);
            out.extend_from_slice(&row[x0 as usize * 4..x1 as usize * 4]);
        }
        Some(Self {
            width,
            height: y1 - y0,
            stride: width as usize * 4,
            format: self.format,
            data: out.into(),
        })
    }
}

#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    if a == 255 {
        return c;
    }
    ((c as u16 * a as u16 + 127) / 255) as u8
}

/// `color` as premultiplied `B, G, R, A` bytes.
pub(crate) fn premultiplied_bgra(color: Color) -> [u8; 4] {
    let [r, g, b, a] = color.components.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    [premultiply(b, a), premultiply(g, a), premultiply(r, a), a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplies_straight_alpha() {
        // 50% alpha white in RGBA order.
        let img = Image::new(1, 1, ImageFormat::Rgba8888, vec![255, 255, 255, 128]).unwrap();
        let pm = img.to_premultiplied();
        assert_eq!(pm.format(), ImageFormat::Argb32Premultiplied);
        assert_eq!(pm.data(), &[128, 128, 128, 128]);
    }

    #[test]
    fn second_conversion_is_a_no_op() {
        let img = Image::new(2, 1, ImageFormat::Argb32, vec![10, 20, 30, 40, 50, 60, 70, 255]).unwrap();
        let once = img.to_premultiplied().into_owned();
        let twice = once.to_premultiplied();
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(*twice, once);
    }

    #[test]
    fn rgb32_is_opaque() {
        let img = Image::new(1, 1, ImageFormat::Rgb32, vec![1, 2, 3, 0]).unwrap();
        assert_eq!(img.to_premultiplied().data(), &[1, 2, 3, 255]);
    }

    #[test]
    fn rejects_short_buffers() {
        assert!(Image::new(2, 2, ImageFormat::Argb32, vec![0; 15]).is_none());
        assert!(Image::from_raw(2, 1, 4, ImageFormat::Argb32, vec![0; 8]).is_none());
    }

    #[test]
    fn sub_image_respects_stride() {
        // 2x2 image with 4 bytes of padding per row.
        let data = vec![
            1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 0, //
            3, 3, 3, 3, 4, 4, 4, 4, 0, 0, 0, 0,
        ];
        let img = Image::from_raw(2, 2, 12, ImageFormat::Argb32Premultiplied, data).unwrap();
        let sub = img.sub_image(IntRect::new(1, 0, 1, 2)).unwrap();
        assert_eq!((sub.width(), sub.height(), sub.stride()), (1, 2, 4));
        assert_eq!(sub.data(), &[2, 2, 2, 2, 4, 4, 4, 4]);
        assert!(img.sub_image(IntRect::new(5, 5, 1, 1)).is_none());
    }
}
