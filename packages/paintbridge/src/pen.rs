//! Toolkit pens: how outlines are stroked.

use crate::brush::Brush;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenStyle {
    NoPen,
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    CustomDash,
}

impl PenStyle {
    pub fn is_dashed(self) -> bool {
        !matches!(self, PenStyle::NoPen | PenStyle::Solid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenCap {
    Flat,
    #[default]
    Square,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenJoin {
    Miter,
    #[default]
    Bevel,
    Round,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub style: PenStyle,
    /// Zero means a hairline.
    pub width: f64,
    /// Width is in device pixels instead of world units.
    pub cosmetic: bool,
    pub cap: PenCap,
    pub join: PenJoin,
    /// Toolkit convention: half the limit the native API expects.
    pub miter_limit: f64,
    pub dash_offset: f64,
    pub brush: Brush,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            style: PenStyle::Solid,
            width: 1.0,
            cosmetic: false,
            cap: PenCap::Square,
            join: PenJoin::Bevel,
            miter_limit: 2.0,
            dash_offset: 0.0,
            brush: Brush::solid(peniko::Color::BLACK),
        }
    }
}

impl Pen {
    pub fn none() -> Self {
        Self {
            style: PenStyle::NoPen,
            ..Default::default()
        }
    }

    pub fn new(brush: Brush, width: f64) -> Self {
        Self {
            width,
            brush,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: PenStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_cosmetic(mut self, cosmetic: bool) -> Self {
        self.cosmetic = cosmetic;
        self
    }

    pub fn with_cap(mut self, cap: PenCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: PenJoin) -> Self {
        self.join = join;
        self
    }

    pub fn is_none(&self) -> bool {
        self.style == PenStyle::NoPen
    }
}
