//! Painter state as reported by the host toolkit.

use bitflags::bitflags;
use kurbo::{Affine, Point};

use crate::brush::Brush;
use crate::font::FontDescription;
use crate::pen::Pen;

bitflags! {
    /// Which parts of [`PainterState`] changed since the last update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u32 {
        const BRUSH = 1 << 0;
        const BRUSH_ORIGIN = 1 << 1;
        const PEN = 1 << 2;
        const OPACITY = 1 << 3;
        const COMPOSITION_MODE = 1 << 4;
        const TRANSFORM = 1 << 5;
        const HINTS = 1 << 6;
        const FONT = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderHints: u32 {
        const ANTIALIASING = 1 << 0;
        const TEXT_ANTIALIASING = 1 << 1;
        const SMOOTH_PIXMAP_TRANSFORM = 1 << 2;
    }
}

impl Default for RenderHints {
    fn default() -> Self {
        RenderHints::TEXT_ANTIALIASING
    }
}

/// Porter-Duff and blend modes a toolkit painter can request. Only
/// [`CompositionMode::Source`] and [`CompositionMode::SourceOver`] have a native
/// counterpart; every other mode paints as a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositionMode {
    #[default]
    SourceOver,
    DestinationOver,
    Clear,
    Source,
    Destination,
    SourceIn,
    DestinationIn,
    SourceOut,
    DestinationOut,
    SourceAtop,
    DestinationAtop,
    Xor,
    Plus,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PainterState {
    pub brush: Brush,
    pub brush_origin: Point,
    pub pen: Pen,
    /// `0.0..=1.0`, applied to both brush and pen.
    pub opacity: f64,
    pub composition_mode: CompositionMode,
    pub transform: Affine,
    pub render_hints: RenderHints,
    pub font: FontDescription,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            brush: Brush::none(),
            brush_origin: Point::ZERO,
            pen: Pen::default(),
            opacity: 1.0,
            composition_mode: CompositionMode::SourceOver,
            transform: Affine::IDENTITY,
            render_hints: RenderHints::default(),
            font: FontDescription::default(),
        }
    }
}
