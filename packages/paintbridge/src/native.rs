//! Capability interface of the native 2D drawing API.
//!
//! The paint engine and the render targets are written against these traits only. A
//! backend supplies the resource types (brushes, bitmaps, geometries, ...) as associated
//! types, so vendor handles never leak into the core. `paintbridge_d2d` implements them
//! on top of Direct2D; [`crate::recording`] implements them by logging every call.
//!
//! Every factory returns a [`NativeResult`]. Callers are expected to check the result
//! where the resource is requested and degrade to "resource absent" on failure.

use kurbo::{Affine, Line, Point, Rect, Size};
use peniko::{Color, Fill};
use raw_window_handle::RawWindowHandle;

use crate::error::NativeResult;
use crate::font::FontDescription;
use crate::image::Image;

/// Dots per inch along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub x: f32,
    pub y: f32,
}

impl Dpi {
    /// The platform's unscaled resolution.
    pub const DEFAULT: Dpi = Dpi { x: 96.0, y: 96.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Creation flags of a device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceContextOptions {
    #[default]
    None,
    /// Let the device spread rendering across worker threads.
    MultithreadedOptimizations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntialiasMode {
    PerPrimitive,
    #[default]
    Aliased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAntialiasMode {
    Default,
    #[default]
    ClearType,
    Grayscale,
    Aliased,
}

/// Unit of the coordinates passed to draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitMode {
    /// Device independent pixels, scaled by the DPI.
    Dips,
    #[default]
    Pixels,
}

/// How primitives are blended into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveBlend {
    #[default]
    SourceOver,
    /// Destination color and alpha are overwritten.
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    NearestNeighbor,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtendMode {
    #[default]
    Clamp,
    Wrap,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStyle {
    #[default]
    Flat,
    Square,
    Round,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Bevel,
    Round,
    MiterOrBevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Custom,
}

/// How a stroke's width reacts to the world transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeTransform {
    /// Width is in world units and scales with the transform.
    #[default]
    Normal,
    /// Width is in device pixels.
    Fixed,
    /// Always one device pixel wide.
    Hairline,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokeStyleProperties {
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub dash_cap: CapStyle,
    pub line_join: LineJoin,
    pub miter_limit: f32,
    pub dash_style: DashStyle,
    pub dash_offset: f32,
    pub transform_type: StrokeTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitmapBrushProperties {
    pub extend_mode_x: ExtendMode,
    pub extend_mode_y: ExtendMode,
    pub interpolation_mode: InterpolationMode,
}

/// A stop of a native gradient stop collection.
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

impl PartialEq for GradientStop {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.color.components == other.color.components
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradientProperties {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradientProperties {
    pub center: Point,
    /// Offset of the gradient origin relative to `center`.
    pub origin_offset: kurbo::Vec2,
    pub radius_x: f64,
    pub radius_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Point),
    Cubic(Point, Point, Point),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub start: Point,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

/// Input of [`DeviceContext::create_path_geometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    pub fill_rule: Fill,
    pub figures: Vec<Figure>,
}

/// Glyph indices and advances for one string at one font size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapedText {
    pub glyph_indices: Vec<u16>,
    pub advances: Vec<f32>,
}

/// Glyphs drawn as one unit from a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun<'a, F> {
    pub font_face: &'a F,
    pub em_size: f32,
    pub glyph_indices: &'a [u16],
    pub advances: &'a [f32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapChainDescription {
    pub width: u32,
    pub height: u32,
    pub buffer_count: u32,
}

impl Default for SwapChainDescription {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            buffer_count: 1,
        }
    }
}

/// The process-wide device that creates contexts and swap chains.
pub trait GraphicsDevice: Clone {
    type Context: DeviceContext;
    type SwapChain: SwapChain<Self::Context>;

    fn create_device_context(&self, options: DeviceContextOptions) -> NativeResult<Self::Context>;

    fn create_swap_chain_for_window(
        &self,
        window: RawWindowHandle,
        desc: &SwapChainDescription,
    ) -> NativeResult<Self::SwapChain>;
}

/// A window-bound chain of presentable buffers.
pub trait SwapChain<C: DeviceContext> {
    /// Resizes every buffer. No back buffer may be bound to a context at this point.
    fn resize_buffers(&mut self, width: u32, height: u32) -> NativeResult<()>;

    /// Wraps the current back buffer as a bitmap usable as `ctx`'s target.
    fn back_buffer_target(&mut self, ctx: &mut C) -> NativeResult<C::TargetBitmap>;

    fn present(&mut self, sync_interval: u32) -> NativeResult<()>;
}

/// A native drawing context with its resource factories.
pub trait DeviceContext {
    type Brush;
    type StrokeStyle;
    type Bitmap;
    type GradientStops;
    type Geometry;
    type FontFace;
    type TargetBitmap;

    fn begin_draw(&mut self);
    /// Ends the drawing session. Device loss is reported as
    /// [`crate::NativeError::RecreateTarget`].
    fn end_draw(&mut self) -> NativeResult<()>;
    fn flush(&mut self) -> NativeResult<()>;
    fn clear(&mut self, color: Color);

    fn set_target(&mut self, target: Option<&Self::TargetBitmap>);
    fn create_target_bitmap(&mut self, width: u32, height: u32, dpi: Dpi) -> NativeResult<Self::TargetBitmap>;
    fn target_bitmap_size(&self, bitmap: &Self::TargetBitmap) -> (u32, u32);
    /// Pixel size of the bound target, zero when unbound.
    fn pixel_size(&self) -> (u32, u32);
    fn dpi(&self) -> Dpi;
    fn set_dpi(&mut self, dpi: Dpi);

    fn set_transform(&mut self, transform: Affine);
    fn transform(&self) -> Affine;
    fn set_antialias_mode(&mut self, mode: AntialiasMode);
    fn set_text_antialias_mode(&mut self, mode: TextAntialiasMode);
    fn set_unit_mode(&mut self, mode: UnitMode);
    fn set_primitive_blend(&mut self, blend: PrimitiveBlend);

    fn create_solid_color_brush(&mut self, color: Color) -> NativeResult<Self::Brush>;
    /// Uploads `image`, which must be premultiplied.
    fn create_bitmap(&mut self, image: &Image, dpi: Dpi) -> NativeResult<Self::Bitmap>;
    fn bitmap_size(&self, bitmap: &Self::Bitmap) -> Size;
    fn create_bitmap_brush(
        &mut self,
        bitmap: &Self::Bitmap,
        props: BitmapBrushProperties,
    ) -> NativeResult<Self::Brush>;
    fn create_gradient_stop_collection(&mut self, stops: &[GradientStop]) -> NativeResult<Self::GradientStops>;
    fn create_linear_gradient_brush(
        &mut self,
        props: LinearGradientProperties,
        stops: &Self::GradientStops,
    ) -> NativeResult<Self::Brush>;
    fn create_radial_gradient_brush(
        &mut self,
        props: RadialGradientProperties,
        stops: &Self::GradientStops,
    ) -> NativeResult<Self::Brush>;
    fn brush_transform(&self, brush: &Self::Brush) -> Affine;
    fn set_brush_transform(&mut self, brush: &Self::Brush, transform: Affine);
    fn set_brush_opacity(&mut self, brush: &Self::Brush, opacity: f32);

    fn create_stroke_style(&mut self, props: &StrokeStyleProperties) -> NativeResult<Self::StrokeStyle>;
    fn create_path_geometry(&mut self, path: &PathGeometry) -> NativeResult<Self::Geometry>;
    /// Resolves `family` with the remaining attributes taken from `desc`.
    fn create_font_face(&mut self, desc: &FontDescription, family: &str) -> NativeResult<Self::FontFace>;
    fn shape_text(&mut self, face: &Self::FontFace, text: &str, em_size: f32) -> NativeResult<ShapedText>;

    fn fill_rectangle(&mut self, rect: Rect, brush: &Self::Brush);
    fn draw_rectangle(&mut self, rect: Rect, brush: &Self::Brush, width: f32, style: Option<&Self::StrokeStyle>);
    fn draw_line(&mut self, line: Line, brush: &Self::Brush, width: f32, style: Option<&Self::StrokeStyle>);
    fn fill_geometry(&mut self, geometry: &Self::Geometry, brush: &Self::Brush);
    fn draw_geometry(
        &mut self,
        geometry: &Self::Geometry,
        brush: &Self::Brush,
        width: f32,
        style: Option<&Self::StrokeStyle>,
    );
    fn fill_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, brush: &Self::Brush);
    fn draw_bitmap(
        &mut self,
        bitmap: &Self::Bitmap,
        dest: Rect,
        opacity: f32,
        interpolation: InterpolationMode,
        source: Option<Rect>,
    );
    fn draw_glyph_run(&mut self, baseline_origin: Point, run: &GlyphRun<'_, Self::FontFace>, brush: &Self::Brush);

    /// Hands back a resource the caller no longer uses. Backends whose handles free
    /// themselves on drop keep these defaults.
    fn release_brush(&mut self, brush: Self::Brush) {
        drop(brush);
    }
    fn release_stroke_style(&mut self, style: Self::StrokeStyle) {
        drop(style);
    }
    /// A bitmap brush keeps its bitmap alive, so a bitmap may be released as soon as a
    /// brush was created from it.
    fn release_bitmap(&mut self, bitmap: Self::Bitmap) {
        drop(bitmap);
    }
    fn release_geometry(&mut self, geometry: Self::Geometry) {
        drop(geometry);
    }
    /// Must not be the bound target.
    fn release_target_bitmap(&mut self, bitmap: Self::TargetBitmap) {
        drop(bitmap);
    }
}
