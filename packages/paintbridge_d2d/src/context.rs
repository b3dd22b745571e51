use std::mem::ManuallyDrop;

use kurbo::{Affine, Line, Point, Rect, Size};
use paintbridge::image::Image;
use paintbridge::native::{
    AntialiasMode, BitmapBrushProperties, CapStyle, DashStyle, DeviceContext, Dpi, ExtendMode, GlyphRun,
    GradientStop, InterpolationMode, LineJoin, LinearGradientProperties, PathGeometry, PrimitiveBlend,
    RadialGradientProperties, Segment, ShapedText, StrokeStyleProperties, StrokeTransform, TextAntialiasMode,
    UnitMode,
};
use paintbridge::{FontDescription, NativeError, NativeResult};
use peniko::{Color, Fill};
use windows::core::{Interface, HSTRING};
use windows::Foundation::Numerics::Matrix3x2;
use windows::Win32::Graphics::Direct2D::Common::*;
use windows::Win32::Graphics::Direct2D::*;
use windows::Win32::Graphics::DirectWrite::*;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_B8G8R8A8_UNORM;
use windows::Win32::Graphics::Dxgi::IDXGISurface;

use crate::error::NativeCall;

const DWRITE_E_NOFONT: u32 = 0x8898_5002;

/// A Direct2D device context together with the factories its resources come from.
pub struct D2DContext {
    ctx: ID2D1DeviceContext,
    factory: ID2D1Factory1,
    dwrite: IDWriteFactory,
    system_fonts: Option<IDWriteFontCollection>,
    bound: bool,
}

impl D2DContext {
    pub(crate) fn new(ctx: ID2D1DeviceContext, factory: ID2D1Factory1, dwrite: IDWriteFactory) -> Self {
        Self {
            ctx,
            factory,
            dwrite,
            system_fonts: None,
            bound: false,
        }
    }

    pub fn raw(&self) -> &ID2D1DeviceContext {
        &self.ctx
    }

    /// Wraps a swap chain surface as a bitmap this context can draw into.
    pub(crate) fn wrap_surface(&mut self, surface: &IDXGISurface) -> NativeResult<ID2D1Bitmap1> {
        let dpi = self.dpi();
        let props = bitmap_properties(dpi, D2D1_BITMAP_OPTIONS_TARGET | D2D1_BITMAP_OPTIONS_CANNOT_DRAW);
        unsafe { self.ctx.CreateBitmapFromDxgiSurface(surface, Some(&props)) }.native("CreateBitmapFromDxgiSurface")
    }

    fn font_collection(&mut self) -> NativeResult<IDWriteFontCollection> {
        if let Some(collection) = &self.system_fonts {
            return Ok(collection.clone());
        }
        let mut collection = None;
        unsafe { self.dwrite.GetSystemFontCollection(&mut collection, false) }.native("GetSystemFontCollection")?;
        let collection = collection.ok_or(NativeError::failed("GetSystemFontCollection", DWRITE_E_NOFONT))?;
        self.system_fonts = Some(collection.clone());
        Ok(collection)
    }
}

fn color_f(color: Color) -> D2D1_COLOR_F {
    let [r, g, b, a] = color.components;
    D2D1_COLOR_F { r, g, b, a }
}

fn point_f(point: Point) -> D2D_POINT_2F {
    D2D_POINT_2F {
        x: point.x as f32,
        y: point.y as f32,
    }
}

fn rect_f(rect: Rect) -> D2D_RECT_F {
    D2D_RECT_F {
        left: rect.x0 as f32,
        top: rect.y0 as f32,
        right: rect.x1 as f32,
        bottom: rect.y1 as f32,
    }
}

fn matrix(transform: Affine) -> Matrix3x2 {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    Matrix3x2 {
        M11: a as f32,
        M12: b as f32,
        M21: c as f32,
        M22: d as f32,
        M31: e as f32,
        M32: f as f32,
    }
}

fn affine(m: &Matrix3x2) -> Affine {
    Affine::new([
        m.M11 as f64,
        m.M12 as f64,
        m.M21 as f64,
        m.M22 as f64,
        m.M31 as f64,
        m.M32 as f64,
    ])
}

fn bitmap_properties(dpi: Dpi, options: D2D1_BITMAP_OPTIONS) -> D2D1_BITMAP_PROPERTIES1 {
    D2D1_BITMAP_PROPERTIES1 {
        pixelFormat: D2D1_PIXEL_FORMAT {
            format: DXGI_FORMAT_B8G8R8A8_UNORM,
            alphaMode: D2D1_ALPHA_MODE_PREMULTIPLIED,
        },
        dpiX: dpi.x,
        dpiY: dpi.y,
        bitmapOptions: options,
        colorContext: ManuallyDrop::new(None),
    }
}

fn cap_style(cap: CapStyle) -> D2D1_CAP_STYLE {
    match cap {
        CapStyle::Flat => D2D1_CAP_STYLE_FLAT,
        CapStyle::Square => D2D1_CAP_STYLE_SQUARE,
        CapStyle::Round => D2D1_CAP_STYLE_ROUND,
        CapStyle::Triangle => D2D1_CAP_STYLE_TRIANGLE,
    }
}

fn line_join(join: LineJoin) -> D2D1_LINE_JOIN {
    match join {
        LineJoin::Miter => D2D1_LINE_JOIN_MITER,
        LineJoin::Bevel => D2D1_LINE_JOIN_BEVEL,
        LineJoin::Round => D2D1_LINE_JOIN_ROUND,
        LineJoin::MiterOrBevel => D2D1_LINE_JOIN_MITER_OR_BEVEL,
    }
}

fn dash_style(style: DashStyle) -> Option<D2D1_DASH_STYLE> {
    Some(match style {
        DashStyle::Solid => D2D1_DASH_STYLE_SOLID,
        DashStyle::Dash => D2D1_DASH_STYLE_DASH,
        DashStyle::Dot => D2D1_DASH_STYLE_DOT,
        DashStyle::DashDot => D2D1_DASH_STYLE_DASH_DOT,
        DashStyle::DashDotDot => D2D1_DASH_STYLE_DASH_DOT_DOT,
        DashStyle::Custom => return None,
    })
}

fn stroke_transform(transform: StrokeTransform) -> D2D1_STROKE_TRANSFORM_TYPE {
    match transform {
        StrokeTransform::Normal => D2D1_STROKE_TRANSFORM_TYPE_NORMAL,
        StrokeTransform::Fixed => D2D1_STROKE_TRANSFORM_TYPE_FIXED,
        StrokeTransform::Hairline => D2D1_STROKE_TRANSFORM_TYPE_HAIRLINE,
    }
}

fn extend_mode(mode: ExtendMode) -> D2D1_EXTEND_MODE {
    match mode {
        ExtendMode::Clamp => D2D1_EXTEND_MODE_CLAMP,
        ExtendMode::Wrap => D2D1_EXTEND_MODE_WRAP,
        ExtendMode::Mirror => D2D1_EXTEND_MODE_MIRROR,
    }
}

fn interpolation_mode(mode: InterpolationMode) -> D2D1_INTERPOLATION_MODE {
    match mode {
        InterpolationMode::NearestNeighbor => D2D1_INTERPOLATION_MODE_NEAREST_NEIGHBOR,
        InterpolationMode::Linear => D2D1_INTERPOLATION_MODE_LINEAR,
    }
}

fn fill_mode(fill: Fill) -> D2D1_FILL_MODE {
    match fill {
        Fill::NonZero => D2D1_FILL_MODE_WINDING,
        Fill::EvenOdd => D2D1_FILL_MODE_ALTERNATE,
    }
}

impl DeviceContext for D2DContext {
    type Brush = ID2D1Brush;
    type StrokeStyle = ID2D1StrokeStyle;
    type Bitmap = ID2D1Bitmap1;
    type GradientStops = ID2D1GradientStopCollection1;
    type Geometry = ID2D1PathGeometry1;
    type FontFace = IDWriteFontFace;
    type TargetBitmap = ID2D1Bitmap1;

    fn begin_draw(&mut self) {
        unsafe { self.ctx.BeginDraw() }
    }

    fn end_draw(&mut self) -> NativeResult<()> {
        unsafe { self.ctx.EndDraw(None, None) }.native("EndDraw")
    }

    fn flush(&mut self) -> NativeResult<()> {
        unsafe { self.ctx.Flush(None, None) }.native("Flush")
    }

    fn clear(&mut self, color: Color) {
        let color = color_f(color);
        unsafe { self.ctx.Clear(Some(&color)) }
    }

    fn set_target(&mut self, target: Option<&ID2D1Bitmap1>) {
        unsafe {
            match target {
                Some(bitmap) => self.ctx.SetTarget(bitmap),
                None => self.ctx.SetTarget(None::<&ID2D1Image>),
            }
        }
        self.bound = target.is_some();
    }

    fn create_target_bitmap(&mut self, width: u32, height: u32, dpi: Dpi) -> NativeResult<ID2D1Bitmap1> {
        let props = bitmap_properties(dpi, D2D1_BITMAP_OPTIONS_TARGET);
        unsafe { self.ctx.CreateBitmap(D2D_SIZE_U { width, height }, None, 0, &props) }.native("CreateBitmap")
    }

    fn target_bitmap_size(&self, bitmap: &ID2D1Bitmap1) -> (u32, u32) {
        let size = unsafe { bitmap.GetPixelSize() };
        (size.width, size.height)
    }

    fn pixel_size(&self) -> (u32, u32) {
        if !self.bound {
            return (0, 0);
        }
        let size = unsafe { self.ctx.GetPixelSize() };
        (size.width, size.height)
    }

    fn dpi(&self) -> Dpi {
        let (mut x, mut y) = (0.0f32, 0.0f32);
        unsafe { self.ctx.GetDpi(&mut x, &mut y) };
        Dpi::new(x, y)
    }

    fn set_dpi(&mut self, dpi: Dpi) {
        unsafe { self.ctx.SetDpi(dpi.x, dpi.y) }
    }

    fn set_transform(&mut self, transform: Affine) {
        unsafe { self.ctx.SetTransform(&matrix(transform)) }
    }

    fn transform(&self) -> Affine {
        let mut m = Matrix3x2::default();
        unsafe { self.ctx.GetTransform(&mut m) };
        affine(&m)
    }

    fn set_antialias_mode(&mut self, mode: AntialiasMode) {
        let mode = match mode {
            AntialiasMode::PerPrimitive => D2D1_ANTIALIAS_MODE_PER_PRIMITIVE,
            AntialiasMode::Aliased => D2D1_ANTIALIAS_MODE_ALIASED,
        };
        unsafe { self.ctx.SetAntialiasMode(mode) }
    }

    fn set_text_antialias_mode(&mut self, mode: TextAntialiasMode) {
        let mode = match mode {
            TextAntialiasMode::Default => D2D1_TEXT_ANTIALIAS_MODE_DEFAULT,
            TextAntialiasMode::ClearType => D2D1_TEXT_ANTIALIAS_MODE_CLEARTYPE,
            TextAntialiasMode::Grayscale => D2D1_TEXT_ANTIALIAS_MODE_GRAYSCALE,
            TextAntialiasMode::Aliased => D2D1_TEXT_ANTIALIAS_MODE_ALIASED,
        };
        unsafe { self.ctx.SetTextAntialiasMode(mode) }
    }

    fn set_unit_mode(&mut self, mode: UnitMode) {
        let mode = match mode {
            UnitMode::Dips => D2D1_UNIT_MODE_DIPS,
            UnitMode::Pixels => D2D1_UNIT_MODE_PIXELS,
        };
        unsafe { self.ctx.SetUnitMode(mode) }
    }

    fn set_primitive_blend(&mut self, blend: PrimitiveBlend) {
        let blend = match blend {
            PrimitiveBlend::SourceOver => D2D1_PRIMITIVE_BLEND_SOURCE_OVER,
            PrimitiveBlend::Copy => D2D1_PRIMITIVE_BLEND_COPY,
        };
        unsafe { self.ctx.SetPrimitiveBlend(blend) }
    }

    fn create_solid_color_brush(&mut self, color: Color) -> NativeResult<ID2D1Brush> {
        let color = color_f(color);
        let brush = unsafe { self.ctx.CreateSolidColorBrush(&color, None) }.native("CreateSolidColorBrush")?;
        brush.cast().native("CreateSolidColorBrush")
    }

    fn create_bitmap(&mut self, image: &Image, dpi: Dpi) -> NativeResult<ID2D1Bitmap1> {
        if !image.is_premultiplied() {
            return Err(NativeError::Unsupported("straight alpha bitmap upload"));
        }
        let props = bitmap_properties(dpi, D2D1_BITMAP_OPTIONS_NONE);
        let size = D2D_SIZE_U {
            width: image.width(),
            height: image.height(),
        };
        unsafe {
            self.ctx.CreateBitmap(
                size,
                Some(image.data().as_ptr().cast()),
                image.stride() as u32,
                &props,
            )
        }
        .native("CreateBitmap")
    }

    fn bitmap_size(&self, bitmap: &ID2D1Bitmap1) -> Size {
        let size = unsafe { bitmap.GetPixelSize() };
        Size::new(size.width as f64, size.height as f64)
    }

    fn create_bitmap_brush(&mut self, bitmap: &ID2D1Bitmap1, props: BitmapBrushProperties) -> NativeResult<ID2D1Brush> {
        let props = D2D1_BITMAP_BRUSH_PROPERTIES1 {
            extendModeX: extend_mode(props.extend_mode_x),
            extendModeY: extend_mode(props.extend_mode_y),
            interpolationMode: interpolation_mode(props.interpolation_mode),
        };
        let brush = unsafe { self.ctx.CreateBitmapBrush(bitmap, Some(&props), None) }.native("CreateBitmapBrush")?;
        brush.cast().native("CreateBitmapBrush")
    }

    fn create_gradient_stop_collection(&mut self, stops: &[GradientStop]) -> NativeResult<ID2D1GradientStopCollection1> {
        let stops: Vec<D2D1_GRADIENT_STOP> = stops
            .iter()
            .map(|stop| D2D1_GRADIENT_STOP {
                position: stop.position,
                color: color_f(stop.color),
            })
            .collect();
        unsafe {
            self.ctx.CreateGradientStopCollection(
                &stops,
                D2D1_COLOR_SPACE_SRGB,
                D2D1_COLOR_SPACE_SRGB,
                D2D1_BUFFER_PRECISION_8BPC_UNORM,
                D2D1_EXTEND_MODE_CLAMP,
                D2D1_COLOR_INTERPOLATION_MODE_STRAIGHT,
            )
        }
        .native("CreateGradientStopCollection")
    }

    fn create_linear_gradient_brush(
        &mut self,
        props: LinearGradientProperties,
        stops: &ID2D1GradientStopCollection1,
    ) -> NativeResult<ID2D1Brush> {
        let props = D2D1_LINEAR_GRADIENT_BRUSH_PROPERTIES {
            startPoint: point_f(props.start),
            endPoint: point_f(props.end),
        };
        let brush =
            unsafe { self.ctx.CreateLinearGradientBrush(&props, None, stops) }.native("CreateLinearGradientBrush")?;
        brush.cast().native("CreateLinearGradientBrush")
    }

    fn create_radial_gradient_brush(
        &mut self,
        props: RadialGradientProperties,
        stops: &ID2D1GradientStopCollection1,
    ) -> NativeResult<ID2D1Brush> {
        let props = D2D1_RADIAL_GRADIENT_BRUSH_PROPERTIES {
            center: point_f(props.center),
            gradientOriginOffset: D2D_POINT_2F {
                x: props.origin_offset.x as f32,
                y: props.origin_offset.y as f32,
            },
            radiusX: props.radius_x as f32,
            radiusY: props.radius_y as f32,
        };
        let brush =
            unsafe { self.ctx.CreateRadialGradientBrush(&props, None, stops) }.native("CreateRadialGradientBrush")?;
        brush.cast().native("CreateRadialGradientBrush")
    }

    fn brush_transform(&self, brush: &ID2D1Brush) -> Affine {
        let mut m = Matrix3x2::default();
        unsafe { brush.GetTransform(&mut m) };
        affine(&m)
    }

    fn set_brush_transform(&mut self, brush: &ID2D1Brush, transform: Affine) {
        unsafe { brush.SetTransform(&matrix(transform)) }
    }

    fn set_brush_opacity(&mut self, brush: &ID2D1Brush, opacity: f32) {
        unsafe { brush.SetOpacity(opacity) }
    }

    fn create_stroke_style(&mut self, props: &StrokeStyleProperties) -> NativeResult<ID2D1StrokeStyle> {
        let dash_style = dash_style(props.dash_style).ok_or(NativeError::Unsupported("custom dash pattern"))?;
        let props = D2D1_STROKE_STYLE_PROPERTIES1 {
            startCap: cap_style(props.start_cap),
            endCap: cap_style(props.end_cap),
            dashCap: cap_style(props.dash_cap),
            lineJoin: line_join(props.line_join),
            miterLimit: props.miter_limit,
            dashStyle: dash_style,
            dashOffset: props.dash_offset,
            transformType: stroke_transform(props.transform_type),
        };
        let style = unsafe { self.factory.CreateStrokeStyle(&props, None) }.native("CreateStrokeStyle")?;
        style.cast().native("CreateStrokeStyle")
    }

    fn create_path_geometry(&mut self, path: &PathGeometry) -> NativeResult<ID2D1PathGeometry1> {
        unsafe {
            let geometry = self.factory.CreatePathGeometry().native("CreatePathGeometry")?;
            let sink = geometry.Open().native("ID2D1PathGeometry::Open")?;
            sink.SetFillMode(fill_mode(path.fill_rule));
            for figure in &path.figures {
                sink.BeginFigure(point_f(figure.start), D2D1_FIGURE_BEGIN_FILLED);
                for segment in &figure.segments {
                    match *segment {
                        Segment::Line(to) => sink.AddLine(point_f(to)),
                        Segment::Cubic(c1, c2, to) => sink.AddBezier(&D2D1_BEZIER_SEGMENT {
                            point1: point_f(c1),
                            point2: point_f(c2),
                            point3: point_f(to),
                        }),
                    }
                }
                let end = if figure.closed {
                    D2D1_FIGURE_END_CLOSED
                } else {
                    D2D1_FIGURE_END_OPEN
                };
                sink.EndFigure(end);
            }
            sink.Close().native("ID2D1GeometrySink::Close")?;
            Ok(geometry)
        }
    }

    fn create_font_face(&mut self, desc: &FontDescription, family: &str) -> NativeResult<IDWriteFontFace> {
        let collection = self.font_collection()?;
        unsafe {
            let mut index = 0u32;
            let mut exists = false.into();
            collection
                .FindFamilyName(&HSTRING::from(family), &mut index, &mut exists)
                .native("FindFamilyName")?;
            if !exists.as_bool() {
                return Err(NativeError::failed("FindFamilyName", DWRITE_E_NOFONT));
            }
            let font_family = collection.GetFontFamily(index).native("GetFontFamily")?;
            let style = if desc.italic {
                DWRITE_FONT_STYLE_ITALIC
            } else {
                DWRITE_FONT_STYLE_NORMAL
            };
            let font = font_family
                .GetFirstMatchingFont(DWRITE_FONT_WEIGHT(desc.weight as i32), DWRITE_FONT_STRETCH_NORMAL, style)
                .native("GetFirstMatchingFont")?;
            font.CreateFontFace().native("CreateFontFace")
        }
    }

    fn shape_text(&mut self, face: &IDWriteFontFace, text: &str, em_size: f32) -> NativeResult<ShapedText> {
        let code_points: Vec<u32> = text.chars().map(u32::from).collect();
        if code_points.is_empty() {
            return Ok(ShapedText::default());
        }
        let mut glyph_indices = vec![0u16; code_points.len()];
        let mut glyph_metrics = vec![DWRITE_GLYPH_METRICS::default(); code_points.len()];
        let mut font_metrics = DWRITE_FONT_METRICS::default();
        unsafe {
            face.GetGlyphIndices(code_points.as_ptr(), code_points.len() as u32, glyph_indices.as_mut_ptr())
                .native("GetGlyphIndices")?;
            face.GetDesignGlyphMetrics(
                glyph_indices.as_ptr(),
                glyph_indices.len() as u32,
                glyph_metrics.as_mut_ptr(),
                false,
            )
            .native("GetDesignGlyphMetrics")?;
            face.GetMetrics(&mut font_metrics);
        }
        let scale = em_size / f32::from(font_metrics.designUnitsPerEm.max(1));
        let advances = glyph_metrics
            .iter()
            .map(|metrics| metrics.advanceWidth as f32 * scale)
            .collect();
        Ok(ShapedText {
            glyph_indices,
            advances,
        })
    }

    fn fill_rectangle(&mut self, rect: Rect, brush: &ID2D1Brush) {
        unsafe { self.ctx.FillRectangle(&rect_f(rect), brush) }
    }

    fn draw_rectangle(&mut self, rect: Rect, brush: &ID2D1Brush, width: f32, style: Option<&ID2D1StrokeStyle>) {
        unsafe { self.ctx.DrawRectangle(&rect_f(rect), brush, width, style) }
    }

    fn draw_line(&mut self, line: Line, brush: &ID2D1Brush, width: f32, style: Option<&ID2D1StrokeStyle>) {
        unsafe { self.ctx.DrawLine(point_f(line.p0), point_f(line.p1), brush, width, style) }
    }

    fn fill_geometry(&mut self, geometry: &ID2D1PathGeometry1, brush: &ID2D1Brush) {
        unsafe { self.ctx.FillGeometry(geometry, brush, None) }
    }

    fn draw_geometry(
        &mut self,
        geometry: &ID2D1PathGeometry1,
        brush: &ID2D1Brush,
        width: f32,
        style: Option<&ID2D1StrokeStyle>,
    ) {
        unsafe { self.ctx.DrawGeometry(geometry, brush, width, style) }
    }

    fn fill_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, brush: &ID2D1Brush) {
        let ellipse = D2D1_ELLIPSE {
            point: point_f(center),
            radiusX: radius_x,
            radiusY: radius_y,
        };
        unsafe { self.ctx.FillEllipse(&ellipse, brush) }
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &ID2D1Bitmap1,
        dest: Rect,
        opacity: f32,
        interpolation: InterpolationMode,
        source: Option<Rect>,
    ) {
        let dest = rect_f(dest);
        let source = source.map(rect_f);
        unsafe {
            self.ctx.DrawBitmap(
                bitmap,
                Some(&dest),
                opacity,
                interpolation_mode(interpolation),
                source.as_ref().map(|rect| rect as *const D2D_RECT_F),
                None,
            )
        }
    }

    fn draw_glyph_run(&mut self, baseline_origin: Point, run: &GlyphRun<'_, IDWriteFontFace>, brush: &ID2D1Brush) {
        let count = run.glyph_indices.len().min(run.advances.len());
        if count == 0 {
            return;
        }
        let glyph_run = DWRITE_GLYPH_RUN {
            fontFace: ManuallyDrop::new(Some(run.font_face.clone())),
            fontEmSize: run.em_size,
            glyphCount: count as u32,
            glyphIndices: run.glyph_indices.as_ptr(),
            glyphAdvances: run.advances.as_ptr(),
            glyphOffsets: std::ptr::null(),
            isSideways: false.into(),
            bidiLevel: 0,
        };
        unsafe {
            self.ctx.DrawGlyphRun(
                point_f(baseline_origin),
                &glyph_run,
                None,
                brush,
                DWRITE_MEASURING_MODE_NATURAL,
            )
        }
        drop(ManuallyDrop::into_inner(glyph_run.fontFace));
    }
}
