//! A native backend that records draw calls instead of rasterizing them.
//!
//! Resources are plain ids into per-context tables, so hosts and tests can inspect
//! exactly what the engine asked for. The device can be told to fail selected native
//! calls and to report device loss, which drives the error and recovery paths without
//! a GPU.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Line, Point, Rect, Size};
use peniko::Color;
use raw_window_handle::RawWindowHandle;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{NativeError, NativeResult};
use crate::font::FontDescription;
use crate::image::Image;
use crate::native::{
    AntialiasMode, BitmapBrushProperties, DeviceContext, DeviceContextOptions, Dpi, GlyphRun,
    GradientStop, GraphicsDevice, InterpolationMode, LinearGradientProperties, PathGeometry,
    PrimitiveBlend, RadialGradientProperties, ShapedText, StrokeStyleProperties, StrokeTransform,
    SwapChain, SwapChainDescription, TextAntialiasMode, UnitMode,
};

/// `E_FAIL`, reported by calls that were told to fail.
const E_FAIL: u32 = 0x8000_4005;
/// `DWRITE_E_NOFONT`, reported for unknown font families.
const E_NOFONT: u32 = 0x8898_5002;

/// Advance of every glyph, in ems.
const GLYPH_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrushId(pub u32);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeStyleId(pub u32);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitmapId(pub u32);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);
/// Handle of a bitmap a context can draw into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStops(pub Vec<GradientStop>);

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFont {
    pub family: String,
    pub description: FontDescription,
}

#[derive(Debug, Clone)]
pub enum BrushKind {
    Solid(Color),
    Bitmap { bitmap: BitmapId, props: BitmapBrushProperties },
    Linear { props: LinearGradientProperties, stops: Vec<GradientStop> },
    Radial { props: RadialGradientProperties, stops: Vec<GradientStop> },
}

#[derive(Debug, Clone)]
pub struct BrushRecord {
    pub kind: BrushKind,
    pub transform: Affine,
    pub opacity: f32,
}

/// One recorded native draw call.
#[derive(Debug, Clone)]
pub enum Command {
    Clear(Color),
    FillRectangle {
        rect: Rect,
        brush: BrushId,
    },
    DrawRectangle {
        rect: Rect,
        brush: BrushId,
        width: f32,
        /// Width in device pixels under the transform current at the time of the call.
        device_width: f64,
        style: Option<StrokeStyleId>,
    },
    DrawLine {
        line: Line,
        brush: BrushId,
        width: f32,
        device_width: f64,
        style: Option<StrokeStyleId>,
    },
    FillGeometry {
        geometry: GeometryId,
        brush: BrushId,
    },
    DrawGeometry {
        geometry: GeometryId,
        brush: BrushId,
        width: f32,
        device_width: f64,
        style: Option<StrokeStyleId>,
    },
    FillEllipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        brush: BrushId,
    },
    DrawBitmap {
        bitmap: BitmapId,
        dest: Rect,
        opacity: f32,
        interpolation: InterpolationMode,
        source: Option<Rect>,
    },
    DrawGlyphRun {
        origin: Point,
        family: String,
        em_size: f32,
        glyphs: Vec<u16>,
        advances: Vec<f32>,
        brush: BrushId,
    },
}

#[derive(Debug, Default)]
struct DeviceState {
    next_id: u32,
    contexts_created: usize,
    swap_chains_created: usize,
    presents: usize,
    font_families: Vec<String>,
    failing: FxHashSet<&'static str>,
    device_lost: bool,
}

impl DeviceState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared recording device. Clones refer to the same device.
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    state: Rc<RefCell<DeviceState>>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    /// A device that knows the "Arial" and "Segoe UI" font families.
    pub fn new() -> Self {
        Self::with_fonts(&["Arial", "Segoe UI"])
    }

    pub fn with_fonts(families: &[&str]) -> Self {
        let state = DeviceState {
            font_families: families.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Makes every later native call named `call` fail.
    pub fn fail(&self, call: &'static str) {
        self.state.borrow_mut().failing.insert(call);
    }

    pub fn succeed(&self, call: &'static str) {
        self.state.borrow_mut().failing.remove(call);
    }

    /// The next `end_draw` on any context reports that the target must be recreated.
    pub fn simulate_device_loss(&self) {
        self.state.borrow_mut().device_lost = true;
    }

    pub fn contexts_created(&self) -> usize {
        self.state.borrow().contexts_created
    }

    pub fn swap_chains_created(&self) -> usize {
        self.state.borrow().swap_chains_created
    }

    pub fn presents(&self) -> usize {
        self.state.borrow().presents
    }

    fn check(&self, call: &'static str) -> NativeResult<()> {
        if self.state.borrow().failing.contains(call) {
            return Err(NativeError::failed(call, E_FAIL));
        }
        Ok(())
    }

    fn next_id(&self) -> u32 {
        self.state.borrow_mut().next_id()
    }
}

impl GraphicsDevice for RecordingDevice {
    type Context = RecordingContext;
    type SwapChain = RecordingSwapChain;

    fn create_device_context(&self, options: DeviceContextOptions) -> NativeResult<RecordingContext> {
        self.check("create_device_context")?;
        self.state.borrow_mut().contexts_created += 1;
        Ok(RecordingContext::new(self.clone(), options))
    }

    fn create_swap_chain_for_window(
        &self,
        _window: RawWindowHandle,
        desc: &SwapChainDescription,
    ) -> NativeResult<RecordingSwapChain> {
        self.check("create_swap_chain_for_window")?;
        self.state.borrow_mut().swap_chains_created += 1;
        Ok(RecordingSwapChain {
            device: self.clone(),
            size: (desc.width, desc.height),
            buffer_count: desc.buffer_count,
        })
    }
}

#[derive(Debug)]
pub struct RecordingSwapChain {
    device: RecordingDevice,
    size: (u32, u32),
    buffer_count: u32,
}

impl RecordingSwapChain {
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }
}

impl SwapChain<RecordingContext> for RecordingSwapChain {
    fn resize_buffers(&mut self, width: u32, height: u32) -> NativeResult<()> {
        self.device.check("resize_buffers")?;
        self.size = (width, height);
        Ok(())
    }

    fn back_buffer_target(&mut self, ctx: &mut RecordingContext) -> NativeResult<TargetId> {
        self.device.check("back_buffer_target")?;
        let dpi = ctx.dpi;
        Ok(ctx.add_target(self.size, dpi))
    }

    fn present(&mut self, _sync_interval: u32) -> NativeResult<()> {
        self.device.check("present")?;
        self.device.state.borrow_mut().presents += 1;
        Ok(())
    }
}

/// A resource handed back through one of the `release_*` calls.
#[derive(Debug, Clone, Copy)]
enum Released {
    Brush(BrushId),
    StrokeStyle(StrokeStyleId),
    Bitmap(BitmapId),
    Geometry(GeometryId),
    Target(TargetId),
}

/// A device context that records commands.
///
/// Released resources stay inspectable until the next `begin_draw`, so the commands of
/// the last session can still be resolved.
#[derive(Debug)]
pub struct RecordingContext {
    device: RecordingDevice,
    options: DeviceContextOptions,
    in_draw: bool,
    commands: Vec<Command>,
    created: FxHashMap<&'static str, usize>,
    brushes: FxHashMap<BrushId, BrushRecord>,
    stroke_styles: FxHashMap<StrokeStyleId, StrokeStyleProperties>,
    bitmaps: FxHashMap<BitmapId, Image>,
    geometries: FxHashMap<GeometryId, PathGeometry>,
    targets: FxHashMap<TargetId, ((u32, u32), Dpi)>,
    released: Vec<Released>,
    /// Released bitmaps a live brush still samples.
    orphans: FxHashSet<BitmapId>,
    target: Option<TargetId>,
    dpi: Dpi,
    transform: Affine,
    antialias_mode: AntialiasMode,
    text_antialias_mode: TextAntialiasMode,
    unit_mode: UnitMode,
    primitive_blend: PrimitiveBlend,
}

impl RecordingContext {
    fn new(device: RecordingDevice, options: DeviceContextOptions) -> Self {
        Self {
            device,
            options,
            in_draw: false,
            commands: Vec::new(),
            created: FxHashMap::default(),
            brushes: FxHashMap::default(),
            stroke_styles: FxHashMap::default(),
            bitmaps: FxHashMap::default(),
            geometries: FxHashMap::default(),
            targets: FxHashMap::default(),
            released: Vec::new(),
            orphans: FxHashSet::default(),
            target: None,
            dpi: Dpi::DEFAULT,
            transform: Affine::IDENTITY,
            antialias_mode: AntialiasMode::PerPrimitive,
            text_antialias_mode: TextAntialiasMode::Default,
            unit_mode: UnitMode::Dips,
            primitive_blend: PrimitiveBlend::SourceOver,
        }
    }

    pub fn options(&self) -> DeviceContextOptions {
        self.options
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// How many resources were created through the factory named `call`.
    pub fn created(&self, call: &str) -> usize {
        self.created.get(call).copied().unwrap_or(0)
    }

    pub fn brush(&self, id: BrushId) -> Option<&BrushRecord> {
        self.brushes.get(&id)
    }

    pub fn stroke_style(&self, id: StrokeStyleId) -> Option<&StrokeStyleProperties> {
        self.stroke_styles.get(&id)
    }

    pub fn bitmap(&self, id: BitmapId) -> Option<&Image> {
        self.bitmaps.get(&id)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&PathGeometry> {
        self.geometries.get(&id)
    }

    pub fn live_brushes(&self) -> usize {
        self.brushes.len()
    }

    pub fn live_stroke_styles(&self) -> usize {
        self.stroke_styles.len()
    }

    pub fn live_bitmaps(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// The bitmap currently bound as target.
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn is_drawing(&self) -> bool {
        self.in_draw
    }

    pub fn antialias_mode(&self) -> AntialiasMode {
        self.antialias_mode
    }

    pub fn text_antialias_mode(&self) -> TextAntialiasMode {
        self.text_antialias_mode
    }

    pub fn unit_mode(&self) -> UnitMode {
        self.unit_mode
    }

    pub fn primitive_blend(&self) -> PrimitiveBlend {
        self.primitive_blend
    }

    fn factory(&mut self, call: &'static str) -> NativeResult<u32> {
        self.device.check(call)?;
        *self.created.entry(call).or_default() += 1;
        Ok(self.device.next_id())
    }

    fn add_target(&mut self, size: (u32, u32), dpi: Dpi) -> TargetId {
        *self.created.entry("create_target_bitmap").or_default() += 1;
        let id = TargetId(self.device.next_id());
        self.targets.insert(id, (size, dpi));
        id
    }

    fn add_brush(&mut self, call: &'static str, kind: BrushKind) -> NativeResult<BrushId> {
        let id = BrushId(self.factory(call)?);
        self.brushes.insert(
            id,
            BrushRecord {
                kind,
                transform: Affine::IDENTITY,
                opacity: 1.0,
            },
        );
        Ok(id)
    }

    fn collect_released(&mut self) {
        for resource in std::mem::take(&mut self.released) {
            match resource {
                Released::Brush(id) => {
                    self.brushes.remove(&id);
                }
                Released::StrokeStyle(id) => {
                    self.stroke_styles.remove(&id);
                }
                Released::Bitmap(id) => {
                    self.orphans.insert(id);
                }
                Released::Geometry(id) => {
                    self.geometries.remove(&id);
                }
                Released::Target(id) => {
                    self.targets.remove(&id);
                }
            }
        }
        let sampled: FxHashSet<BitmapId> = self
            .brushes
            .values()
            .filter_map(|b| match b.kind {
                BrushKind::Bitmap { bitmap, .. } => Some(bitmap),
                _ => None,
            })
            .collect();
        let bitmaps = &mut self.bitmaps;
        self.orphans.retain(|id| {
            if sampled.contains(id) {
                return true;
            }
            bitmaps.remove(id);
            false
        });
    }

    fn device_width(&self, width: f32, style: Option<&StrokeStyleId>) -> f64 {
        let transform_type = style
            .and_then(|s| self.stroke_styles.get(s))
            .map(|p| p.transform_type)
            .unwrap_or_default();
        match transform_type {
            StrokeTransform::Hairline => 1.0,
            StrokeTransform::Fixed => width as f64,
            StrokeTransform::Normal => width as f64 * self.transform.determinant().abs().sqrt(),
        }
    }
}

impl DeviceContext for RecordingContext {
    type Brush = BrushId;
    type StrokeStyle = StrokeStyleId;
    type Bitmap = BitmapId;
    type GradientStops = RecordedStops;
    type Geometry = GeometryId;
    type FontFace = RecordedFont;
    type TargetBitmap = TargetId;

    fn begin_draw(&mut self) {
        self.collect_released();
        self.in_draw = true;
    }

    fn end_draw(&mut self) -> NativeResult<()> {
        if !std::mem::replace(&mut self.in_draw, false) {
            return Err(NativeError::NotInitialized);
        }
        if std::mem::replace(&mut self.device.state.borrow_mut().device_lost, false) {
            return Err(NativeError::RecreateTarget);
        }
        self.device.check("end_draw")
    }

    fn flush(&mut self) -> NativeResult<()> {
        self.device.check("flush")
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear(color));
    }

    fn set_target(&mut self, target: Option<&TargetId>) {
        self.target = target.copied();
    }

    fn create_target_bitmap(&mut self, width: u32, height: u32, dpi: Dpi) -> NativeResult<TargetId> {
        self.device.check("create_target_bitmap")?;
        Ok(self.add_target((width, height), dpi))
    }

    fn target_bitmap_size(&self, bitmap: &TargetId) -> (u32, u32) {
        self.targets.get(bitmap).map(|(size, _)| *size).unwrap_or((0, 0))
    }

    fn pixel_size(&self) -> (u32, u32) {
        match &self.target {
            Some(target) => self.target_bitmap_size(target),
            None => (0, 0),
        }
    }

    fn dpi(&self) -> Dpi {
        self.dpi
    }

    fn set_dpi(&mut self, dpi: Dpi) {
        self.dpi = dpi;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_antialias_mode(&mut self, mode: AntialiasMode) {
        self.antialias_mode = mode;
    }

    fn set_text_antialias_mode(&mut self, mode: TextAntialiasMode) {
        self.text_antialias_mode = mode;
    }

    fn set_unit_mode(&mut self, mode: UnitMode) {
        self.unit_mode = mode;
    }

    fn set_primitive_blend(&mut self, blend: PrimitiveBlend) {
        self.primitive_blend = blend;
    }

    fn create_solid_color_brush(&mut self, color: Color) -> NativeResult<BrushId> {
        self.add_brush("create_solid_color_brush", BrushKind::Solid(color))
    }

    fn create_bitmap(&mut self, image: &Image, _dpi: Dpi) -> NativeResult<BitmapId> {
        if !image.is_premultiplied() {
            return Err(NativeError::Unsupported("bitmaps without premultiplied alpha"));
        }
        let id = BitmapId(self.factory("create_bitmap")?);
        self.bitmaps.insert(id, image.clone());
        Ok(id)
    }

    fn bitmap_size(&self, bitmap: &BitmapId) -> Size {
        self.bitmaps
            .get(bitmap)
            .map(|img| Size::new(img.width() as f64, img.height() as f64))
            .unwrap_or(Size::ZERO)
    }

    fn create_bitmap_brush(&mut self, bitmap: &BitmapId, props: BitmapBrushProperties) -> NativeResult<BrushId> {
        self.add_brush(
            "create_bitmap_brush",
            BrushKind::Bitmap {
                bitmap: *bitmap,
                props,
            },
        )
    }

    fn create_gradient_stop_collection(&mut self, stops: &[GradientStop]) -> NativeResult<RecordedStops> {
        self.factory("create_gradient_stop_collection")?;
        Ok(RecordedStops(stops.to_vec()))
    }

    fn create_linear_gradient_brush(
        &mut self,
        props: LinearGradientProperties,
        stops: &RecordedStops,
    ) -> NativeResult<BrushId> {
        self.add_brush(
            "create_linear_gradient_brush",
            BrushKind::Linear {
                props,
                stops: stops.0.clone(),
            },
        )
    }

    fn create_radial_gradient_brush(
        &mut self,
        props: RadialGradientProperties,
        stops: &RecordedStops,
    ) -> NativeResult<BrushId> {
        self.add_brush(
            "create_radial_gradient_brush",
            BrushKind::Radial {
                props,
                stops: stops.0.clone(),
            },
        )
    }

    fn brush_transform(&self, brush: &BrushId) -> Affine {
        self.brushes.get(brush).map(|b| b.transform).unwrap_or(Affine::IDENTITY)
    }

    fn set_brush_transform(&mut self, brush: &BrushId, transform: Affine) {
        if let Some(record) = self.brushes.get_mut(brush) {
            record.transform = transform;
        }
    }

    fn set_brush_opacity(&mut self, brush: &BrushId, opacity: f32) {
        if let Some(record) = self.brushes.get_mut(brush) {
            record.opacity = opacity;
        }
    }

    fn create_stroke_style(&mut self, props: &StrokeStyleProperties) -> NativeResult<StrokeStyleId> {
        let id = StrokeStyleId(self.factory("create_stroke_style")?);
        self.stroke_styles.insert(id, *props);
        Ok(id)
    }

    fn create_path_geometry(&mut self, path: &PathGeometry) -> NativeResult<GeometryId> {
        let id = GeometryId(self.factory("create_path_geometry")?);
        self.geometries.insert(id, path.clone());
        Ok(id)
    }

    fn create_font_face(&mut self, desc: &FontDescription, family: &str) -> NativeResult<RecordedFont> {
        self.device.check("create_font_face")?;
        let known = self
            .device
            .state
            .borrow()
            .font_families
            .iter()
            .any(|f| f.eq_ignore_ascii_case(family));
        if !known {
            return Err(NativeError::failed("create_font_face", E_NOFONT));
        }
        *self.created.entry("create_font_face").or_default() += 1;
        Ok(RecordedFont {
            family: family.to_string(),
            description: desc.clone(),
        })
    }

    fn shape_text(&mut self, _face: &RecordedFont, text: &str, em_size: f32) -> NativeResult<ShapedText> {
        self.device.check("shape_text")?;
        let glyph_indices: Vec<u16> = text.chars().map(|c| (c as u32).min(u16::MAX as u32) as u16).collect();
        let advances = vec![em_size * GLYPH_ADVANCE; glyph_indices.len()];
        Ok(ShapedText {
            glyph_indices,
            advances,
        })
    }

    fn fill_rectangle(&mut self, rect: Rect, brush: &BrushId) {
        self.commands.push(Command::FillRectangle { rect, brush: *brush });
    }

    fn draw_rectangle(&mut self, rect: Rect, brush: &BrushId, width: f32, style: Option<&StrokeStyleId>) {
        let device_width = self.device_width(width, style);
        self.commands.push(Command::DrawRectangle {
            rect,
            brush: *brush,
            width,
            device_width,
            style: style.copied(),
        });
    }

    fn draw_line(&mut self, line: Line, brush: &BrushId, width: f32, style: Option<&StrokeStyleId>) {
        let device_width = self.device_width(width, style);
        self.commands.push(Command::DrawLine {
            line,
            brush: *brush,
            width,
            device_width,
            style: style.copied(),
        });
    }

    fn fill_geometry(&mut self, geometry: &GeometryId, brush: &BrushId) {
        self.commands.push(Command::FillGeometry {
            geometry: *geometry,
            brush: *brush,
        });
    }

    fn draw_geometry(&mut self, geometry: &GeometryId, brush: &BrushId, width: f32, style: Option<&StrokeStyleId>) {
        let device_width = self.device_width(width, style);
        self.commands.push(Command::DrawGeometry {
            geometry: *geometry,
            brush: *brush,
            width,
            device_width,
            style: style.copied(),
        });
    }

    fn fill_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, brush: &BrushId) {
        self.commands.push(Command::FillEllipse {
            center,
            radius_x,
            radius_y,
            brush: *brush,
        });
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &BitmapId,
        dest: Rect,
        opacity: f32,
        interpolation: InterpolationMode,
        source: Option<Rect>,
    ) {
        self.commands.push(Command::DrawBitmap {
            bitmap: *bitmap,
            dest,
            opacity,
            interpolation,
            source,
        });
    }

    fn draw_glyph_run(&mut self, baseline_origin: Point, run: &GlyphRun<'_, RecordedFont>, brush: &BrushId) {
        self.commands.push(Command::DrawGlyphRun {
            origin: baseline_origin,
            family: run.font_face.family.clone(),
            em_size: run.em_size,
            glyphs: run.glyph_indices.to_vec(),
            advances: run.advances.to_vec(),
            brush: *brush,
        });
    }

    fn release_brush(&mut self, brush: BrushId) {
        self.released.push(Released::Brush(brush));
    }

    fn release_stroke_style(&mut self, style: StrokeStyleId) {
        self.released.push(Released::StrokeStyle(style));
    }

    fn release_bitmap(&mut self, bitmap: BitmapId) {
        self.released.push(Released::Bitmap(bitmap));
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        self.released.push(Released::Geometry(geometry));
    }

    fn release_target_bitmap(&mut self, bitmap: TargetId) {
        self.released.push(Released::Target(bitmap));
    }
}
