use kurbo::{Affine, Line, Point, Rect};
use paintbridge::native::{ExtendMode, GradientStop, InterpolationMode, PrimitiveBlend, AntialiasMode};
use paintbridge::recording::{BrushKind, Command, RecordingContext, RecordingDevice};
use paintbridge::{
    BitmapTarget, Brush, BrushStyle, ColorStop, CompositionMode, ConicalGradient, DirtyFlags, EngineConfig,
    FillRule, FontDescription, Image, IntPoint, IntRect, PaintSession, PainterState, Path, Pen, PenStyle,
    RenderHints, RenderTarget, TextItem,
};
use peniko::Color;

const RED: Color = Color::new([1.0, 0.0, 0.0, 1.0]);
const BLUE: Color = Color::new([0.0, 0.0, 1.0, 1.0]);

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn target(device: &RecordingDevice) -> BitmapTarget<RecordingDevice> {
    init_logging();
    BitmapTarget::new(device.clone(), EngineConfig::default())
}

fn ctx(target: &BitmapTarget<RecordingDevice>) -> &RecordingContext {
    target.context().expect("target has a context")
}

fn paint(
    target: &mut BitmapTarget<RecordingDevice>,
    state: &PainterState,
    f: impl FnOnce(&mut PaintSession<'_, BitmapTarget<RecordingDevice>>),
) -> bool {
    let mut session = PaintSession::begin(target, state).expect("session opens");
    f(&mut session);
    session.end()
}

fn red_fill_black_pen() -> PainterState {
    PainterState {
        brush: Brush::solid(RED),
        pen: Pen::new(Brush::solid(Color::BLACK), 2.0),
        ..Default::default()
    }
}

#[test]
fn rect_is_filled_then_stroked_on_snapped_edges() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = red_fill_black_pen();
    assert!(paint(&mut target, &state, |s| s.draw_rects(&[Rect::new(0.0, 0.0, 100.0, 50.0)])));

    let ctx = ctx(&target);
    let [Command::FillRectangle { rect: fill, brush }, Command::DrawRectangle { rect: stroke, width, style, .. }] =
        ctx.commands()
    else {
        panic!("unexpected commands: {:?}", ctx.commands());
    };
    assert_eq!(*fill, Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(*stroke, Rect::new(-0.5, -0.5, 100.5, 50.5));
    assert_eq!(*width, 2.0);
    assert!(style.is_some());
    let Some(BrushKind::Solid(color)) = ctx.brush(*brush).map(|b| &b.kind) else {
        panic!("fill brush is not solid");
    };
    assert_eq!(color.components, RED.components);
}

#[test]
fn integer_rects_are_not_snapped() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    paint(&mut target, &red_fill_black_pen(), |s| s.draw_int_rects(&[IntRect::new(1, 2, 10, 20)]));
    let strokes: Vec<Rect> = ctx(&target)
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawRectangle { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(strokes, vec![Rect::new(1.0, 2.0, 11.0, 22.0)]);
}

#[test]
fn pen_width_follows_cosmetic_and_hairline_rules() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let mut state = PainterState::default();
    let line = Line::new((0.0, 10.0), (100.0, 10.0));
    let pens = [
        (Pen::new(Brush::solid(Color::BLACK), 0.0), 1.0),
        (Pen::new(Brush::solid(Color::BLACK), 2.0).with_cosmetic(true), 2.0),
        (Pen::new(Brush::solid(Color::BLACK), 2.0), 6.0),
    ];
    paint(&mut target, &state.clone(), |s| {
        state.transform = Affine::scale(3.0);
        s.update_state(DirtyFlags::TRANSFORM, &state);
        for (pen, _) in &pens {
            state.pen = pen.clone();
            s.update_state(DirtyFlags::PEN, &state);
            s.draw_lines(&[line]);
        }
    });
    let widths: Vec<f64> = ctx(&target)
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawLine { device_width, line: drawn, .. } => {
                assert_eq!(*drawn, line);
                Some(*device_width)
            }
            _ => None,
        })
        .collect();
    let expected: Vec<f64> = pens.iter().map(|(_, w)| *w).collect();
    assert_eq!(widths.len(), expected.len());
    for (got, want) in widths.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
    }
}

#[test]
fn positively_sloped_lines_are_nudged_up() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    paint(&mut target, &PainterState::default(), |s| {
        s.draw_lines(&[Line::new((0.0, 0.0), (10.0, 10.0)), Line::new((0.0, 10.0), (10.0, 0.0))]);
    });
    let lines: Vec<Line> = ctx(&target)
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawLine { line, .. } => Some(*line),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![Line::new((0.0, -0.5), (10.0, 9.5)), Line::new((0.0, 10.0), (10.0, 0.0))]
    );
}

#[test]
fn resources_are_rebuilt_only_for_dirty_changes() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let mut state = red_fill_black_pen();
    let solid = "create_solid_color_brush";

    paint(&mut target, &state.clone(), |s| {
        // A transform-only update keeps brush and pen.
        state.transform = Affine::translate((5.0, 5.0));
        s.update_state(DirtyFlags::TRANSFORM, &state);
        // Dirty bit set but nothing changed.
        s.update_state(DirtyFlags::BRUSH | DirtyFlags::PEN | DirtyFlags::OPACITY, &state);
        // Changed but not flagged.
        state.brush = Brush::solid(BLUE);
        s.update_state(DirtyFlags::HINTS, &state);
    });
    assert_eq!(ctx(&target).created(solid), 2);
    assert_eq!(ctx(&target).created("create_stroke_style"), 1);

    paint(&mut target, &red_fill_black_pen(), |s| {
        s.update_state(DirtyFlags::BRUSH, &state);
    });
    // Session start forces brush and pen, then the flagged brush change adds one.
    assert_eq!(ctx(&target).created(solid), 5);
    assert_eq!(ctx(&target).created("create_stroke_style"), 2);

    let before = target.parts_mut().unwrap().1.brush_resource().copied();
    paint(&mut target, &state.clone(), |s| {
        state.opacity = 0.5;
        s.update_state(DirtyFlags::OPACITY, &state);
    });
    // Forced pair at begin, then brush and pen again for the new opacity.
    assert_eq!(ctx(&target).created(solid), 9);
    let (ctx, engine) = target.parts_mut().unwrap();
    let brush = engine.brush_resource().copied().unwrap();
    assert_ne!(Some(brush), before);
    assert_eq!(ctx.brush(brush).unwrap().opacity, 0.5);
}

#[test]
fn brush_origin_replaces_instead_of_accumulating() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let gradient = Brush::linear(
        Point::ZERO,
        Point::new(10.0, 0.0),
        vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)],
    )
    .with_transform(Affine::scale(2.0));
    let mut state = PainterState {
        brush: gradient,
        ..Default::default()
    };

    let transform = |target: &mut BitmapTarget<RecordingDevice>| {
        let (ctx, engine) = target.parts_mut().unwrap();
        ctx.brush(*engine.brush_resource().unwrap()).unwrap().transform
    };

    paint(&mut target, &state.clone(), |s| {
        state.brush_origin = Point::new(10.0, 5.0);
        s.update_state(DirtyFlags::BRUSH_ORIGIN, &state);
    });
    let once = transform(&mut target);
    assert_eq!(once, Affine::translate((10.0, 5.0)) * Affine::scale(2.0));

    paint(&mut target, &state.clone(), |s| {
        s.update_state(DirtyFlags::BRUSH_ORIGIN, &state);
        s.update_state(DirtyFlags::BRUSH_ORIGIN, &state);
    });
    assert_eq!(transform(&mut target), once);

    paint(&mut target, &state.clone(), |s| {
        state.brush_origin = Point::new(2.0, 0.0);
        s.update_state(DirtyFlags::BRUSH_ORIGIN, &state);
    });
    assert_eq!(transform(&mut target), Affine::translate((2.0, 0.0)) * Affine::scale(2.0));
}

#[test]
fn tiled_pixmap_clamps_last_row_and_column() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let tile = Image::filled(32, 32, Color::WHITE);
    paint(&mut target, &PainterState::default(), |s| {
        s.draw_tiled_pixmap(Rect::new(0.0, 0.0, 100.0, 70.0), &tile, Point::ZERO);
    });
    let ctx = ctx(&target);
    let draws: Vec<(Rect, Option<Rect>)> = ctx
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawBitmap { dest, source, .. } => Some((*dest, *source)),
            _ => None,
        })
        .collect();
    assert_eq!(draws.len(), 4 * 3);
    assert_eq!(ctx.created("create_bitmap"), 1);
    assert_eq!(draws[0], (Rect::new(0.0, 0.0, 32.0, 32.0), Some(Rect::new(0.0, 0.0, 32.0, 32.0))));
    assert_eq!(draws[3].0, Rect::new(96.0, 0.0, 100.0, 32.0));
    assert_eq!(draws[11], (Rect::new(96.0, 64.0, 100.0, 70.0), Some(Rect::new(0.0, 0.0, 4.0, 6.0))));
    assert!(draws.iter().all(|(dest, _)| dest.x1 <= 100.0 && dest.y1 <= 70.0));
}

#[test]
fn gradient_stops_pass_through_unchanged() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = PainterState {
        brush: Brush::linear(
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)],
        ),
        ..Default::default()
    };
    paint(&mut target, &state, |_| {});
    let (ctx, engine) = target.parts_mut().unwrap();
    let Some(BrushKind::Linear { props, stops }) = ctx.brush(*engine.brush_resource().unwrap()).map(|b| &b.kind)
    else {
        panic!("expected a linear gradient brush");
    };
    assert_eq!(props.end, Point::new(0.0, 100.0));
    assert_eq!(
        stops,
        &vec![
            GradientStop { position: 0.0, color: RED },
            GradientStop { position: 1.0, color: BLUE },
        ]
    );
}

#[test]
fn radial_gradient_uses_focal_offset_and_one_radius() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = PainterState {
        brush: Brush::radial(Point::new(50.0, 50.0), Point::new(60.0, 45.0), 25.0, vec![ColorStop::new(0.0, RED)]),
        ..Default::default()
    };
    paint(&mut target, &state, |_| {});
    let (ctx, engine) = target.parts_mut().unwrap();
    let Some(BrushKind::Radial { props, .. }) = ctx.brush(*engine.brush_resource().unwrap()).map(|b| &b.kind)
    else {
        panic!("expected a radial gradient brush");
    };
    assert_eq!(props.origin_offset, kurbo::Vec2::new(10.0, -5.0));
    assert_eq!((props.radius_x, props.radius_y), (25.0, 25.0));
}

#[test]
fn conical_gradient_fills_nothing() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = PainterState {
        brush: Brush::with_style(
            BrushStyle::ConicalGradient(ConicalGradient {
                center: Point::ZERO,
                angle: 0.0,
                stops: vec![ColorStop::new(0.0, RED)],
            }),
            RED,
        ),
        pen: Pen::none(),
        ..Default::default()
    };
    paint(&mut target, &state, |s| {
        s.draw_rects(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        s.draw_points(&[Point::new(1.0, 1.0)]);
    });
    assert!(ctx(&target).commands().is_empty());
    assert!(target.parts_mut().unwrap().1.brush_resource().is_none());
}

#[test]
fn hatch_brush_tiles_an_eight_pixel_bitmap() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = PainterState {
        brush: Brush::with_style(BrushStyle::Cross, BLUE),
        ..Default::default()
    };
    paint(&mut target, &state, |_| {});
    let (ctx, engine) = target.parts_mut().unwrap();
    let Some(BrushKind::Bitmap { bitmap, props }) = ctx.brush(*engine.brush_resource().unwrap()).map(|b| &b.kind)
    else {
        panic!("expected a bitmap brush");
    };
    assert_eq!((props.extend_mode_x, props.extend_mode_y), (ExtendMode::Wrap, ExtendMode::Wrap));
    assert_eq!(props.interpolation_mode, InterpolationMode::NearestNeighbor);
    let image = ctx.bitmap(*bitmap).unwrap();
    assert_eq!((image.width(), image.height()), (8, 8));
    // Row 3 of the cross pattern is fully set.
    assert!(image.row(3).chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn path_is_filled_then_stroked() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let mut path = Path::new().with_fill_rule(FillRule::Winding);
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 0.0));
    path.cubic_to((10.0, 5.0), (5.0, 10.0), (0.0, 10.0));
    paint(&mut target, &red_fill_black_pen(), |s| {
        s.draw_path(&path);
        s.draw_path(&Path::new());
    });
    let ctx = ctx(&target);
    let [Command::FillGeometry { geometry: filled, .. }, Command::DrawGeometry { geometry: stroked, width, .. }] =
        ctx.commands()
    else {
        panic!("unexpected commands: {:?}", ctx.commands());
    };
    assert_eq!(filled, stroked);
    assert_eq!(*width, 2.0);
    let geometry = ctx.geometry(*filled).unwrap();
    assert_eq!(geometry.fill_rule, peniko::Fill::NonZero);
    assert_eq!(geometry.figures.len(), 1);
    assert_eq!(geometry.figures[0].segments.len(), 2);
    assert!(geometry.figures[0].closed);
}

#[test]
fn point_overloads_use_brush_or_pen() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    paint(&mut target, &red_fill_black_pen(), |s| {
        s.draw_points(&[Point::new(1.0, 2.0)]);
        s.draw_int_points(&[IntPoint::new(3, 4)]);
        s.draw_polygon(&[Point::ZERO, Point::new(5.0, 0.0), Point::new(0.0, 5.0)]);
    });
    let (ctx, engine) = target.parts_mut().unwrap();
    let fill = *engine.brush_resource().unwrap();
    let stroke = *engine.pen_brush_resource().unwrap();
    let ellipses: Vec<_> = ctx
        .commands()
        .iter()
        .map(|c| match c {
            Command::FillEllipse {
                center,
                radius_x,
                radius_y,
                brush,
            } => (*center, *radius_x, *radius_y, *brush),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        ellipses,
        vec![(Point::new(1.0, 2.0), 1.0, 1.0, fill), (Point::new(3.0, 4.0), 1.0, 1.0, stroke)]
    );
}

#[test]
fn images_are_uploaded_per_call_at_source_size() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let image = Image::filled(64, 48, RED);
    let state = PainterState {
        render_hints: RenderHints::SMOOTH_PIXMAP_TRANSFORM,
        ..Default::default()
    };
    paint(&mut target, &state, |s| {
        s.draw_image(Rect::new(0.0, 0.0, 100.0, 100.0), &image, Rect::new(8.0, 8.0, 24.0, 40.0));
        s.draw_pixmap(Rect::new(0.0, 0.0, 64.0, 48.0), &image, Rect::new(0.0, 0.0, 64.0, 48.0));
    });
    let ctx = ctx(&target);
    assert_eq!(ctx.created("create_bitmap"), 2);
    let Command::DrawBitmap {
        bitmap,
        dest,
        interpolation,
        source,
        ..
    } = &ctx.commands()[0]
    else {
        panic!("expected a bitmap draw");
    };
    let uploaded = ctx.bitmap(*bitmap).unwrap();
    assert_eq!((uploaded.width(), uploaded.height()), (16, 32));
    assert_eq!(*dest, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(*interpolation, InterpolationMode::Linear);
    assert!(source.is_none());
}

#[test]
fn per_frame_resources_do_not_accumulate() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let image = Image::filled(64, 64, RED);
    let mut path = Path::new();
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 10.0));
    let mut state = red_fill_black_pen();
    for frame in 0..50 {
        state.opacity = if frame % 2 == 0 { 1.0 } else { 0.5 };
        paint(&mut target, &state, |s| {
            s.draw_image(Rect::new(0.0, 0.0, 64.0, 64.0), &image, Rect::new(0.0, 0.0, 64.0, 64.0));
            s.draw_tiled_pixmap(Rect::new(0.0, 0.0, 100.0, 100.0), &image, Point::ZERO);
            s.draw_path(&path);
        });
    }
    assert!(target.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), BLUE));

    let ctx = ctx(&target);
    assert_eq!(ctx.created("create_bitmap"), 100);
    assert_eq!(ctx.created("create_path_geometry"), 50);
    // What is left is the last frame's uploads plus the cached brush and pen.
    assert!(ctx.live_bitmaps() <= 2, "{} bitmaps alive", ctx.live_bitmaps());
    assert!(ctx.live_geometries() <= 1);
    assert!(ctx.live_brushes() <= 3);
    assert!(ctx.live_stroke_styles() <= 1);
}

#[test]
fn out_of_range_source_rects_draw_nothing() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let image = Image::filled(4, 4, Color::BLACK);
    let done = paint(&mut target, &PainterState::default(), |s| {
        s.draw_image(Rect::new(0.0, 0.0, 4.0, 4.0), &image, Rect::new(2.0e9, 0.0, 4.0e9, 1.0));
        s.draw_image(Rect::new(0.0, 0.0, 4.0, 4.0), &image, Rect::new(-1.0e12, -1.0e12, 1.0e12, 1.0e12));
    });
    assert!(done);
    let ctx = ctx(&target);
    // Only the second call overlaps the image, and it is clipped to the whole image.
    assert_eq!(ctx.created("create_bitmap"), 1);
    let bitmaps: Vec<_> = ctx
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawBitmap { bitmap, .. } => Some(*bitmap),
            _ => None,
        })
        .collect();
    assert_eq!(bitmaps.len(), 1);
    let uploaded = ctx.bitmap(bitmaps[0]).unwrap();
    assert_eq!((uploaded.width(), uploaded.height()), (4, 4));
}

#[test]
fn text_uses_cached_font_and_pen_brush() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let item = TextItem::new("Hi", FontDescription::new("Segoe UI", 12));
    paint(&mut target, &PainterState::default(), |s| {
        s.draw_text_item(Point::new(5.0, 20.0), &item);
        s.draw_text_item(Point::new(5.0, 40.0), &item);
    });
    let (ctx, engine) = target.parts_mut().unwrap();
    assert_eq!(ctx.created("create_font_face"), 1);
    assert_eq!(engine.cached_font_count(), 1);
    let pen_brush = *engine.pen_brush_resource().unwrap();
    let Command::DrawGlyphRun {
        origin,
        family,
        em_size,
        glyphs,
        advances,
        brush,
    } = &ctx.commands()[0]
    else {
        panic!("expected a glyph run");
    };
    assert_eq!(*origin, Point::new(5.0, 20.0));
    assert_eq!(family, "Segoe UI");
    assert_eq!(*em_size, 16.0);
    assert_eq!(glyphs, &vec!['H' as u16, 'i' as u16]);
    assert_eq!(advances.len(), 2);
    assert_eq!(*brush, pen_brush);
}

#[test]
fn unknown_font_falls_back_and_is_cached() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let item = TextItem::new("x", FontDescription::new("No Such Face", 10));
    paint(&mut target, &PainterState::default(), |s| {
        s.draw_text_item(Point::ZERO, &item);
        s.draw_text_item(Point::ZERO, &item);
    });
    let (ctx, engine) = target.parts_mut().unwrap();
    assert_eq!(ctx.created("create_font_face"), 1);
    assert_eq!(engine.cached_font_count(), 1);
    let families: Vec<&str> = ctx
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::DrawGlyphRun { family, .. } => Some(family.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(families, vec!["Arial", "Arial"]);
}

#[test]
fn text_is_skipped_when_fallback_fails_too() {
    let device = RecordingDevice::with_fonts(&[]);
    let mut target = target(&device);
    let item = TextItem::new("x", FontDescription::new("Segoe UI", 10));
    paint(&mut target, &PainterState::default(), |s| s.draw_text_item(Point::ZERO, &item));
    let (ctx, engine) = target.parts_mut().unwrap();
    assert!(ctx.commands().is_empty());
    assert_eq!(engine.cached_font_count(), 0);
}

#[test]
fn composition_and_hints_reach_the_context() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let mut state = PainterState::default();
    paint(&mut target, &state.clone(), |s| {
        state.composition_mode = CompositionMode::Multiply;
        state.render_hints = RenderHints::ANTIALIASING;
        s.update_state(DirtyFlags::COMPOSITION_MODE | DirtyFlags::HINTS, &state);
    });
    assert_eq!(ctx(&target).primitive_blend(), PrimitiveBlend::Copy);
    assert_eq!(ctx(&target).antialias_mode(), AntialiasMode::PerPrimitive);

    paint(&mut target, &state.clone(), |s| {
        state.composition_mode = CompositionMode::SourceOver;
        s.update_state(DirtyFlags::COMPOSITION_MODE, &state);
    });
    assert_eq!(ctx(&target).primitive_blend(), PrimitiveBlend::SourceOver);
}

#[test]
fn custom_dash_pen_does_not_stroke() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    let state = PainterState {
        brush: Brush::solid(RED),
        pen: Pen::new(Brush::solid(Color::BLACK), 1.0).with_style(PenStyle::CustomDash),
        ..Default::default()
    };
    paint(&mut target, &state, |s| {
        s.draw_rects(&[Rect::new(0.0, 0.0, 5.0, 5.0)]);
        s.draw_lines(&[Line::new((0.0, 0.0), (5.0, 0.0))]);
    });
    let ctx = ctx(&target);
    assert_eq!(ctx.commands().len(), 1);
    assert!(matches!(ctx.commands()[0], Command::FillRectangle { .. }));
}

#[test]
fn failed_brush_skips_only_the_fill() {
    let device = RecordingDevice::new();
    let mut target = target(&device);
    target.ensure_init();
    let state = PainterState {
        brush: Brush::linear(Point::ZERO, Point::new(1.0, 0.0), vec![ColorStop::new(0.0, RED)]),
        pen: Pen::new(Brush::solid(Color::BLACK), 1.0),
        ..Default::default()
    };
    device.fail("create_linear_gradient_brush");
    paint(&mut target, &state, |s| s.draw_rects(&[Rect::new(0.0, 0.0, 5.0, 5.0)]));
    let ctx = ctx(&target);
    assert_eq!(ctx.commands().len(), 1);
    assert!(matches!(ctx.commands()[0], Command::DrawRectangle { .. }));
}
