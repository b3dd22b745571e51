//! Toolkit path data and its translation into native path geometry.

use kurbo::{BezPath, PathEl, Point};
use peniko::Fill;

use crate::native::{Figure, PathGeometry, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    OddEven,
    Winding,
}

impl From<FillRule> for Fill {
    fn from(rule: FillRule) -> Self {
        match rule {
            FillRule::Winding => Fill::NonZero,
            FillRule::OddEven => Fill::EvenOdd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    MoveTo,
    LineTo,
    /// First control point of a cubic; followed by two `CurveToData` elements
    /// (second control point, then end point).
    CurveTo,
    CurveToData,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathElement {
    pub kind: ElementKind,
    pub point: Point,
}

/// Flat element list, the way the host toolkit hands paths over.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub fill_rule: FillRule,
    pub elements: Vec<PathElement>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn push(&mut self, kind: ElementKind, point: impl Into<Point>) {
        self.elements.push(PathElement {
            kind,
            point: point.into(),
        });
    }

    pub fn move_to(&mut self, p: impl Into<Point>) {
        self.push(ElementKind::MoveTo, p);
    }

    pub fn line_to(&mut self, p: impl Into<Point>) {
        self.push(ElementKind::LineTo, p);
    }

    pub fn cubic_to(&mut self, c1: impl Into<Point>, c2: impl Into<Point>, p: impl Into<Point>) {
        self.push(ElementKind::CurveTo, c1);
        self.push(ElementKind::CurveToData, c2);
        self.push(ElementKind::CurveToData, p);
    }

    /// Converts a kurbo path. Quadratic segments are raised to cubics; a close
    /// becomes a line back to the subpath start.
    pub fn from_bez_path(bez: &BezPath, fill_rule: FillRule) -> Self {
        let mut path = Path::new().with_fill_rule(fill_rule);
        let mut start = Point::ZERO;
        let mut current = Point::ZERO;
        for el in bez.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    path.move_to(p);
                    start = p;
                    current = p;
                }
                PathEl::LineTo(p) => {
                    path.line_to(p);
                    current = p;
                }
                PathEl::QuadTo(q, p) => {
                    let c1 = current + (q - current) * 2.0 / 3.0;
                    let c2 = p + (q - p) * 2.0 / 3.0;
                    path.cubic_to(c1, c2, p);
                    current = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    path.cubic_to(c1, c2, p);
                    current = p;
                }
                PathEl::ClosePath => {
                    if current != start {
                        path.line_to(start);
                    }
                    current = start;
                }
            }
        }
        path
    }

    /// Builds native geometry. Every figure but the last is left open; the last one
    /// is closed. Returns `None` for a path without elements.
    pub fn to_geometry(&self) -> Option<PathGeometry> {
        let mut figures = Vec::new();
        let mut open: Option<Figure> = None;
        let mut i = 0;
        while i < self.elements.len() {
            let el = self.elements[i];
            match el.kind {
                ElementKind::MoveTo => {
                    figures.extend(open.take());
                    open = Some(Figure {
                        start: el.point,
                        segments: Vec::new(),
                        closed: false,
                    });
                }
                ElementKind::LineTo => match open.as_mut() {
                    Some(fig) => fig.segments.push(Segment::Line(el.point)),
                    None => {
                        open = Some(Figure {
                            start: el.point,
                            segments: Vec::new(),
                            closed: false,
                        })
                    }
                },
                ElementKind::CurveTo => {
                    let data = self.elements.get(i + 1..i + 3);
                    if let (Some(fig), Some([c2, end])) = (open.as_mut(), data) {
                        fig.segments.push(Segment::Cubic(el.point, c2.point, end.point));
                    }
                    i += 2;
                }
                // Consumed together with the CurveTo that precedes it.
                ElementKind::CurveToData => {}
            }
            i += 1;
        }
        let mut last = open?;
        last.closed = true;
        figures.push(last);
        Some(PathGeometry {
            fill_rule: self.fill_rule.into(),
            figures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn cubic_consumes_two_data_elements() {
        let mut path = Path::new();
        path.move_to((0.0, 0.0));
        path.cubic_to((1.0, 2.0), (3.0, 4.0), (5.0, 6.0));
        path.line_to((7.0, 8.0));
        let geom = path.to_geometry().unwrap();
        assert_eq!(geom.figures.len(), 1);
        assert_eq!(
            geom.figures[0].segments,
            vec![
                Segment::Cubic(Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)),
                Segment::Line(Point::new(7.0, 8.0)),
            ]
        );
        assert!(geom.figures[0].closed);
    }

    #[test]
    fn inner_figures_stay_open() {
        let mut path = Path::new().with_fill_rule(FillRule::Winding);
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.move_to((5.0, 5.0));
        path.line_to((6.0, 5.0));
        let geom = path.to_geometry().unwrap();
        assert_eq!(geom.fill_rule, Fill::NonZero);
        let closed: Vec<bool> = geom.figures.iter().map(|f| f.closed).collect();
        assert_eq!(closed, vec![false, true]);
        assert_eq!(geom.figures[1].start, Point::new(5.0, 5.0));
    }

    #[test]
    fn empty_path_has_no_geometry() {
        assert!(Path::new().to_geometry().is_none());
    }

    #[test]
    fn truncated_curve_is_dropped() {
        let mut path = Path::new();
        path.move_to((0.0, 0.0));
        path.push(ElementKind::CurveTo, (1.0, 1.0));
        path.push(ElementKind::CurveToData, (2.0, 2.0));
        let geom = path.to_geometry().unwrap();
        assert!(geom.figures[0].segments.is_empty());
    }

    #[test]
    fn converts_kurbo_shapes() {
        let rect = kurbo::Rect::new(0.0, 0.0, 10.0, 5.0).to_path(0.1);
        let path = Path::from_bez_path(&rect, FillRule::OddEven);
        let kinds: Vec<ElementKind> = path.elements.iter().map(|e| e.kind).collect();
        assert_eq!(kinds[0], ElementKind::MoveTo);
        assert!(kinds[1..].iter().all(|k| *k == ElementKind::LineTo));
        assert_eq!(path.elements.last().unwrap().point, Point::ZERO);

        let mut quad = BezPath::new();
        quad.move_to((0.0, 0.0));
        quad.quad_to((3.0, 3.0), (6.0, 0.0));
        let path = Path::from_bez_path(&quad, FillRule::OddEven);
        assert_eq!(path.elements[1].point, Point::new(2.0, 2.0));
        assert_eq!(path.elements[2].point, Point::new(4.0, 2.0));
        assert_eq!(path.elements[3].point, Point::new(6.0, 0.0));
    }
}
