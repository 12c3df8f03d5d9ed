//! End-to-end checks from recorded instructions down to shape primitives

use tessel_core::{Affine2D, Color, Point, Shape};
use tessel_paint::curves::build_adaptive_bezier;
use tessel_paint::{
    GraphicsContext, GraphicsPath, PathError, PathInstruction, StrokeOptions, MAX_BEZIER_SMOOTHNESS,
};

#[test]
fn test_degenerate_straight_bezier_does_not_subdivide() {
    let start = Point::new(0.0, 0.0);
    let end = Point::new(90.0, 0.0);
    let cp1 = Point::new(30.0, 0.0);
    let cp2 = Point::new(60.0, 0.0);

    let mut smoothness = 0.0;
    while smoothness <= MAX_BEZIER_SMOOTHNESS {
        let mut points = Vec::new();
        build_adaptive_bezier(&mut points, start, cp1, cp2, end, smoothness);
        assert!(
            points.len() / 2 <= 2,
            "smoothness {smoothness} produced {} points",
            points.len() / 2
        );
        assert_eq!(&points[points.len() - 2..], &[90.0, 0.0]);
        assert!(points.chunks(2).all(|p| p[1] == 0.0));
        smoothness += 0.09;
    }
}

#[test]
fn test_curved_bezier_gains_points_with_smoothness() {
    let flatten = |smoothness: f32| {
        let mut points = Vec::new();
        build_adaptive_bezier(
            &mut points,
            Point::new(0.0, 0.0),
            Point::new(0.0, 200.0),
            Point::new(200.0, 200.0),
            Point::new(200.0, 0.0),
            smoothness,
        );
        points.len() / 2
    };
    assert!(flatten(0.9) >= flatten(0.1));
    assert!(flatten(0.1) > 2);
}

#[test]
fn test_svg_path_resolves_to_closed_polygon() {
    let path = GraphicsPath::from_svg("M 10 10 h 80 v 80 h -80 Z").unwrap();
    let primitives = path.shape_path().primitives();
    assert_eq!(primitives.len(), 1);
    match &primitives[0].shape {
        Shape::Polygon(poly) => {
            assert!(poly.closed);
            assert_eq!(poly.points, vec![10.0, 10.0, 90.0, 10.0, 90.0, 90.0, 10.0, 90.0]);
        }
        other => panic!("expected polygon, got {other:?}"),
    }
    let bounds = path.bounds();
    assert_eq!((bounds.min_x, bounds.max_y), (10.0, 90.0));
}

#[test]
fn test_svg_errors_are_fatal() {
    assert_eq!(
        GraphicsPath::from_svg("L 10 10").unwrap_err(),
        PathError::MissingMoveTo
    );
    assert!(matches!(
        GraphicsPath::from_svg("M0 0 C 1 2 3 4 5"),
        Err(PathError::MissingArguments { command: 'C', .. })
    ));
    assert!(matches!(
        GraphicsPath::from_svg("M0 0 X 5"),
        Err(PathError::UnexpectedCharacter { found: 'X', .. })
    ));
}

#[test]
fn test_add_path_under_transform_and_path_transform() {
    let mut inner = GraphicsPath::new();
    inner.rect(0.0, 0.0, 10.0, 10.0, None);

    let mut outer = GraphicsPath::new();
    outer.add_path(&inner, Some(Affine2D::translation(50.0, 0.0)));
    let bounds = outer.bounds();
    assert_eq!((bounds.min_x, bounds.max_x), (50.0, 60.0));

    outer.transform(&Affine2D::scale(2.0, 2.0));
    let bounds = outer.bounds();
    assert_eq!((bounds.min_x, bounds.max_x), (100.0, 120.0));
    assert_eq!(bounds.max_y, 20.0);
}

#[test]
fn test_context_records_independent_copies() {
    let mut ctx = GraphicsContext::new();
    ctx.move_to(0.0, 0.0)
        .line_to(10.0, 0.0)
        .line_to(10.0, 10.0)
        .fill_with(Color::GREEN);
    ctx.line_to(20.0, 20.0).stroke_with(StrokeOptions {
        width: Some(2.0),
        ..StrokeOptions::default()
    });

    let first = ctx.instructions()[0].path().unwrap();
    assert_eq!(first.instructions().len(), 3);
    let second = ctx.instructions()[1].path().unwrap();
    assert_eq!(
        second.instructions(),
        &[
            PathInstruction::MoveTo(Point::new(10.0, 10.0)),
            PathInstruction::LineTo(Point::new(20.0, 20.0)),
        ]
    );
}

#[test]
fn test_stroke_hit_testing_respects_width() {
    let mut ctx = GraphicsContext::new();
    ctx.rect(0.0, 0.0, 100.0, 100.0).stroke_with(StrokeOptions {
        width: Some(10.0),
        ..StrokeOptions::default()
    });
    assert!(ctx.contains_point(Point::new(2.0, 50.0)));
    assert!(ctx.contains_point(Point::new(-3.0, 50.0)));
    assert!(!ctx.contains_point(Point::new(50.0, 50.0)));
}

#[test]
fn test_rotated_context_hit_test() {
    let mut ctx = GraphicsContext::new();
    ctx.translate(50.0, 50.0)
        .rotate(std::f32::consts::FRAC_PI_4)
        .rect(-10.0, -10.0, 20.0, 20.0)
        .fill();
    assert!(ctx.contains_point(Point::new(50.0, 50.0)));
    // The rotated square's corner reaches ~14.1 along the axes
    assert!(ctx.contains_point(Point::new(63.0, 50.0)));
    assert!(!ctx.contains_point(Point::new(62.0, 62.0)));
}

#[derive(Clone, Default)]
struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_skewed_arc_transform_is_logged() {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut path = GraphicsPath::new();
        path.arc(0.0, 0.0, 5.0, 0.0, std::f32::consts::PI, false);
        path.transform(&Affine2D::new(1.0, 0.0, 0.5, 1.0, 0.0, 0.0));
    });

    let logs = capture.contents();
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("left untransformed"), "{logs}");
}
