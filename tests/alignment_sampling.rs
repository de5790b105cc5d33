use std::f64::consts::PI;

use road_cad::alignment::{Alignment, ArcElement, LineElement, Side};
use road_cad::geometry::{distance, Point, Polyline};

#[test]
fn line_sample_spacing_and_endpoints() {
    let line = LineElement::new(Point::new(2.0, 3.0), Point::new(47.0, -11.0));
    for step in [0.5, 1.0, 7.3] {
        let pts = line.sample(step);
        assert_eq!(pts[0], line.a);
        assert_eq!(*pts.last().unwrap(), line.b);
        for pair in pts.windows(2) {
            assert!(distance(pair[0], pair[1]) <= step + 1e-9);
        }
    }
}

#[test]
fn arc_span_and_length_are_consistent() {
    let arc = ArcElement::new(Point::new(0.0, 0.0), Point::new(30.0, 40.0), 60.0, Side::Right)
        .unwrap();
    let span = arc.angular_span();
    assert!(span > 0.0 && span <= 2.0 * PI);
    assert!((arc.length - arc.radius * span).abs() < 1e-9);
    assert!((distance(arc.center, arc.a) - 60.0).abs() < 1e-6);
    assert!((distance(arc.center, arc.b) - 60.0).abs() < 1e-6);
}

#[test]
fn arc_sample_stays_on_circle() {
    let arc =
        ArcElement::new(Point::new(100.0, 0.0), Point::new(150.0, 50.0), 60.0, Side::Left).unwrap();
    for p in arc.sample(2.0) {
        assert!((distance(p, arc.center) - 60.0).abs() < 1e-9);
    }
}

#[test]
fn combined_alignment_length_within_one_percent() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut alignment = Alignment::new("test-aln");
    alignment.add_line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    alignment
        .add_arc(Point::new(100.0, 0.0), Point::new(150.0, 50.0), 60.0, Side::Left)
        .unwrap();
    let expected = alignment.total_length();
    let sampled = Polyline::new(alignment.sample(5.0)).length();
    assert!(
        (sampled - expected).abs() / expected < 0.01,
        "sampled {sampled} expected {expected}"
    );
}

#[test]
fn clothoid_extends_total_length_beyond_chord() {
    let mut alignment = Alignment::new("with-spiral");
    alignment.add_clothoid(
        Point::new(150.0, 50.0),
        Point::new(200.0, 100.0),
        200.0,
        15.0,
        48,
        Side::Left,
    );
    let chord = distance(Point::new(150.0, 50.0), Point::new(200.0, 100.0));
    assert!(alignment.total_length() >= chord);
    let pts = alignment.sample(5.0);
    assert_eq!(pts[0], Point::new(150.0, 50.0));
    let last = *pts.last().unwrap();
    assert!((last.x - 200.0).abs() < 1e-9 && (last.y - 100.0).abs() < 1e-9);
}
