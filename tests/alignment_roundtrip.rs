use road_cad::alignment::{
    Alignment, AlignmentElement, ArcElement, ClothoidElement, LineElement, Side,
};
use road_cad::geometry::{distance, Point};
use road_cad::io::alignment::{read_alignment_json, write_alignment_json};

fn assert_samples_match(a: &AlignmentElement, b: &AlignmentElement, step: f64) {
    let sa = a.sample(step);
    let sb = b.sample(step);
    assert_eq!(sa.len(), sb.len());
    for (p, q) in sa.iter().zip(&sb) {
        assert!(distance(*p, *q) < 1e-9);
    }
}

#[test]
fn line_roundtrip_reproduces_samples() {
    let element = AlignmentElement::Line(LineElement::new(Point::new(1.0, 2.0), Point::new(31.0, -4.0)));
    let value = serde_json::to_value(&element).unwrap();
    assert_eq!(value["type"], "line");
    assert_eq!(value["A"][0], 1.0);
    assert!(value["length"].is_number());
    let back: AlignmentElement = serde_json::from_value(value).unwrap();
    assert_samples_match(&element, &back, 2.5);
}

#[test]
fn arc_roundtrip_reproduces_samples() {
    let element = AlignmentElement::Arc(
        ArcElement::new(Point::new(100.0, 0.0), Point::new(150.0, 50.0), 60.0, Side::Left).unwrap(),
    );
    let value = serde_json::to_value(&element).unwrap();
    assert_eq!(value["type"], "arc");
    assert_eq!(value["side"], "left");
    for key in ["A", "B", "radius", "center", "start_angle", "end_angle", "ccw", "length"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let back: AlignmentElement = serde_json::from_value(value).unwrap();
    assert_samples_match(&element, &back, 2.0);
}

#[test]
fn clothoid_roundtrip_reproduces_samples() {
    let element = AlignmentElement::Clothoid(ClothoidElement::new(
        Point::new(150.0, 50.0),
        Point::new(200.0, 100.0),
        200.0,
        15.0,
        48,
        Side::Right,
    ));
    let value = serde_json::to_value(&element).unwrap();
    assert_eq!(value["type"], "clothoid_poly");
    assert_eq!(value["samples"], 48);
    assert!(value.get("length").is_none());
    let back: AlignmentElement = serde_json::from_value(value).unwrap();
    assert_samples_match(&element, &back, 3.0);
}

#[test]
fn clothoid_alias_and_optional_defaults() {
    let value = serde_json::json!({
        "type": "clothoid",
        "P0": [0.0, 0.0],
        "P1": [50.0, 0.0],
        "radius": 120.0
    });
    let element: AlignmentElement = serde_json::from_value(value).unwrap();
    match element {
        AlignmentElement::Clothoid(c) => {
            assert_eq!(c.spiral_length, 10.0);
            assert_eq!(c.samples, 64);
            assert_eq!(c.side, Side::Left);
        }
        other => panic!("unexpected element: {other:?}"),
    }
}

#[test]
fn alignment_file_roundtrip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut alignment = Alignment::new("route-7");
    alignment.add_line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    alignment
        .add_arc(Point::new(100.0, 0.0), Point::new(150.0, 50.0), 60.0, Side::Left)
        .unwrap();
    alignment.add_clothoid(
        Point::new(150.0, 50.0),
        Point::new(200.0, 100.0),
        200.0,
        15.0,
        48,
        Side::Left,
    );

    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap();
    write_alignment_json(path, &alignment).unwrap();
    let loaded = read_alignment_json(path).unwrap();
    assert_eq!(loaded.name, "route-7");
    assert_eq!(loaded.len(), 3);
    assert!((loaded.total_length() - alignment.total_length()).abs() < 1e-9);
    for (a, b) in alignment.elements().iter().zip(loaded.elements()) {
        assert_samples_match(a, b, 5.0);
    }
}

#[test]
fn loading_isolates_bad_elements() {
    let _ = env_logger::builder().is_test(true).try_init();
    let json = r#"{
        "name": "broken",
        "elements": [
            {"type": "line", "A": [0.0, 0.0], "B": [10.0, 0.0], "length": 10.0},
            {"type": "arc", "A": [0.0, 0.0], "B": [500.0, 0.0], "radius": 10.0, "side": "left"},
            {"type": "line", "A": [10.0, 0.0]},
            {"type": "line", "A": [10.0, 0.0], "B": [20.0, 0.0], "length": 10.0}
        ]
    }"#;
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap();
    std::fs::write(path, json).unwrap();
    let loaded = read_alignment_json(path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!((loaded.total_length() - 20.0).abs() < 1e-9);
}
