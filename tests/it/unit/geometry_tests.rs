//! Unit tests for symbol geometry through the public API.

use equation_canvas::geometry::Rect;
use equation_canvas::text_metrics::{ApproximateMeasurer, CachedMeasurer};
use equation_canvas::{Symbol, SymbolSpec};

#[test]
fn test_text_bounds_are_deterministic_under_memoization() {
    let inner = ApproximateMeasurer;
    let cached = CachedMeasurer::new(ApproximateMeasurer);
    for token in ["x", "+", "sin", "α", "7"] {
        for size in [24.0, 48.0] {
            let spec = SymbolSpec::text(token, size);
            let plain = spec.bounds(100.0, 100.0, &inner);
            let first = spec.bounds(100.0, 100.0, &cached);
            let second = spec.bounds(100.0, 100.0, &cached);
            assert_eq!(plain, first, "{token} at {size}");
            assert_eq!(first, second, "{token} at {size}");
        }
    }
    assert_eq!(cached.cached_entries(), 10);
}

#[test]
fn test_text_bounds_are_centered() {
    let spec = SymbolSpec::text("x", 48.0);
    let bounds = spec.bounds(200.0, 150.0, &ApproximateMeasurer);
    assert_eq!(bounds.center().x, 200.0);
    assert_eq!(bounds.center().y, 150.0);
    assert!(bounds.width > 0.0 && bounds.height > 0.0);
}

#[test]
fn test_line_and_container_bounds() {
    let m = ApproximateMeasurer;
    assert_eq!(
        SymbolSpec::line(80.0).bounds(100.0, 100.0, &m),
        Rect::new(60.0, 98.0, 80.0, 4.0)
    );
    assert_eq!(
        SymbolSpec::brackets(48.0, 36.0).bounds(100.0, 100.0, &m),
        Rect::new(76.0, 82.0, 48.0, 36.0)
    );
}

#[test]
fn test_resize_from_snapshot_is_idempotent() {
    let specs = [
        SymbolSpec::text("x", 48.0),
        SymbolSpec::line(60.0),
        SymbolSpec::sqrt(48.0, 36.0),
    ];
    for spec in specs {
        let snapshot = Symbol::new(100.0, 100.0, spec);
        let mut once = snapshot.clone();
        once.apply_resize_delta(&snapshot, 12.0, -7.0);
        let mut twice = snapshot.clone();
        twice.apply_resize_delta(&snapshot, 12.0, -7.0);
        twice.apply_resize_delta(&snapshot, 12.0, -7.0);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_resize_respects_minimums() {
    let snapshot = Symbol::new(100.0, 100.0, SymbolSpec::text("x", 20.0));
    let mut s = snapshot.clone();
    s.apply_resize_delta(&snapshot, -100.0, -100.0);
    assert_eq!(s.spec(), &SymbolSpec::text("x", 5.0));

    let snapshot = Symbol::new(100.0, 100.0, SymbolSpec::sqrt(40.0, 40.0));
    let mut s = snapshot.clone();
    s.apply_resize_delta(&snapshot, -100.0, -100.0);
    assert_eq!(s.spec(), &SymbolSpec::sqrt(10.0, 10.0));
    assert_eq!(s.center().x, 85.0);
    assert_eq!(s.center().y, 85.0);
}
