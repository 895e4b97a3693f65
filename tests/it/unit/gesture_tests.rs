//! Unit tests for the gesture router's lifecycle guarantees.

use equation_canvas::geometry::{Point, Rect};
use equation_canvas::input::{GestureKind, GestureRouter, Modifiers, RawInput, TargetLocator};

/// Two boxes side by side; `b` is to the right of `a`.
struct Boxes;

impl TargetLocator<char> for Boxes {
    fn hit_test(&self, page: Point) -> Option<char> {
        if Rect::new(0.0, 0.0, 100.0, 100.0).contains(page) {
            Some('a')
        } else if Rect::new(100.0, 0.0, 100.0, 100.0).contains(page) {
            Some('b')
        } else {
            None
        }
    }

    fn origin(&self, target: &char) -> Option<Point> {
        match target {
            'a' => Some(Point::new(0.0, 0.0)),
            'b' => Some(Point::new(100.0, 0.0)),
            _ => None,
        }
    }
}

fn router() -> GestureRouter<char> {
    let mut router = GestureRouter::default();
    router.attach('a');
    router.attach('b');
    router
}

fn count(kinds: &[GestureKind], pred: fn(&GestureKind) -> bool) -> usize {
    kinds.iter().filter(|k| pred(k)).count()
}

#[test]
fn test_one_drop_per_sequence_and_click_below_threshold() {
    let cases = [
        (0.0, 0.0, true),
        (1.9, -1.9, true),
        (2.0, 0.0, false),
        (0.0, -2.0, false),
        (40.0, 3.0, false),
    ];
    for (dx, dy, clicks) in cases {
        let mut router = router();
        let mut kinds = Vec::new();
        for input in [
            RawInput::mouse_down(50.0, 50.0),
            RawInput::mouse_move(50.0 + dx / 2.0, 50.0 + dy / 2.0),
            RawInput::mouse_move(50.0 + dx, 50.0 + dy),
            RawInput::mouse_up(50.0 + dx, 50.0 + dy),
        ] {
            kinds.extend(router.route(&input, &Boxes).events.into_iter().map(|e| e.kind));
        }

        assert_eq!(count(&kinds, |k| matches!(k, GestureKind::Grab { .. })), 1);
        assert_eq!(count(&kinds, |k| matches!(k, GestureKind::Drop { .. })), 1);
        let clicked = count(&kinds, |k| matches!(k, GestureKind::Click { .. }));
        assert_eq!(clicked == 1, clicks, "displacement ({dx}, {dy})");
        // Click always follows the drop.
        if clicks {
            assert!(matches!(kinds.last(), Some(GestureKind::Click { .. })));
        }
    }
}

#[test]
fn test_drag_reports_total_and_delta() {
    let mut router = router();
    router.route(&RawInput::mouse_down(10.0, 10.0), &Boxes);
    let first = router.route(&RawInput::mouse_move(15.0, 12.0), &Boxes).events;
    let second = router.route(&RawInput::mouse_move(25.0, 10.0), &Boxes).events;

    assert_eq!(
        first[0].kind,
        GestureKind::Drag {
            total: Point::new(5.0, 2.0),
            delta: Point::new(5.0, 2.0)
        }
    );
    assert_eq!(
        second[0].kind,
        GestureKind::Drag {
            total: Point::new(15.0, 0.0),
            delta: Point::new(10.0, -2.0)
        }
    );
}

#[test]
fn test_drag_continues_outside_the_target() {
    let mut router = router();
    router.route(&RawInput::mouse_down(50.0, 50.0), &Boxes);
    let routed = router.route(&RawInput::mouse_move(150.0, 500.0), &Boxes);
    assert_eq!(routed.events.len(), 1);
    assert_eq!(routed.events[0].target, 'a');

    let routed = router.route(&RawInput::mouse_up(150.0, 500.0), &Boxes);
    assert_eq!(routed.events[0].target, 'a');
    assert!(matches!(
        routed.events[0].kind,
        GestureKind::Drop { local, .. } if local == Point::new(150.0, 500.0)
    ));
}

#[test]
fn test_grab_local_is_relative_to_target() {
    let mut router = router();
    let routed = router.route(&RawInput::mouse_down(130.0, 20.0), &Boxes);
    assert_eq!(routed.events[0].target, 'b');
    assert_eq!(
        routed.events[0].kind,
        GestureKind::Grab {
            page: Point::new(130.0, 20.0),
            local: Point::new(30.0, 20.0)
        }
    );
}

#[test]
fn test_multi_touch_is_ignored() {
    let mut router = router();
    let two = RawInput::TouchStart {
        touches: vec![Point::new(10.0, 10.0), Point::new(120.0, 10.0)],
    };
    let routed = router.route(&two, &Boxes);
    assert!(routed.events.is_empty());
    assert!(!routed.handled);
    assert_eq!(router.window_listener_count(), 0);
}

#[test]
fn test_press_outside_attached_targets_is_not_handled() {
    let mut router = router();
    let routed = router.route(&RawInput::mouse_down(500.0, 500.0), &Boxes);
    assert!(!routed.handled);

    router.detach(&'b');
    let routed = router.route(&RawInput::mouse_down(150.0, 50.0), &Boxes);
    assert!(!routed.handled);
}

#[test]
fn test_modifiers_travel_with_events() {
    let mut router = router();
    let down = RawInput::mouse_down(10.0, 10.0).with_modifiers(Modifiers::CTRL);
    let up = RawInput::mouse_up(10.0, 10.0).with_modifiers(Modifiers::CTRL);
    router.route(&down, &Boxes);
    let routed = router.route(&up, &Boxes);
    assert!(routed.events.iter().all(|e| e.modifiers.toggles_selection()));
}
