//! Unit tests for the recognition bridge and its wire format.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use equation_canvas::EquationCanvas;
use equation_canvas::recognition::{
    CancelFlag, RecognitionBridge, RecognitionRequest, RecognitionResponse, ThreadRecognizer,
};
use equation_canvas::{ChangeNotification, SymbolSpec};

use crate::helpers::{Clock, ManualRecognizer, mathml, measurer};

fn bridge(recognizer: &ManualRecognizer) -> RecognitionBridge {
    RecognitionBridge::new(
        Box::new(recognizer.clone()),
        measurer(),
        Duration::from_millis(100),
    )
}

/// A canvas with one symbol per token, plus the change it reports.
fn change_with(tokens: &[&str]) -> ChangeNotification {
    let mut canvas = EquationCanvas::new(400.0, 300.0, measurer());
    for (i, token) in tokens.iter().enumerate() {
        canvas.add_symbol(50.0 + 40.0 * i as f32, 100.0, SymbolSpec::text(*token, 48.0));
    }
    canvas.take_change().expect("adding symbols reports a change")
}

#[test]
fn test_debounce_collapses_notifications() {
    let recognizer = ManualRecognizer::new();
    let mut bridge = bridge(&recognizer);
    let mut clock = Clock::new();

    bridge.notify_change(change_with(&["1"]), clock.now());
    bridge.tick(clock.advance(60));
    bridge.notify_change(change_with(&["1", "+"]), clock.now());
    bridge.tick(clock.advance(60));
    assert_eq!(recognizer.dispatches(), 0);
    assert!(bridge.view().loading);

    bridge.tick(clock.advance(40));
    assert_eq!(recognizer.dispatches(), 1);
    assert_eq!(bridge.dispatch_count(), 1);
    assert_eq!(recognizer.request(0).len(), 2);
}

#[test]
fn test_superseded_worker_is_terminated_and_ignored() {
    let recognizer = ManualRecognizer::new();
    let mut bridge = bridge(&recognizer);
    let mut clock = Clock::new();

    bridge.notify_change(change_with(&["a"]), clock.now());
    bridge.tick(clock.advance(100));
    assert!(bridge.is_in_flight());

    bridge.notify_change(change_with(&["a", "b"]), clock.now());
    // The first worker answers after the newer change was made.
    recognizer.respond(0, mathml("<mi>a</mi>", &[]));
    bridge.tick(clock.advance(100));

    assert!(recognizer.is_terminated(0));
    assert_eq!(recognizer.dispatches(), 2);
    assert_eq!(bridge.view().mathml, "");
    assert!(bridge.view().loading);

    recognizer.respond(1, mathml("<mi>ab</mi>", &[]));
    let applied = bridge.tick(clock.advance(1));
    assert_eq!(applied.map(|r| r.mathml), Some("<mi>ab</mi>".to_string()));
    assert_eq!(bridge.view().mathml, "<mi>ab</mi>");
    assert!(!bridge.view().loading);
    assert!(!bridge.is_in_flight());
}

#[test]
fn test_failure_keeps_previous_result() {
    let recognizer = ManualRecognizer::new();
    let mut bridge = bridge(&recognizer);
    let mut clock = Clock::new();

    bridge.notify_change(change_with(&["x"]), clock.now());
    bridge.tick(clock.advance(100));
    recognizer.respond(0, mathml("<mi>x</mi>", &[]));
    bridge.tick(clock.advance(1));
    assert_eq!(bridge.view().mathml, "<mi>x</mi>");

    bridge.notify_change(change_with(&["x", "y"]), clock.now());
    bridge.tick(clock.advance(100));
    recognizer.fail(1, "parser crashed");
    let applied = bridge.tick(clock.advance(1));

    assert!(applied.is_none());
    assert_eq!(bridge.view().mathml, "<mi>x</mi>");
    assert!(!bridge.view().loading);
    assert!(!bridge.is_in_flight());
}

#[test]
fn test_response_while_change_pending_keeps_loading() {
    let recognizer = ManualRecognizer::new();
    let mut bridge = bridge(&recognizer);
    let mut clock = Clock::new();

    bridge.notify_change(change_with(&["x"]), clock.now());
    bridge.tick(clock.advance(100));
    bridge.notify_change(change_with(&["x", "2"]), clock.now());
    recognizer.respond(0, mathml("<mi>x</mi>", &[]));
    bridge.tick(clock.advance(10));

    assert_eq!(bridge.view().mathml, "<mi>x</mi>");
    assert!(bridge.view().loading);
    assert!(bridge.is_pending());
}

#[test]
fn test_shutdown_terminates_outstanding_worker() {
    let recognizer = ManualRecognizer::new();
    let mut bridge = bridge(&recognizer);
    let mut clock = Clock::new();

    bridge.notify_change(change_with(&["x"]), clock.now());
    bridge.tick(clock.advance(100));
    bridge.notify_change(change_with(&["x", "y"]), clock.now());
    bridge.shutdown();

    assert!(recognizer.is_terminated(0));
    assert!(!bridge.is_pending());
    assert!(!bridge.view().loading);
    bridge.tick(clock.advance(500));
    assert_eq!(recognizer.dispatches(), 1);
}

#[test]
fn test_thread_recognizer_end_to_end() {
    let recognizer = ThreadRecognizer::new(|request: &RecognitionRequest, _: &CancelFlag| {
        let tokens: Vec<&str> = request.symbols.iter().map(|s| s.token.as_str()).collect();
        Ok(RecognitionResponse {
            mathml: format!("<mrow>{}</mrow>", tokens.join("")),
            unused_symbols: Vec::new(),
        })
    });
    let mut bridge = RecognitionBridge::new(Box::new(recognizer), measurer(), Duration::ZERO);

    bridge.notify_change(change_with(&["2", "+", "2"]), Instant::now());
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut applied = None;
    while applied.is_none() && Instant::now() < deadline {
        applied = bridge.tick(Instant::now());
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(applied.map(|r| r.mathml), Some("<mrow>2+2</mrow>".to_string()));
    assert!(!bridge.view().loading);
}

#[test]
fn test_thread_recognizer_error_is_reported_not_applied() {
    let recognizer = ThreadRecognizer::new(|_: &RecognitionRequest, _: &CancelFlag| {
        anyhow::bail!("no model loaded")
    });
    let mut bridge = RecognitionBridge::new(Box::new(recognizer), measurer(), Duration::ZERO);

    bridge.notify_change(change_with(&["x"]), Instant::now());
    let deadline = Instant::now() + Duration::from_secs(5);
    while bridge.is_pending() || bridge.is_in_flight() {
        assert!(Instant::now() < deadline, "worker never finished");
        assert!(bridge.tick(Instant::now()).is_none());
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(bridge.view().mathml, "");
    assert!(!bridge.view().loading);
}

#[test]
fn test_superseded_computation_is_cancelled() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let recognizer = {
        let cancelled = Arc::clone(&cancelled);
        ThreadRecognizer::new(move |request: &RecognitionRequest, cancel: &CancelFlag| {
            // Only the first request blocks; it runs until the bridge gives up on it.
            if request.len() == 1 {
                let deadline = Instant::now() + Duration::from_secs(5);
                while !cancel.is_cancelled() {
                    anyhow::ensure!(Instant::now() < deadline, "never cancelled");
                    std::thread::sleep(Duration::from_millis(1));
                }
                cancelled.fetch_add(1, Ordering::SeqCst);
                cancel.check()?;
            }
            Ok(RecognitionResponse {
                mathml: format!("<mn>{}</mn>", request.len()),
                unused_symbols: Vec::new(),
            })
        })
    };
    let mut bridge = RecognitionBridge::new(Box::new(recognizer), measurer(), Duration::ZERO);

    bridge.notify_change(change_with(&["1"]), Instant::now());
    bridge.tick(Instant::now());
    bridge.notify_change(change_with(&["1", "2"]), Instant::now());

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut applied = None;
    while applied.is_none() && Instant::now() < deadline {
        applied = bridge.tick(Instant::now());
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(applied.map(|r| r.mathml), Some("<mn>2</mn>".to_string()));

    while cancelled.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "first computation kept running");
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
}

#[test]
fn test_request_wire_format() {
    let mut canvas = EquationCanvas::new(400.0, 300.0, measurer());
    canvas.add_symbol(100.0, 50.0, SymbolSpec::line(40.0));
    canvas.add_symbol(100.0, 100.0, SymbolSpec::sqrt(60.0, 30.0));
    let request = RecognitionRequest::from_symbols(canvas.symbols(), canvas.measurer().as_ref());

    insta::assert_json_snapshot!(request, @r#"
    {
      "symbols": [
        {
          "id": "sym-0",
          "type": "type/symbol",
          "top": 49.0,
          "left": 80.0,
          "width": 40.0,
          "height": 2.0,
          "token": ":line"
        },
        {
          "id": "sym-1",
          "type": "type/symbol",
          "top": 85.0,
          "left": 70.0,
          "width": 60.0,
          "height": 30.0,
          "token": ":sqrt"
        }
      ]
    }
    "#);
}

#[test]
fn test_response_tolerates_missing_unused_list() {
    let response: RecognitionResponse =
        serde_json::from_str(r#"{"mathml":"<mn>1</mn>"}"#).unwrap();
    assert_eq!(response.mathml, "<mn>1</mn>");
    assert!(response.unused_symbols.is_empty());

    let response: RecognitionResponse =
        serde_json::from_str(r#"{"mathml":"","unusedSymbols":["sym-3"]}"#).unwrap();
    assert_eq!(response.unused_symbols[0].to_string(), "sym-3");
}
