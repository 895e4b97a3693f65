//! Test helpers for driving an editor the way a host would.
//!
//! This module provides:
//! - `ManualRecognizer` - recognizer double whose workers answer on demand
//! - `Clock` - explicit time source for the debounce timer
//! - Pointer helpers (`click`, `drag`, `type_text`) and layout conversions

use std::sync::Arc;
use std::time::{Duration, Instant};

use equation_canvas::geometry::Point;
use equation_canvas::input::{Key, Modifiers, RawInput};
use equation_canvas::recognition::{
    RecognitionError, RecognitionRequest, RecognitionResponse, RecognitionResult, Recognizer,
    WorkerHandle,
};
use equation_canvas::text_metrics::{ApproximateMeasurer, SharedMeasurer};
use equation_canvas::{EditorSettings, EquationEditor, SymbolId};
use parking_lot::Mutex;

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

pub fn measurer() -> SharedMeasurer {
    Arc::new(ApproximateMeasurer)
}

// ============================================================================
// ManualRecognizer
// ============================================================================

#[derive(Default)]
struct Slot {
    answer: Option<RecognitionResult<RecognitionResponse>>,
    terminated: bool,
}

#[derive(Default)]
struct Dispatches {
    requests: Vec<RecognitionRequest>,
    slots: Vec<Arc<Mutex<Slot>>>,
}

/// Records every request; the test decides when (and whether) each worker
/// answers.
#[derive(Clone, Default)]
pub struct ManualRecognizer {
    inner: Arc<Mutex<Dispatches>>,
}

impl ManualRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatches(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn request(&self, n: usize) -> RecognitionRequest {
        self.inner.lock().requests[n].clone()
    }

    pub fn last_request(&self) -> Option<RecognitionRequest> {
        self.inner.lock().requests.last().cloned()
    }

    pub fn respond(&self, n: usize, response: RecognitionResponse) {
        let slot = self.inner.lock().slots[n].clone();
        slot.lock().answer = Some(Ok(response));
    }

    pub fn fail(&self, n: usize, message: &str) {
        let slot = self.inner.lock().slots[n].clone();
        slot.lock().answer = Some(Err(RecognitionError::Worker(message.to_string())));
    }

    pub fn is_terminated(&self, n: usize) -> bool {
        self.inner.lock().slots[n].lock().terminated
    }
}

impl Recognizer for ManualRecognizer {
    fn spawn(&self, request: RecognitionRequest) -> RecognitionResult<Box<dyn WorkerHandle>> {
        let slot = Arc::new(Mutex::new(Slot::default()));
        let mut inner = self.inner.lock();
        inner.requests.push(request);
        inner.slots.push(slot.clone());
        Ok(Box::new(ManualHandle { slot }))
    }
}

struct ManualHandle {
    slot: Arc<Mutex<Slot>>,
}

impl WorkerHandle for ManualHandle {
    fn try_recv(&mut self) -> RecognitionResult<Option<RecognitionResponse>> {
        let mut slot = self.slot.lock();
        if slot.terminated {
            return Err(RecognitionError::Disconnected);
        }
        slot.answer.take().transpose()
    }

    fn terminate(&mut self) {
        self.slot.lock().terminated = true;
    }
}

pub fn mathml(markup: &str, unused: &[SymbolId]) -> RecognitionResponse {
    RecognitionResponse {
        mathml: markup.to_string(),
        unused_symbols: unused.to_vec(),
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Monotonic test time, advanced by hand.
pub struct Clock {
    now: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self { now: Instant::now() }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, ms: u64) -> Instant {
        self.now += Duration::from_millis(ms);
        self.now
    }
}

// ============================================================================
// Editor driving
// ============================================================================

pub fn editor_with(recognizer: &ManualRecognizer) -> EquationEditor {
    equation_canvas::logging::init();
    EquationEditor::new(
        WIDTH,
        HEIGHT,
        &EditorSettings::default(),
        measurer(),
        Box::new(recognizer.clone()),
    )
}

/// Page position of a canvas-local point.
pub fn page(editor: &EquationEditor, x: f32, y: f32) -> Point {
    editor.layout().converter().canvas_to_page(Point::new(x, y))
}

pub fn click(editor: &mut EquationEditor, at: Point, clock: &Clock) {
    click_with(editor, at, Modifiers::NONE, clock);
}

pub fn click_with(editor: &mut EquationEditor, at: Point, modifiers: Modifiers, clock: &Clock) {
    editor.handle_input(&RawInput::mouse_down(at.x, at.y).with_modifiers(modifiers), clock.now());
    editor.handle_input(&RawInput::mouse_up(at.x, at.y).with_modifiers(modifiers), clock.now());
}

/// Press at `from`, move in two steps to `to`, release there.
pub fn drag(editor: &mut EquationEditor, from: Point, to: Point, clock: &Clock) {
    press_and_move(editor, from, to, clock);
    editor.handle_input(&RawInput::mouse_up(to.x, to.y), clock.now());
}

/// Press at `from` and move to `to` without releasing.
pub fn press_and_move(editor: &mut EquationEditor, from: Point, to: Point, clock: &Clock) {
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    editor.handle_input(&RawInput::mouse_down(from.x, from.y), clock.now());
    editor.handle_input(&RawInput::mouse_move(mid.x, mid.y), clock.now());
    editor.handle_input(&RawInput::mouse_move(to.x, to.y), clock.now());
}

pub fn type_text(editor: &mut EquationEditor, text: &str, clock: &Clock) {
    for c in text.chars() {
        editor.handle_key(Key::Char(c), clock.now());
    }
}

/// Let the debounce window pass and tick once.
pub fn settle(editor: &mut EquationEditor, clock: &mut Clock) {
    editor.tick(clock.now());
    let deadline = editor.recognition_bridge().debounce().as_millis() as u64;
    editor.tick(clock.advance(deadline));
}
