//! Unit tests for single components of the equation canvas.

mod geometry_tests;
mod gesture_tests;
mod recognition_tests;
mod settings_tests;
