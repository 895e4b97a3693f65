//! Single test binary entry point.
//!
//! All integration tests compile into one binary to keep link times down.
//!
//! Structure:
//! - helpers: recognizer double, clock and pointer helpers
//! - integration: whole-editor workflows driven through raw input
//! - unit: single-component tests through the public API

mod helpers;
mod integration;
mod unit;
