//! Integration tests for the equation editor.
//!
//! These drive a whole editor through raw pointer and key input and check
//! the canvas, palettes and recognition state that come out the other end.
