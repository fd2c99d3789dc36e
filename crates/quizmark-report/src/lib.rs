//! quizmark-report: Rendering of attempt reports.
//!
//! `html` produces a self-contained page for sharing a result; `text`
//! produces the terminal summary printed after an attempt is graded.

pub mod html;
pub mod text;
